//! Interface auto-selection for `link_nodes`.
//!
//! Slot 0 is the loopback/management interface on every CML node definition
//! and is never picked automatically. Among the remaining interfaces the
//! lowest free physical slot wins; ties on slot fall back to the interface id
//! so the choice does not depend on the order the server listed them in.

use crate::error::{CmlError, Result};
use crate::model::{InterfaceInfo, InterfaceSelection};

/// Slot reserved for the loopback interface.
pub const RESERVED_SLOT: u32 = 0;

const PHYSICAL: &str = "physical";

impl InterfaceInfo {
    /// True when this interface may be picked by auto-selection.
    pub fn is_selectable(&self) -> bool {
        match self.slot {
            Some(slot) if slot != RESERVED_SLOT => {}
            _ => return false,
        }
        // Only interfaces the server reported as free physical ports qualify.
        self.kind.as_deref() == Some(PHYSICAL) && self.is_connected == Some(false)
    }
}

/// Pick the lowest-slot free physical interface on `node_id`.
pub fn select_free_interface(node_id: &str, interfaces: &[InterfaceInfo]) -> Result<InterfaceSelection> {
    let chosen = interfaces
        .iter()
        .filter(|i| i.is_selectable())
        .min_by(|a, b| a.slot.cmp(&b.slot).then_with(|| a.id.cmp(&b.id)))
        .ok_or_else(|| CmlError::InterfaceExhausted {
            node_id: node_id.to_string(),
        })?;

    Ok(InterfaceSelection {
        node_id: node_id.to_string(),
        interface_id: chosen.id.clone(),
        label: chosen.label.clone(),
        // is_selectable guarantees a slot
        slot: chosen.slot.unwrap_or_default(),
    })
}
