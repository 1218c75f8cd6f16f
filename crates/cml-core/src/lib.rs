//! # cml-core
//!
//! Session and topology operations for the Cisco Modeling Labs REST API.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    cml-core                              │
//! ├──────────────────────────────────────────────────────────┤
//! │                                                          │
//! │  ┌─────────────────┐     ┌──────────────────────────┐   │
//! │  │  SessionSlot    │────▶│  Option<Arc<Session>>    │   │
//! │  │  - initialize() │     └──────────────────────────┘   │
//! │  │  - current()    │                                    │
//! │  └─────────────────┘                                    │
//! │           │                                              │
//! │           ▼                                              │
//! │  ┌─────────────────┐     ┌──────────────────────────┐   │
//! │  │    Session      │────▶│  reqwest::Client         │   │
//! │  │  - create_lab() │     │  + bearer token          │   │
//! │  │  - add_node()   │     └──────────────────────────┘   │
//! │  │  - link_nodes() │                │ HTTPS             │
//! │  └─────────────────┘                ▼                   │
//! │                          ┌──────────────────────────┐   │
//! │                          │  CML server /api/v0      │   │
//! │                          └──────────────────────────┘   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use cml_core::{NewNode, SessionConfig, SessionSlot};
//!
//! # async fn example() -> cml_core::Result<()> {
//! let slot = SessionSlot::new();
//! slot.initialize(
//!     SessionConfig::builder()
//!         .base_url("cml.example.com")
//!         .username("admin")
//!         .password("secret")
//!         .verify_tls(false)
//!         .build()?,
//! )
//! .await?;
//!
//! let session = slot.current().await?;
//! let lab = session.create_lab("OSPF Test Lab", "").await?;
//! let r1 = session.add_node(&lab.lab_id, &NewNode::new("R1", "iosv")).await?;
//! let r2 = session.add_node(&lab.lab_id, &NewNode::new("R2", "iosv")).await?;
//! let link = session.link_nodes(&lab.lab_id, &r1.node_id, &r2.node_id).await?;
//! println!("linked slot {} to slot {}", link.a.slot, link.b.slot);
//! session.start_lab(&lab.lab_id).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod interface;
mod lab;
mod model;
mod session;
mod topology;

pub use client::Session;
pub use config::{normalize_base_url, SessionConfig, SessionConfigBuilder, DEFAULT_TIMEOUT};
pub use error::{CmlError, ErrorKind, Result};
pub use interface::{select_free_interface, RESERVED_SLOT};
pub use model::{
    InterfaceInfo, InterfaceSelection, LabState, LabSummary, LinkSummary, NewNode, NodeSummary,
    TopologyEndpoint, TopologyInterface, TopologyLink, TopologyNode, TopologySummary,
};
pub use session::SessionSlot;
pub use topology::AutoLink;
