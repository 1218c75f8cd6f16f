//! Topology building and inspection: nodes, links, and the topology summary.

use crate::client::{check_path_id, Session};
use crate::error::{CmlError, Result};
use crate::interface::select_free_interface;
use crate::model::{
    CreateLinkRequest, CreatedObject, InterfaceInfo, InterfaceSelection, LinkSummary, NewNode,
    NodeSummary, RawTopology, TopologySummary,
};
use reqwest::Method;

/// Result of [`Session::link_nodes`]: the link plus the interfaces it used.
#[derive(Debug, Clone, serde::Serialize, PartialEq, Eq)]
pub struct AutoLink {
    pub link: LinkSummary,
    pub a: InterfaceSelection,
    pub b: InterfaceSelection,
}

impl Session {
    /// Add a node to a lab.
    pub async fn add_node(&self, lab_id: &str, node: &NewNode) -> Result<NodeSummary> {
        check_path_id("lab_id", lab_id)?;
        tracing::info!(
            lab_id,
            label = %node.label,
            node_definition = %node.node_definition,
            "Adding node"
        );

        let mut path = format!("labs/{lab_id}/nodes");
        if node.populate_interfaces {
            path.push_str("?populate_interfaces=true");
        }

        let resp = self.send_json(Method::POST, &path, node).await?;
        let created: CreatedObject = Self::decode(resp).await?;
        let node_id = created
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CmlError::unexpected(format!("/api/v0/labs/{lab_id}/nodes"), "no node id returned"))?;

        tracing::info!(lab_id, node_id = %node_id, "Node added");
        Ok(NodeSummary {
            node_id,
            label: node.label.clone(),
            node_definition: node.node_definition.clone(),
        })
    }

    /// Fetch operational detail for every interface on a node.
    pub async fn node_interfaces(&self, lab_id: &str, node_id: &str) -> Result<Vec<InterfaceInfo>> {
        check_path_id("lab_id", lab_id)?;
        check_path_id("node_id", node_id)?;
        let resp = self
            .send(
                Method::GET,
                &format!("labs/{lab_id}/nodes/{node_id}/interfaces?operational=true"),
            )
            .await?;
        let ids: Vec<String> = Self::decode(resp).await?;
        tracing::debug!(lab_id, node_id, count = ids.len(), "Node interfaces listed");

        let mut interfaces = Vec::with_capacity(ids.len());
        for id in ids {
            check_path_id("interface id", &id).map_err(|e| {
                CmlError::unexpected(format!("/api/v0/labs/{lab_id}/nodes/{node_id}/interfaces"), e.to_string())
            })?;
            let resp = self
                .send(
                    Method::GET,
                    &format!("labs/{lab_id}/interfaces/{id}?operational=true"),
                )
                .await?;
            interfaces.push(Self::decode::<InterfaceInfo>(resp).await?);
        }
        Ok(interfaces)
    }

    /// Link two nodes using the lowest free non-reserved interface on each.
    pub async fn link_nodes(&self, lab_id: &str, node_a: &str, node_b: &str) -> Result<AutoLink> {
        if node_a == node_b {
            return Err(CmlError::InvalidInput(format!(
                "cannot link node {node_a} to itself"
            )));
        }
        check_path_id("lab_id", lab_id)?;
        check_path_id("node_id_a", node_a)?;
        check_path_id("node_id_b", node_b)?;

        let a = select_free_interface(node_a, &self.node_interfaces(lab_id, node_a).await?)?;
        let b = select_free_interface(node_b, &self.node_interfaces(lab_id, node_b).await?)?;
        tracing::info!(
            lab_id,
            node_a,
            slot_a = a.slot,
            node_b,
            slot_b = b.slot,
            "Selected interfaces"
        );

        let link = self.create_link(lab_id, &a.interface_id, &b.interface_id).await?;
        Ok(AutoLink { link, a, b })
    }

    /// Link two explicitly named interfaces. Availability is left to the server.
    pub async fn create_link(
        &self,
        lab_id: &str,
        interface_a: &str,
        interface_b: &str,
    ) -> Result<LinkSummary> {
        if interface_a == interface_b {
            return Err(CmlError::InvalidInput(format!(
                "cannot link interface {interface_a} to itself"
            )));
        }
        check_path_id("lab_id", lab_id)?;

        tracing::info!(lab_id, interface_a, interface_b, "Creating link");
        let resp = self
            .send_json(
                Method::POST,
                &format!("labs/{lab_id}/links"),
                &CreateLinkRequest {
                    src_int: interface_a,
                    dst_int: interface_b,
                },
            )
            .await?;
        let created: CreatedObject = Self::decode(resp).await?;
        let link_id = created
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CmlError::unexpected(format!("/api/v0/labs/{lab_id}/links"), "no link id returned"))?;

        tracing::info!(lab_id, link_id = %link_id, "Link created");
        Ok(LinkSummary {
            link_id,
            interface_a: interface_a.to_string(),
            interface_b: interface_b.to_string(),
        })
    }

    /// Summarize a lab's nodes, interfaces and links.
    pub async fn lab_topology(&self, lab_id: &str) -> Result<TopologySummary> {
        check_path_id("lab_id", lab_id)?;
        tracing::debug!(lab_id, "Fetching lab topology");
        let resp = self
            .send(Method::GET, &format!("labs/{lab_id}/topology"))
            .await?;
        let raw: RawTopology = Self::decode(resp).await?;
        Ok(TopologySummary::from_raw(lab_id, raw))
    }
}
