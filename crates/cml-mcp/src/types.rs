//! Tool parameter and response types for MCP tools.
//!
//! These types use serde for serialization and schemars for automatic
//! JSON Schema generation required by MCP.

use cml_core::{ErrorKind, InterfaceSelection, LabState, TopologySummary};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_true() -> bool {
    true
}

// ============================================================================
// Session
// ============================================================================

/// Parameters for initializing the CML client.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct InitializeClientParams {
    /// Base URL of the CML server (e.g. https://cml-server). https is assumed when no scheme is given.
    pub base_url: String,

    /// Username for CML authentication.
    pub username: String,

    /// Password for CML authentication.
    pub password: String,

    /// Whether to verify SSL certificates (set to false for self-signed certificates).
    #[serde(default = "default_true")]
    pub verify_ssl: bool,
}

/// Result of initializing the CML client.
#[derive(Debug, Serialize)]
pub struct InitializeClientResult {
    /// Normalized server URL.
    pub base_url: String,
    /// Authenticated user.
    pub username: String,
    /// Whether SSL certificates are verified.
    pub verify_ssl: bool,
    /// Human-readable confirmation.
    pub message: String,
}

// ============================================================================
// Lab Lifecycle
// ============================================================================

/// Parameters for creating a lab.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateLabParams {
    /// Title of the new lab.
    pub title: String,

    /// Optional description for the lab.
    #[serde(default)]
    pub description: String,
}

/// Result of creating a lab.
#[derive(Debug, Serialize)]
pub struct CreateLabResult {
    /// Server-assigned lab id.
    pub lab_id: String,
    /// Lab title.
    pub title: String,
    /// Human-readable confirmation.
    pub message: String,
}

/// Parameters for starting a lab.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct StartLabParams {
    /// ID of the lab to start.
    pub lab_id: String,
}

/// Parameters for stopping a lab.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct StopLabParams {
    /// ID of the lab to stop.
    pub lab_id: String,
}

/// Result of starting or stopping a lab.
#[derive(Debug, Serialize)]
pub struct LabStateResult {
    /// Lab id.
    pub lab_id: String,
    /// State requested from the server.
    pub state: LabState,
    /// Human-readable confirmation.
    pub message: String,
}

// ============================================================================
// Topology Building
// ============================================================================

/// Parameters for adding a node.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddNodeParams {
    /// ID of the lab.
    pub lab_id: String,

    /// Label for the new node.
    pub label: String,

    /// Node definition (e.g. 'iosv', 'csr1000v', 'alpine').
    pub node_definition: String,

    /// X coordinate for node placement.
    #[serde(default)]
    pub x: i64,

    /// Y coordinate for node placement.
    #[serde(default)]
    pub y: i64,

    /// Whether the server should create the node's interfaces (default: true).
    #[serde(default = "default_true")]
    pub populate_interfaces: bool,

    /// RAM allocation in MB.
    #[serde(default)]
    pub ram: Option<u64>,

    /// CPU limit in percent.
    #[serde(default)]
    pub cpu_limit: Option<u64>,

    /// Node-specific parameters.
    #[serde(default)]
    pub parameters: Option<HashMap<String, String>>,
}

/// Result of adding a node.
#[derive(Debug, Serialize)]
pub struct AddNodeResult {
    /// Server-assigned node id.
    pub node_id: String,
    /// Node label.
    pub label: String,
    /// Node definition.
    pub node_definition: String,
    /// Human-readable confirmation.
    pub message: String,
}

/// Parameters for linking two nodes with auto-selected interfaces.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct LinkNodesParams {
    /// ID of the lab.
    pub lab_id: String,

    /// ID of the first node.
    pub node_id_a: String,

    /// ID of the second node.
    pub node_id_b: String,
}

/// Result of linking two nodes.
#[derive(Debug, Serialize)]
pub struct LinkNodesResult {
    /// Server-assigned link id.
    pub link_id: String,
    /// Interface used on the first node.
    pub interface_a: InterfaceSelection,
    /// Interface used on the second node.
    pub interface_b: InterfaceSelection,
    /// Human-readable confirmation.
    pub message: String,
}

/// Parameters for linking two explicitly named interfaces.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateLinkParams {
    /// ID of the lab.
    pub lab_id: String,

    /// ID of the first interface.
    pub interface_id_a: String,

    /// ID of the second interface.
    pub interface_id_b: String,

    /// ID of the node owning the first interface (informational).
    #[serde(default)]
    pub node_id_a: Option<String>,

    /// ID of the node owning the second interface (informational).
    #[serde(default)]
    pub node_id_b: Option<String>,
}

/// Result of linking two explicitly named interfaces.
#[derive(Debug, Serialize)]
pub struct CreateLinkResult {
    /// Server-assigned link id.
    pub link_id: String,
    /// First interface.
    pub interface_id_a: String,
    /// Second interface.
    pub interface_id_b: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id_a: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id_b: Option<String>,
    /// Human-readable confirmation.
    pub message: String,
}

// ============================================================================
// Inspection
// ============================================================================

/// Parameters for fetching a lab topology.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetLabTopologyParams {
    /// ID of the lab.
    pub lab_id: String,
}

// ============================================================================
// Outcomes
// ============================================================================

/// Successful output of any tool.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Initialized(InitializeClientResult),
    LabCreated(CreateLabResult),
    LabState(LabStateResult),
    NodeAdded(AddNodeResult),
    NodesLinked(LinkNodesResult),
    LinkCreated(CreateLinkResult),
    Topology(TopologySummary),
}

/// Structured error payload returned for failed tool calls.
#[derive(Debug, Serialize)]
pub struct ToolErrorPayload {
    pub error: ToolErrorBody,
}

/// Error kind plus human-readable message.
#[derive(Debug, Serialize)]
pub struct ToolErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&cml_core::CmlError> for ToolErrorPayload {
    fn from(err: &cml_core::CmlError) -> Self {
        Self {
            error: ToolErrorBody {
                kind: err.kind(),
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_params_default_verify_ssl() {
        let params: InitializeClientParams = serde_json::from_value(serde_json::json!({
            "base_url": "cml.local",
            "username": "admin",
            "password": "secret"
        }))
        .unwrap();
        assert!(params.verify_ssl);
    }

    #[test]
    fn test_add_node_params_defaults() {
        let params: AddNodeParams = serde_json::from_value(serde_json::json!({
            "lab_id": "lab-1",
            "label": "R1",
            "node_definition": "iosv"
        }))
        .unwrap();
        assert_eq!((params.x, params.y), (0, 0));
        assert!(params.populate_interfaces);
        assert!(params.ram.is_none());
        assert!(params.parameters.is_none());
    }

    #[test]
    fn test_error_payload_shape() {
        let payload = ToolErrorPayload::from(&cml_core::CmlError::Unauthenticated);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["error"]["kind"], "unauthenticated");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("initialize_client"));
    }

    #[test]
    fn test_untagged_output_serializes_inner() {
        let output = ToolOutput::LabCreated(CreateLabResult {
            lab_id: "lab-1".into(),
            title: "OSPF Test Lab".into(),
            message: "ok".into(),
        });
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["lab_id"], "lab-1");
    }
}
