//! Tool requests parsed from raw MCP arguments.
//!
//! Every tool call is turned into a [`ToolRequest`] and validated before any
//! request reaches the CML server.

use crate::config::MAX_FIELD_LENGTH;
use crate::types::*;
use cml_core::CmlError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Names of all tools, in the order they are listed.
pub const TOOL_NAMES: [&str; 8] = [
    "initialize_client",
    "create_lab",
    "start_lab",
    "stop_lab",
    "add_node",
    "link_nodes",
    "create_link_v3",
    "get_lab_topology",
];

/// A validated tool invocation.
#[derive(Debug)]
pub enum ToolRequest {
    InitializeClient(InitializeClientParams),
    CreateLab(CreateLabParams),
    StartLab(StartLabParams),
    StopLab(StopLabParams),
    AddNode(AddNodeParams),
    LinkNodes(LinkNodesParams),
    CreateLinkV3(CreateLinkParams),
    GetLabTopology(GetLabTopologyParams),
}

impl ToolRequest {
    /// Parse and validate the arguments of tool `name`.
    pub fn parse(name: &str, args: Option<Map<String, Value>>) -> Result<Self, CmlError> {
        let request = match name {
            "initialize_client" => Self::InitializeClient(decode(name, args)?),
            "create_lab" => Self::CreateLab(decode(name, args)?),
            "start_lab" => Self::StartLab(decode(name, args)?),
            "stop_lab" => Self::StopLab(decode(name, args)?),
            "add_node" => Self::AddNode(decode(name, args)?),
            "link_nodes" => Self::LinkNodes(decode(name, args)?),
            "create_link_v3" => Self::CreateLinkV3(decode(name, args)?),
            "get_lab_topology" => Self::GetLabTopology(decode(name, args)?),
            _ => return Err(CmlError::InvalidInput(format!("unknown tool: {name}"))),
        };
        request.validate()?;
        Ok(request)
    }

    /// Tool name this request was parsed from.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InitializeClient(_) => "initialize_client",
            Self::CreateLab(_) => "create_lab",
            Self::StartLab(_) => "start_lab",
            Self::StopLab(_) => "stop_lab",
            Self::AddNode(_) => "add_node",
            Self::LinkNodes(_) => "link_nodes",
            Self::CreateLinkV3(_) => "create_link_v3",
            Self::GetLabTopology(_) => "get_lab_topology",
        }
    }

    fn validate(&self) -> Result<(), CmlError> {
        match self {
            Self::InitializeClient(p) => {
                text("base_url", &p.base_url)?;
                text("username", &p.username)?;
                if p.password.is_empty() {
                    return Err(CmlError::InvalidInput("password is required".into()));
                }
                bounded("password", &p.password)
            }
            Self::CreateLab(p) => {
                text("title", &p.title)?;
                bounded("description", &p.description)
            }
            Self::StartLab(StartLabParams { lab_id }) | Self::StopLab(StopLabParams { lab_id }) => {
                id("lab_id", lab_id)
            }
            Self::AddNode(p) => {
                id("lab_id", &p.lab_id)?;
                text("label", &p.label)?;
                text("node_definition", &p.node_definition)?;
                if p.ram == Some(0) {
                    return Err(CmlError::InvalidInput("ram must be > 0".into()));
                }
                if p.cpu_limit == Some(0) {
                    return Err(CmlError::InvalidInput("cpu_limit must be > 0".into()));
                }
                Ok(())
            }
            Self::LinkNodes(p) => {
                id("lab_id", &p.lab_id)?;
                id("node_id_a", &p.node_id_a)?;
                id("node_id_b", &p.node_id_b)?;
                if p.node_id_a == p.node_id_b {
                    return Err(CmlError::InvalidInput(
                        "node_id_a and node_id_b must be different nodes".into(),
                    ));
                }
                Ok(())
            }
            Self::CreateLinkV3(p) => {
                id("lab_id", &p.lab_id)?;
                id("interface_id_a", &p.interface_id_a)?;
                id("interface_id_b", &p.interface_id_b)?;
                if let Some(node) = &p.node_id_a {
                    id("node_id_a", node)?;
                }
                if let Some(node) = &p.node_id_b {
                    id("node_id_b", node)?;
                }
                if p.interface_id_a == p.interface_id_b {
                    return Err(CmlError::InvalidInput(
                        "interface_id_a and interface_id_b must be different interfaces".into(),
                    ));
                }
                Ok(())
            }
            Self::GetLabTopology(p) => id("lab_id", &p.lab_id),
        }
    }
}

fn decode<T: DeserializeOwned>(tool: &str, args: Option<Map<String, Value>>) -> Result<T, CmlError> {
    serde_json::from_value(Value::Object(args.unwrap_or_default()))
        .map_err(|e| CmlError::InvalidInput(format!("invalid arguments for {tool}: {e}")))
}

fn bounded(field: &str, value: &str) -> Result<(), CmlError> {
    if value.len() > MAX_FIELD_LENGTH {
        return Err(CmlError::InvalidInput(format!(
            "{field} exceeds maximum size ({} bytes > {MAX_FIELD_LENGTH} bytes)",
            value.len()
        )));
    }
    Ok(())
}

fn text(field: &str, value: &str) -> Result<(), CmlError> {
    if value.trim().is_empty() {
        return Err(CmlError::InvalidInput(format!("{field} must not be blank")));
    }
    bounded(field, value)
}

/// Identifiers end up in URL paths, so they may not carry separators.
fn id(field: &str, value: &str) -> Result<(), CmlError> {
    text(field, value)?;
    if value
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '%'))
    {
        return Err(CmlError::InvalidInput(format!(
            "{field} contains invalid characters: {value:?}"
        )));
    }
    Ok(())
}
