//! Wire types for the CML `/api/v0` endpoints used here, plus the summaries
//! returned to callers.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Error body CML returns for 4xx/5xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[allow(dead_code)]
    #[serde(default)]
    pub code: Option<i64>,
    pub description: String,
}

/// Anything CML hands back with an `id`.
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedObject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub lab_title: Option<String>,
}

impl CreatedObject {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().or(self.lab_title.as_deref())
    }
}

/// Body for `POST /labs`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateLabRequest<'a> {
    pub title: &'a str,
    pub description: &'a str,
}

/// Body for `POST /labs/{id}/links`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateLinkRequest<'a> {
    pub src_int: &'a str,
    pub dst_int: &'a str,
}

/// A lab as returned by `create_lab`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LabSummary {
    /// Server-assigned lab id.
    pub lab_id: String,
    /// Lab title.
    pub title: String,
}

/// Lab state after a start/stop request was accepted.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabState {
    Started,
    Stopped,
}

/// Request to add a node to a lab.
#[derive(Debug, Clone, Serialize)]
pub struct NewNode {
    pub label: String,
    pub node_definition: String,
    pub x: i64,
    pub y: i64,
    /// Sent as the `populate_interfaces` query parameter, not in the body.
    #[serde(skip)]
    pub populate_interfaces: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_limit: Option<u64>,
    pub parameters: HashMap<String, String>,
    pub tags: Vec<String>,
    pub hide_links: bool,
}

impl NewNode {
    /// A node at the origin with interfaces populated by the server.
    pub fn new(label: impl Into<String>, node_definition: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            node_definition: node_definition.into(),
            x: 0,
            y: 0,
            populate_interfaces: true,
            ram: None,
            cpu_limit: None,
            parameters: HashMap::new(),
            tags: Vec::new(),
            hide_links: false,
        }
    }
}

/// A node as returned by `add_node`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NodeSummary {
    pub node_id: String,
    pub label: String,
    pub node_definition: String,
}

/// Interface detail from `GET /labs/{lab}/interfaces/{id}?operational=true`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct InterfaceInfo {
    pub id: String,
    #[serde(default)]
    pub node: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub slot: Option<u32>,
    /// `physical` or `loopback`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// `None` when the server did not report occupancy.
    #[serde(default)]
    pub is_connected: Option<bool>,
}

/// One side of a link as chosen by the auto-selection heuristic.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InterfaceSelection {
    pub node_id: String,
    pub interface_id: String,
    pub label: Option<String>,
    pub slot: u32,
}

/// A newly created link.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LinkSummary {
    pub link_id: String,
    pub interface_a: String,
    pub interface_b: String,
}

/// Raw `GET /labs/{id}/topology` payload.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawTopology {
    #[serde(default)]
    pub lab: RawLabInfo,
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub links: Vec<RawLink>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawLabInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub lab_title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub lab_description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawNode {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub node_definition: Option<String>,
    #[serde(default)]
    pub x: i64,
    #[serde(default)]
    pub y: i64,
    #[serde(default)]
    pub interfaces: Vec<RawTopologyInterface>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTopologyInterface {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub slot: Option<u32>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLink {
    #[serde(default)]
    pub id: Option<String>,
    pub node_a: String,
    pub node_b: String,
    pub interface_a: String,
    pub interface_b: String,
}

/// Structured view of a lab's nodes, interfaces and links.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopologySummary {
    pub lab_id: String,
    pub title: String,
    pub description: Option<String>,
    pub version: Option<String>,
    pub nodes: Vec<TopologyNode>,
    pub links: Vec<TopologyLink>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopologyNode {
    pub node_id: String,
    pub label: String,
    pub node_definition: String,
    pub x: i64,
    pub y: i64,
    pub interfaces: Vec<TopologyInterface>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopologyInterface {
    pub interface_id: String,
    pub label: Option<String>,
    pub slot: Option<u32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub connected: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopologyEndpoint {
    pub node_id: String,
    pub node_label: Option<String>,
    pub interface_id: String,
    pub interface_label: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopologyLink {
    pub link_id: Option<String>,
    pub a: TopologyEndpoint,
    pub b: TopologyEndpoint,
}

impl TopologySummary {
    pub(crate) fn from_raw(lab_id: &str, raw: RawTopology) -> Self {
        let connected: HashSet<&str> = raw
            .links
            .iter()
            .flat_map(|l| [l.interface_a.as_str(), l.interface_b.as_str()])
            .collect();

        let nodes: Vec<TopologyNode> = raw
            .nodes
            .iter()
            .map(|n| TopologyNode {
                node_id: n.id.clone(),
                label: n.label.clone().unwrap_or_else(|| "Unnamed".to_string()),
                node_definition: n
                    .node_definition
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
                x: n.x,
                y: n.y,
                interfaces: n
                    .interfaces
                    .iter()
                    .map(|i| TopologyInterface {
                        interface_id: i.id.clone(),
                        label: i.label.clone(),
                        slot: i.slot,
                        kind: i.kind.clone(),
                        connected: connected.contains(i.id.as_str()),
                    })
                    .collect(),
            })
            .collect();

        let node_label = |node_id: &str| {
            raw.nodes
                .iter()
                .find(|n| n.id == node_id)
                .and_then(|n| n.label.clone())
        };
        let interface_label = |node_id: &str, interface_id: &str| {
            raw.nodes
                .iter()
                .find(|n| n.id == node_id)
                .and_then(|n| n.interfaces.iter().find(|i| i.id == interface_id))
                .and_then(|i| i.label.clone())
        };

        let links = raw
            .links
            .iter()
            .map(|l| TopologyLink {
                link_id: l.id.clone(),
                a: TopologyEndpoint {
                    node_id: l.node_a.clone(),
                    node_label: node_label(&l.node_a),
                    interface_id: l.interface_a.clone(),
                    interface_label: interface_label(&l.node_a, &l.interface_a),
                },
                b: TopologyEndpoint {
                    node_id: l.node_b.clone(),
                    node_label: node_label(&l.node_b),
                    interface_id: l.interface_b.clone(),
                    interface_label: interface_label(&l.node_b, &l.interface_b),
                },
            })
            .collect();

        Self {
            lab_id: lab_id.to_string(),
            title: raw
                .lab
                .title
                .or(raw.lab.lab_title)
                .unwrap_or_else(|| "Untitled".to_string()),
            description: raw.lab.description.or(raw.lab.lab_description),
            version: raw.lab.version,
            nodes,
            links,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_topology() -> RawTopology {
        serde_json::from_value(serde_json::json!({
            "lab": { "title": "OSPF Test Lab", "description": "two routers", "version": "0.2.2" },
            "nodes": [
                {
                    "id": "n0", "label": "R1", "node_definition": "iosv", "x": 10, "y": 20,
                    "interfaces": [
                        { "id": "i0", "label": "Loopback0", "slot": 0, "type": "loopback" },
                        { "id": "i1", "label": "GigabitEthernet0/0", "slot": 1, "type": "physical" },
                        { "id": "i2", "label": "GigabitEthernet0/1", "slot": 2, "type": "physical" }
                    ]
                },
                {
                    "id": "n1", "label": "R2", "node_definition": "iosv",
                    "interfaces": [
                        { "id": "i3", "label": "Loopback0", "slot": 0, "type": "loopback" },
                        { "id": "i4", "label": "GigabitEthernet0/0", "slot": 1, "type": "physical" }
                    ]
                }
            ],
            "links": [
                { "id": "l0", "node_a": "n0", "node_b": "n1", "interface_a": "i1", "interface_b": "i4" }
            ]
        }))
        .expect("valid topology json")
    }

    #[test]
    fn test_topology_counts_and_endpoints() {
        let summary = TopologySummary::from_raw("lab-1", sample_topology());
        assert_eq!(summary.title, "OSPF Test Lab");
        assert_eq!(summary.nodes.len(), 2);
        assert_eq!(summary.links.len(), 1);

        let link = &summary.links[0];
        assert_eq!(link.a.node_label.as_deref(), Some("R1"));
        assert_eq!(link.a.interface_id, "i1");
        assert_eq!(link.a.interface_label.as_deref(), Some("GigabitEthernet0/0"));
        assert_eq!(link.b.node_label.as_deref(), Some("R2"));
        assert_eq!(link.b.interface_id, "i4");
    }

    #[test]
    fn test_topology_occupancy_from_links() {
        let summary = TopologySummary::from_raw("lab-1", sample_topology());
        let r1 = &summary.nodes[0];
        let occupied: Vec<&str> = r1
            .interfaces
            .iter()
            .filter(|i| i.connected)
            .map(|i| i.interface_id.as_str())
            .collect();
        assert_eq!(occupied, vec!["i1"]);
    }

    #[test]
    fn test_topology_defaults_for_missing_fields() {
        let raw: RawTopology = serde_json::from_value(serde_json::json!({
            "nodes": [ { "id": "n9" } ]
        }))
        .unwrap();
        let summary = TopologySummary::from_raw("lab-2", raw);
        assert_eq!(summary.title, "Untitled");
        assert_eq!(summary.nodes[0].label, "Unnamed");
        assert_eq!(summary.nodes[0].node_definition, "unknown");
        assert!(summary.links.is_empty());
    }

    #[test]
    fn test_new_node_body_omits_unset_resources() {
        let node = NewNode::new("R1", "iosv");
        let body = serde_json::to_value(&node).unwrap();
        assert_eq!(body["label"], "R1");
        assert_eq!(body["hide_links"], false);
        assert!(body.get("ram").is_none());
        assert!(body.get("populate_interfaces").is_none());
    }

    #[test]
    fn test_created_object_accepts_lab_title() {
        let obj: CreatedObject =
            serde_json::from_str(r#"{"id":"abc","lab_title":"Lab"}"#).unwrap();
        assert_eq!(obj.id.as_deref(), Some("abc"));
        assert_eq!(obj.title(), Some("Lab"));
    }
}
