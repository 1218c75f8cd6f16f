//! CmlServer - MCP server that exposes CML lab operations as tools.
//!
//! This module implements the core MCP server manually implementing ServerHandler
//! to expose session, lab lifecycle, topology building and inspection tools.

use crate::config::CmlMcpConfig;
use crate::request::ToolRequest;
use crate::types::*;

use cml_core::{CmlError, NewNode, SessionConfig, SessionSlot};
use rmcp::{
    handler::server::ServerHandler,
    model::*,
    service::{RequestContext, RoleServer},
    ErrorData,
};
use schemars::schema_for;
use std::sync::Arc;

/// MCP server for CML lab building.
///
/// Holds the current CML session in a [`SessionSlot`]; clones share it, so
/// the stdio and HTTP transports see the same session.
#[derive(Clone)]
pub struct CmlServer {
    /// Current CML session, if any
    sessions: SessionSlot,

    /// Configuration
    config: CmlMcpConfig,
}

impl CmlServer {
    /// Create a new CmlServer with the given configuration.
    pub fn new(config: CmlMcpConfig) -> Self {
        Self {
            sessions: SessionSlot::new(),
            config,
        }
    }

    /// Log in with the credentials from the environment, if any were set.
    ///
    /// Failure is logged and leaves the server unauthenticated; the agent can
    /// still call `initialize_client` itself.
    pub async fn initialize_from_config(&self) {
        let session_config = match self.config.startup_session() {
            Ok(Some(c)) => c,
            Ok(None) => {
                tracing::info!("No CML credentials configured; waiting for initialize_client");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping startup authentication");
                return;
            }
        };

        match self.sessions.initialize(session_config).await {
            Ok(session) => {
                tracing::info!(base_url = %session.base_url(), "Startup session established")
            }
            Err(e) => tracing::warn!(error = %e, "Startup authentication failed"),
        }
    }

    /// Get a reference to the session slot.
    pub fn sessions(&self) -> &SessionSlot {
        &self.sessions
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &CmlMcpConfig {
        &self.config
    }

    /// Helper to create success result with JSON content
    fn json_result<T: serde::Serialize>(data: &T) -> CallToolResult {
        match serde_json::to_string_pretty(data) {
            Ok(json) => CallToolResult::success(vec![Content::text(json)]),
            Err(e) => CallToolResult::error(vec![Content::text(format!(
                "JSON serialization error: {e}"
            ))]),
        }
    }

    /// Helper to create a structured error result
    fn error_result(tool: &str, err: &CmlError) -> CallToolResult {
        tracing::warn!(tool, kind = %err.kind(), error = %err, "Tool call failed");
        let payload = ToolErrorPayload::from(err);
        match serde_json::to_string_pretty(&payload) {
            Ok(json) => CallToolResult::error(vec![Content::text(json)]),
            Err(_) => CallToolResult::error(vec![Content::text(err.to_string())]),
        }
    }

    /// Convert schemars RootSchema to rmcp JsonObject
    fn schema_to_json_object<T: schemars::JsonSchema>(
    ) -> Arc<serde_json::Map<String, serde_json::Value>> {
        let schema = schema_for!(T);
        let json = serde_json::to_value(&schema.schema).unwrap_or_else(|_| serde_json::json!({}));
        match json {
            serde_json::Value::Object(map) => Arc::new(map),
            _ => Arc::new(serde_json::Map::new()),
        }
    }

    // ========================================================================
    // Tool Implementations
    // ========================================================================

    /// Run a validated request against the current session.
    pub async fn execute(&self, request: ToolRequest) -> Result<ToolOutput, CmlError> {
        match request {
            ToolRequest::InitializeClient(p) => self.handle_initialize_client(p).await,
            ToolRequest::CreateLab(p) => self.handle_create_lab(p).await,
            ToolRequest::StartLab(p) => self.handle_start_lab(p).await,
            ToolRequest::StopLab(p) => self.handle_stop_lab(p).await,
            ToolRequest::AddNode(p) => self.handle_add_node(p).await,
            ToolRequest::LinkNodes(p) => self.handle_link_nodes(p).await,
            ToolRequest::CreateLinkV3(p) => self.handle_create_link(p).await,
            ToolRequest::GetLabTopology(p) => self.handle_get_lab_topology(p).await,
        }
    }

    async fn handle_initialize_client(
        &self,
        params: InitializeClientParams,
    ) -> Result<ToolOutput, CmlError> {
        tracing::info!(
            base_url = %params.base_url,
            username = %params.username,
            verify_ssl = params.verify_ssl,
            "Initializing CML client"
        );

        let config = SessionConfig::builder()
            .base_url(params.base_url)
            .username(params.username)
            .password(params.password)
            .verify_tls(params.verify_ssl)
            .timeout(self.config.request_timeout)
            .build()?;

        let session = self.sessions.initialize(config).await?;
        let ssl_status = if session.verify_tls() {
            "enabled"
        } else {
            "disabled (accepting self-signed certificates)"
        };

        Ok(ToolOutput::Initialized(InitializeClientResult {
            base_url: session.base_url().to_string(),
            username: session.username().to_string(),
            verify_ssl: session.verify_tls(),
            message: format!(
                "Successfully authenticated with CML at {} (SSL verification: {ssl_status})",
                session.base_url()
            ),
        }))
    }

    async fn handle_create_lab(&self, params: CreateLabParams) -> Result<ToolOutput, CmlError> {
        let session = self.sessions.current().await?;
        let lab = session.create_lab(&params.title, &params.description).await?;
        Ok(ToolOutput::LabCreated(CreateLabResult {
            message: format!("Created lab '{}' with ID: {}", lab.title, lab.lab_id),
            lab_id: lab.lab_id,
            title: lab.title,
        }))
    }

    async fn handle_start_lab(&self, params: StartLabParams) -> Result<ToolOutput, CmlError> {
        let session = self.sessions.current().await?;
        let state = session.start_lab(&params.lab_id).await?;
        Ok(ToolOutput::LabState(LabStateResult {
            message: format!("Lab {} started successfully", params.lab_id),
            lab_id: params.lab_id,
            state,
        }))
    }

    async fn handle_stop_lab(&self, params: StopLabParams) -> Result<ToolOutput, CmlError> {
        let session = self.sessions.current().await?;
        let state = session.stop_lab(&params.lab_id).await?;
        Ok(ToolOutput::LabState(LabStateResult {
            message: format!("Lab {} stopped successfully", params.lab_id),
            lab_id: params.lab_id,
            state,
        }))
    }

    async fn handle_add_node(&self, params: AddNodeParams) -> Result<ToolOutput, CmlError> {
        let session = self.sessions.current().await?;

        let mut node = NewNode::new(params.label, params.node_definition);
        node.x = params.x;
        node.y = params.y;
        node.populate_interfaces = params.populate_interfaces;
        node.ram = params.ram;
        node.cpu_limit = params.cpu_limit;
        node.parameters = params.parameters.unwrap_or_default();

        let added = session.add_node(&params.lab_id, &node).await?;
        Ok(ToolOutput::NodeAdded(AddNodeResult {
            message: format!("Added node '{}' with ID: {}", added.label, added.node_id),
            node_id: added.node_id,
            label: added.label,
            node_definition: added.node_definition,
        }))
    }

    async fn handle_link_nodes(&self, params: LinkNodesParams) -> Result<ToolOutput, CmlError> {
        let session = self.sessions.current().await?;
        let linked = session
            .link_nodes(&params.lab_id, &params.node_id_a, &params.node_id_b)
            .await?;

        let describe = |sel: &cml_core::InterfaceSelection| {
            sel.label
                .clone()
                .unwrap_or_else(|| format!("slot {}", sel.slot))
        };
        Ok(ToolOutput::NodesLinked(LinkNodesResult {
            message: format!(
                "Created link {} between {} ({}) and {} ({})",
                linked.link.link_id,
                linked.a.node_id,
                describe(&linked.a),
                linked.b.node_id,
                describe(&linked.b),
            ),
            link_id: linked.link.link_id,
            interface_a: linked.a,
            interface_b: linked.b,
        }))
    }

    async fn handle_create_link(&self, params: CreateLinkParams) -> Result<ToolOutput, CmlError> {
        let session = self.sessions.current().await?;
        let link = session
            .create_link(&params.lab_id, &params.interface_id_a, &params.interface_id_b)
            .await?;
        Ok(ToolOutput::LinkCreated(CreateLinkResult {
            message: format!(
                "Created link between interfaces {} and {}",
                link.interface_a, link.interface_b
            ),
            link_id: link.link_id,
            interface_id_a: link.interface_a,
            interface_id_b: link.interface_b,
            node_id_a: params.node_id_a,
            node_id_b: params.node_id_b,
        }))
    }

    async fn handle_get_lab_topology(
        &self,
        params: GetLabTopologyParams,
    ) -> Result<ToolOutput, CmlError> {
        let session = self.sessions.current().await?;
        let topology = session.lab_topology(&params.lab_id).await?;
        tracing::debug!(
            lab_id = %params.lab_id,
            nodes = topology.nodes.len(),
            links = topology.links.len(),
            "Topology fetched"
        );
        Ok(ToolOutput::Topology(topology))
    }

    /// Parse, execute and render one tool call. Never fails: errors become
    /// structured error results.
    async fn dispatch(
        &self,
        name: &str,
        args: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> CallToolResult {
        let request = match ToolRequest::parse(name, args) {
            Ok(r) => r,
            Err(e) => return Self::error_result(name, &e),
        };

        tracing::debug!(tool = request.name(), "Dispatching tool call");
        match self.execute(request).await {
            Ok(output) => Self::json_result(&output),
            Err(e) => Self::error_result(name, &e),
        }
    }

    /// Build the list of available tools
    fn build_tools_list() -> Vec<Tool> {
        vec![
            Tool::new(
                "initialize_client",
                "Authenticate with a CML server. Must be called before any other tool \
                 (set verify_ssl to false for self-signed certificates).",
                Self::schema_to_json_object::<InitializeClientParams>(),
            ),
            Tool::new(
                "create_lab",
                "Create a new lab in CML. Returns lab_id.",
                Self::schema_to_json_object::<CreateLabParams>(),
            ),
            Tool::new(
                "start_lab",
                "Start all nodes in a lab.",
                Self::schema_to_json_object::<StartLabParams>(),
            ),
            Tool::new(
                "stop_lab",
                "Stop all nodes in a lab.",
                Self::schema_to_json_object::<StopLabParams>(),
            ),
            Tool::new(
                "add_node",
                "Add a node (e.g. iosv, csr1000v) to a lab. Returns node_id.",
                Self::schema_to_json_object::<AddNodeParams>(),
            ),
            Tool::new(
                "link_nodes",
                "Link two nodes, automatically picking the first free physical interface \
                 on each (interface slot 0 is never used).",
                Self::schema_to_json_object::<LinkNodesParams>(),
            ),
            Tool::new(
                "create_link_v3",
                "Link two explicitly named interfaces in a lab.",
                Self::schema_to_json_object::<CreateLinkParams>(),
            ),
            Tool::new(
                "get_lab_topology",
                "Get the nodes, interfaces and links of a lab.",
                Self::schema_to_json_object::<GetLabTopologyParams>(),
            ),
        ]
    }
}

// ============================================================================
// ServerHandler Implementation
// ============================================================================

impl ServerHandler for CmlServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "CML Lab Builder - Build Cisco Modeling Labs topologies. \
                 Call initialize_client first, then create_lab, add_node for each device, \
                 link_nodes (or create_link_v3 for specific interfaces) to cable them, \
                 and start_lab. Use get_lab_topology to inspect the result."
                    .into(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: Self::build_tools_list(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.dispatch(request.name.as_ref(), request.arguments).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::TOOL_NAMES;
    use cml_core::ErrorKind;

    #[test]
    fn test_build_tools_list() {
        let tools = CmlServer::build_tools_list();
        assert_eq!(tools.len(), 8);
        for name in TOOL_NAMES {
            assert!(tools.iter().any(|t| t.name.as_ref() == name), "missing {name}");
        }
    }

    #[test]
    fn test_tool_schema_lists_required_fields() {
        let schema = CmlServer::schema_to_json_object::<LinkNodesParams>();
        let required = schema["required"].as_array().expect("required list");
        assert_eq!(required.len(), 3);
    }

    #[tokio::test]
    async fn test_operations_before_initialize_are_unauthenticated() {
        let server = CmlServer::new(CmlMcpConfig::default());
        let requests = [
            ("create_lab", serde_json::json!({"title": "OSPF Test Lab"})),
            ("start_lab", serde_json::json!({"lab_id": "lab-1"})),
            ("stop_lab", serde_json::json!({"lab_id": "lab-1"})),
            ("add_node", serde_json::json!({"lab_id": "lab-1", "label": "R1", "node_definition": "iosv"})),
            ("link_nodes", serde_json::json!({"lab_id": "lab-1", "node_id_a": "a", "node_id_b": "b"})),
            ("create_link_v3", serde_json::json!({"lab_id": "lab-1", "interface_id_a": "i1", "interface_id_b": "i2"})),
            ("get_lab_topology", serde_json::json!({"lab_id": "lab-1"})),
        ];
        for (name, args) in requests {
            let args = args.as_object().cloned();
            let request = ToolRequest::parse(name, args).expect(name);
            let err = server.execute(request).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unauthenticated, "{name}");
        }
    }

    #[tokio::test]
    async fn test_dispatch_never_fails() {
        let server = CmlServer::new(CmlMcpConfig::default());
        let result = server.dispatch("no_such_tool", None).await;
        assert_eq!(result.is_error, Some(true));

        let result = server.dispatch("start_lab", None).await;
        assert_eq!(result.is_error, Some(true));
    }

    #[tokio::test]
    async fn test_initialize_unreachable_host_is_authentication_failure() {
        let server = CmlServer::new(CmlMcpConfig::default());
        let request = ToolRequest::parse(
            "initialize_client",
            serde_json::json!({
                "base_url": "http://127.0.0.1:9",
                "username": "admin",
                "password": "secret"
            })
            .as_object()
            .cloned(),
        )
        .unwrap();
        let err = server.execute(request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);
        assert!(!server.sessions().is_initialized().await);
    }
}
