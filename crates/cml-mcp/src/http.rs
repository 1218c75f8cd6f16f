//! Streamable HTTP transport for remote AI agents.
//!
//! Exposes the same [`CmlServer`] over rmcp's StreamableHttpService.
//!
//! ## Endpoints
//!
//! - `POST /mcp` - JSON-RPC requests
//! - `GET /mcp` - SSE stream for server-initiated messages
//! - `GET /health` - Health check (reports whether a CML session exists)
//! - `GET /` - Server info

use crate::request::TOOL_NAMES;
use crate::server::CmlServer;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the HTTP router for the MCP server.
pub fn build_router(server: CmlServer) -> Router {
    let session_manager = Arc::new(LocalSessionManager::default());

    let mcp_server = server.clone();
    let mcp_service = StreamableHttpService::new(
        move || Ok(mcp_server.clone()),
        session_manager,
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .route("/health", get(health_handler))
        .route("/", get(root_handler))
        .with_state(server)
        .fallback_service(mcp_service)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

async fn health_handler(State(server): State<CmlServer>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "cml-mcp",
        "cml_session": server.sessions().is_initialized().await,
    }))
}

async fn root_handler() -> impl IntoResponse {
    let tools: String = TOOL_NAMES
        .iter()
        .map(|name| format!("        <li><code>{name}</code></li>\n"))
        .collect();

    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>CML Lab Builder MCP Server</title>
    <style>
        body {{ font-family: system-ui; max-width: 800px; margin: 50px auto; padding: 20px; }}
        code {{ background: #f4f4f4; padding: 2px 6px; border-radius: 3px; }}
    </style>
</head>
<body>
    <h1>CML Lab Builder MCP Server</h1>
    <p>Model Context Protocol server for building Cisco Modeling Labs topologies.</p>

    <h2>Endpoints</h2>
    <ul>
        <li><code>POST /mcp</code> - MCP JSON-RPC requests</li>
        <li><code>GET /mcp</code> - SSE stream for server messages</li>
        <li><code>GET /health</code> - Health check</li>
    </ul>

    <h2>Available Tools</h2>
    <ul>
{tools}    </ul>
</body>
</html>"#
    ))
}

/// Start the HTTP server; runs until `shutdown` resolves.
pub async fn serve(
    server: CmlServer,
    addr: std::net::SocketAddr,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let router = build_router(server);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "HTTP transport listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CmlMcpConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn router() -> Router {
        build_router(CmlServer::new(CmlMcpConfig::default()))
    }

    #[tokio::test]
    async fn test_health_reports_missing_session() {
        let response = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["cml_session"], false);
    }

    #[tokio::test]
    async fn test_root_lists_tools() {
        let response = router()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        for name in TOOL_NAMES {
            assert!(html.contains(name), "missing {name}");
        }
    }
}
