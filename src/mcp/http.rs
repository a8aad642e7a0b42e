//! Streamable HTTP transport: one JSON-RPC message per POST, answered with
//! a single JSON body. No server-initiated streams are offered, so GET on
//! the endpoint is 405.

use crate::constants::http::MCP_PATH;
use crate::errors::ToolError;
use crate::mcp::server::McpServer;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;
use tokio::net::TcpListener;

pub fn router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/", post(handle_post))
        .route(MCP_PATH, post(handle_post))
        .with_state(server)
}

async fn handle_post(State(server): State<Arc<McpServer>>, body: String) -> Response {
    match server.handle_message(&body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

pub async fn serve(listener: TcpListener, server: Arc<McpServer>) -> Result<(), ToolError> {
    axum::serve(listener, router(server)).await?;
    Ok(())
}

pub async fn run_http(addr: &str) -> Result<(), ToolError> {
    let server = Arc::new(McpServer::new()?);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|err| ToolError::internal(format!("Failed to bind {}: {}", addr, err)))?;
    let local = listener.local_addr()?;
    server.logger().info(
        "MCP handler listening",
        Some(&serde_json::json!({"addr": local.to_string()})),
    );
    serve(listener, server).await
}
