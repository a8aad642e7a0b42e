use crate::app::App;
use crate::constants::server::{NAME, PROTOCOL_VERSION, VERSION};
use crate::errors::{ErrorCode, McpError, ToolError};
use crate::mcp::catalog::{list_tools, validate_tool_args};
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::services::logger::Logger;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

pub struct McpServer {
    app: Arc<App>,
    logger: Logger,
}

impl McpServer {
    pub fn new() -> Result<Self, ToolError> {
        let app = App::initialize()?;
        Ok(Self::from_app(Arc::new(app)))
    }

    pub fn from_app(app: Arc<App>) -> Self {
        let logger = app.logger.child("transport");
        Self { app, logger }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    fn handle_initialize(&self) -> Value {
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {"tools": {"listChanged": false}},
            "serverInfo": {"name": NAME, "version": VERSION},
        })
    }

    fn handle_tools_list(&self) -> Value {
        serde_json::json!({ "tools": list_tools() })
    }

    async fn handle_tools_call(&self, params: &Value) -> Result<Value, McpError> {
        let name = params.get("name").and_then(Value::as_str).unwrap_or("");
        if name.is_empty() {
            return Err(McpError::new(ErrorCode::InvalidParams, "Missing tool name"));
        }
        let args = match params.get("arguments") {
            None | Some(Value::Null) => Value::Object(Default::default()),
            Some(args) => args.clone(),
        };

        validate_tool_args(name, &args)?;

        let outcome = self
            .app
            .tool_executor
            .execute(name, args)
            .await
            .map_err(|err| McpError::from_tool_error(name, &err))?;
        Ok(outcome.to_call_result())
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            self.logger.debug(
                "notification",
                Some(&serde_json::json!({"method": request.method})),
            );
            return None;
        }
        let id = request.id.clone().unwrap_or_default();

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, self.handle_initialize()),
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => JsonRpcResponse::success(id, self.handle_tools_list()),
            "tools/call" => match self.handle_tools_call(&request.params).await {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(err) => JsonRpcResponse::failure(id, err.code.as_i32(), err.message),
            },
            method if method.starts_with("notifications/") => {
                JsonRpcResponse::success(id, serde_json::json!({}))
            }
            _ => JsonRpcResponse::failure(
                id,
                ErrorCode::MethodNotFound.as_i32(),
                "Method not found".to_string(),
            ),
        };
        Some(response)
    }

    /// Handles one raw JSON-RPC message. `None` means nothing should be sent
    /// back (the message was a notification).
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        self.logger
            .debug("recv", Some(&serde_json::json!({"message": raw})));

        let parsed: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(_) => {
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    ErrorCode::ParseError.as_i32(),
                    "Parse error".to_string(),
                ))
            }
        };
        let request: JsonRpcRequest = match serde_json::from_value(parsed) {
            Ok(request) => request,
            Err(_) => {
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    ErrorCode::InvalidRequest.as_i32(),
                    "Invalid request".to_string(),
                ))
            }
        };

        let response = self.handle_request(request).await;
        if let Some(response) = &response {
            self.logger
                .debug("send", Some(&serde_json::json!({"message": response})));
        }
        response
    }

    pub async fn run_stdio(&self) -> Result<(), ToolError> {
        self.logger.info("serving MCP over stdio", None);
        self.serve_lines(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await?;
        self.logger.info("stdin closed, shutting down", None);
        Ok(())
    }

    /// Newline-delimited JSON-RPC loop until `input` hits EOF. A line that is
    /// not UTF-8 gets a parse error reply and the session continues.
    pub async fn serve_lines<R, W>(&self, mut input: R, output: W) -> Result<(), ToolError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut writer = BufWriter::new(output);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            let response = match std::str::from_utf8(&buf) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    self.handle_message(trimmed).await
                }
                Err(err) => {
                    self.logger.warn(
                        "input line is not valid UTF-8",
                        Some(&serde_json::json!({"error": err.to_string()})),
                    );
                    Some(JsonRpcResponse::failure(
                        Value::Null,
                        ErrorCode::ParseError.as_i32(),
                        "Parse error".to_string(),
                    ))
                }
            };
            let Some(response) = response else {
                continue;
            };
            let payload = serde_json::to_string(&response).map_err(|err| {
                ToolError::internal(format!("Failed to encode JSON-RPC response: {}", err))
            })?;
            writer.write_all(payload.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok(())
    }
}

pub async fn run_stdio() -> Result<(), ToolError> {
    let server = McpServer::new()?;
    server.run_stdio().await
}
