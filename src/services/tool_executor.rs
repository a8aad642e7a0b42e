use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::errors::ToolError;
use crate::mcp::envelope::ToolOutcome;
use crate::services::logger::Logger;

/// One callable tool. `Ok` means the tool ran (whether or not the remote
/// call succeeded); `Err` means the invocation itself was unusable.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, args: Value) -> Result<ToolOutcome, ToolError>;
}

pub type HandlerMap = HashMap<String, Arc<dyn ToolHandler>>;

#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    handlers: Arc<HandlerMap>,
}

impl ToolExecutor {
    pub fn new(logger: Logger, handlers: HandlerMap) -> Self {
        Self {
            logger: logger.child("executor"),
            handlers: Arc::new(handlers),
        }
    }

    pub fn has_tool(&self, tool: &str) -> bool {
        self.handlers.contains_key(tool)
    }

    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn execute(&self, tool: &str, args: Value) -> Result<ToolOutcome, ToolError> {
        let Some(handler) = self.handlers.get(tool) else {
            return Err(
                ToolError::invalid_params(format!("Unknown tool: {}", tool)).with_hint(format!(
                    "Available tools: {}",
                    self.tool_names().join(", ")
                )),
            );
        };

        let trace_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();
        self.logger.debug(
            "tool call started",
            Some(&serde_json::json!({"tool": tool, "trace_id": trace_id})),
        );

        let result = handler.handle(args).await;

        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(outcome) => self.logger.debug(
                "tool call finished",
                Some(&serde_json::json!({
                    "tool": tool,
                    "trace_id": trace_id,
                    "duration_ms": duration_ms,
                    "summary": outcome.summary,
                })),
            ),
            Err(err) => self.logger.warn(
                "tool call rejected",
                Some(&serde_json::json!({
                    "tool": tool,
                    "trace_id": trace_id,
                    "duration_ms": duration_ms,
                    "code": err.code,
                    "message": err.message,
                })),
            ),
        }
        result
    }
}
