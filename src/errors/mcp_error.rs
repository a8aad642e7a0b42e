use super::tool_error::{ToolError, ToolErrorKind};
use serde::Serialize;
use std::fmt;

/// JSON-RPC error codes the server can put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(i32)]
pub enum ErrorCode {
    ParseError = -32700,
    InvalidRequest = -32600,
    MethodNotFound = -32601,
    InvalidParams = -32602,
    InternalError = -32603,
}

impl ErrorCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct McpError {
    pub code: ErrorCode,
    pub message: String,
}

impl McpError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn from_tool_error(tool: &str, error: &ToolError) -> Self {
        let mut message = format!("{}: {}", tool, error.message);
        if let Some(hint) = &error.hint {
            message.push_str(&format!(" (hint: {})", hint));
        }
        let code = match error.kind {
            ToolErrorKind::InvalidParams => ErrorCode::InvalidParams,
            ToolErrorKind::Internal => ErrorCode::InternalError,
        };
        Self::new(code, message)
    }
}

impl fmt::Display for McpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for McpError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_params_tool_error_maps_to_32602() {
        let err = ToolError::invalid_params("id must be an integer").with_hint("pass a number");
        let mapped = McpError::from_tool_error("get_query", &err);
        assert_eq!(mapped.code.as_i32(), -32602);
        assert_eq!(
            mapped.message,
            "get_query: id must be an integer (hint: pass a number)"
        );
    }

    #[test]
    fn internal_tool_error_maps_to_32603() {
        let err = ToolError::internal("encode failed");
        let mapped = McpError::from_tool_error("list_queries", &err);
        assert_eq!(mapped.code, ErrorCode::InternalError);
    }
}
