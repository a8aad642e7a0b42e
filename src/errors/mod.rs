mod mcp_error;
mod redash_error;
mod tool_error;

pub use mcp_error::{ErrorCode, McpError};
pub use redash_error::RedashError;
pub use tool_error::{ToolError, ToolErrorKind};
