pub mod logger;
pub mod redash_client;
pub mod tool_executor;
pub mod validation;
