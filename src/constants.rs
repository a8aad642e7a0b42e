pub mod env {
    pub const REDASH_BASE_URL: &str = "REDASH_BASE_URL";
    pub const REDASH_API_KEY: &str = "REDASH_API_KEY";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
}

pub mod server {
    pub const NAME: &str = "redash-mcp";
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PROTOCOL_VERSION: &str = "2025-06-18";
}

pub mod redash {
    pub const AUTH_SCHEME: &str = "Key";
    pub const QUERIES_PATH: &str = "/api/queries";
    pub const DATA_SOURCES_PATH: &str = "/api/data_sources";
    pub const USER_AGENT: &str = concat!("redash-mcp/", env!("CARGO_PKG_VERSION"));
}

pub mod http {
    pub const MCP_PATH: &str = "/mcp";
}
