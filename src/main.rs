use clap::Parser;
use redash_mcp::constants::server::NAME;
use redash_mcp::services::logger::Logger;

/// MCP server exposing Redash queries and data sources as tools.
///
/// Credentials come from REDASH_BASE_URL and REDASH_API_KEY, read on every
/// tool call.
#[derive(Debug, Parser)]
#[command(name = "redash-mcp", version)]
struct Cli {
    /// Serve streamable HTTP at this address instead of stdin/stdout.
    #[arg(long, value_name = "ADDR")]
    http: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let result = match cli.http.as_deref() {
        Some(addr) => redash_mcp::mcp::http::run_http(addr).await,
        None => redash_mcp::mcp::server::run_stdio().await,
    };
    if let Err(err) = result {
        Logger::new(NAME).error(
            "server stopped",
            Some(&serde_json::json!({"error": err.to_string()})),
        );
        std::process::exit(1);
    }
}
