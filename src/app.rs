use crate::constants::server::NAME;
use crate::errors::ToolError;
use crate::managers::redash::{redash_handlers, RedashManager};
use crate::mcp::catalog::tool_catalog;
use crate::services::logger::Logger;
use crate::services::tool_executor::{HandlerMap, ToolExecutor};
use crate::services::validation::Validation;
use std::collections::HashSet;
use std::sync::Arc;

pub struct App {
    pub logger: Logger,
    pub tool_executor: Arc<ToolExecutor>,
}

impl App {
    /// Catalog and handler map must name exactly the same tools.
    fn validate_tool_wiring(handlers: &HandlerMap) -> Result<(), ToolError> {
        let catalog: HashSet<&str> = tool_catalog().iter().map(|t| t.name.as_str()).collect();
        let mut missing: Vec<&str> = catalog
            .iter()
            .copied()
            .filter(|name| !handlers.contains_key(*name))
            .collect();
        let mut uncataloged: Vec<&str> = handlers
            .keys()
            .map(String::as_str)
            .filter(|name| !catalog.contains(name))
            .collect();
        if missing.is_empty() && uncataloged.is_empty() {
            return Ok(());
        }
        missing.sort();
        uncataloged.sort();
        Err(ToolError::internal("Tool wiring is incomplete")
            .with_hint("every tool in tool_catalog.json needs a handler and vice versa")
            .with_details(serde_json::json!({
                "missing_handlers": missing,
                "uncataloged_handlers": uncataloged,
            })))
    }

    pub fn initialize() -> Result<Self, ToolError> {
        let logger = Logger::new(NAME);
        let validation = Validation::new();
        let redash_manager = Arc::new(RedashManager::new(logger.clone(), validation)?);
        Self::with_handlers(logger, redash_handlers(redash_manager))
    }

    pub fn with_handlers(logger: Logger, handlers: HandlerMap) -> Result<Self, ToolError> {
        Self::validate_tool_wiring(&handlers)?;
        let tool_executor = Arc::new(ToolExecutor::new(logger.clone(), handlers));
        Ok(Self {
            logger,
            tool_executor,
        })
    }
}
