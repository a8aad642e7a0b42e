//! Tool adapters for the Redash API.
//!
//! Each adapter decodes its arguments, builds a fresh client from the
//! environment, performs exactly one client call and folds the result (or
//! the failure) into a [`ToolOutcome`].

use crate::errors::{RedashError, ToolError};
use crate::mcp::envelope::ToolOutcome;
use crate::services::logger::Logger;
use crate::services::redash_client::{
    DataSource, ExecuteOutput, Query, QueryDetail, QueryDraft, RedashClient,
};
use crate::services::tool_executor::{HandlerMap, ToolHandler};
use crate::services::validation::Validation;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedashAction {
    ListQueries,
    GetQuery,
    CreateQuery,
    UpdateQuery,
    ExecuteQuery,
    ArchiveQuery,
    ListDataSources,
}

impl RedashAction {
    pub const ALL: [RedashAction; 7] = [
        RedashAction::ListQueries,
        RedashAction::GetQuery,
        RedashAction::CreateQuery,
        RedashAction::UpdateQuery,
        RedashAction::ExecuteQuery,
        RedashAction::ArchiveQuery,
        RedashAction::ListDataSources,
    ];

    pub fn tool_name(self) -> &'static str {
        match self {
            RedashAction::ListQueries => "list_queries",
            RedashAction::GetQuery => "get_query",
            RedashAction::CreateQuery => "create_query",
            RedashAction::UpdateQuery => "update_query",
            RedashAction::ExecuteQuery => "execute_query",
            RedashAction::ArchiveQuery => "archive_query",
            RedashAction::ListDataSources => "list_data_sources",
        }
    }

    /// Completes "Failed to ..." in the summary of a failed call.
    fn failure_verb(self) -> &'static str {
        match self {
            RedashAction::ListQueries => "fetch queries",
            RedashAction::GetQuery => "fetch query",
            RedashAction::CreateQuery => "create query",
            RedashAction::UpdateQuery => "update query",
            RedashAction::ExecuteQuery => "execute query",
            RedashAction::ArchiveQuery => "archive query",
            RedashAction::ListDataSources => "fetch data sources",
        }
    }
}

#[derive(Debug, Deserialize)]
struct NoArgs {}

#[derive(Debug, Deserialize)]
struct IdArgs {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct UpdateArgs {
    id: i64,
    name: String,
    query: String,
    data_source_id: i64,
}

#[derive(Debug, Serialize)]
struct QueriesPayload {
    queries: Vec<Query>,
}

#[derive(Debug, Serialize)]
struct QueryPayload {
    query: Option<QueryDetail>,
}

#[derive(Debug, Serialize)]
struct QueryResultPayload {
    query_result: Value,
}

#[derive(Debug, Serialize)]
struct ArchivePayload {
    success: bool,
    message: String,
}

#[derive(Debug, Serialize)]
struct DataSourcesPayload {
    data_sources: Vec<DataSource>,
}

/// Where a call failed; archive reports the two differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Client,
    Operation,
}

const ARCHIVED_MESSAGE: &str = "Query archived.";

#[derive(Clone)]
pub struct RedashManager {
    logger: Logger,
    validation: Validation,
    http: Client,
}

impl RedashManager {
    pub fn new(logger: Logger, validation: Validation) -> Result<Self, ToolError> {
        let http = RedashClient::build_http_client()
            .map_err(|err| ToolError::internal(format!("Failed to build HTTP client: {}", err)))?;
        Ok(Self::with_http_client(logger, validation, http))
    }

    pub fn with_http_client(logger: Logger, validation: Validation, http: Client) -> Self {
        Self {
            logger: logger.child("redash"),
            validation,
            http,
        }
    }

    pub async fn handle_action(
        &self,
        action: RedashAction,
        args: Value,
    ) -> Result<ToolOutcome, ToolError> {
        let tool = action.tool_name();
        match action {
            RedashAction::ListQueries => {
                self.validation.parse_args::<NoArgs>(tool, args)?;
                self.list_queries().await
            }
            RedashAction::GetQuery => {
                let args: IdArgs = self.validation.parse_args(tool, args)?;
                self.get_query(args.id).await
            }
            RedashAction::CreateQuery => {
                let draft: QueryDraft = self.validation.parse_args(tool, args)?;
                self.create_query(draft).await
            }
            RedashAction::UpdateQuery => {
                let args: UpdateArgs = self.validation.parse_args(tool, args)?;
                let draft = QueryDraft {
                    name: args.name,
                    query: args.query,
                    data_source_id: args.data_source_id,
                };
                self.update_query(args.id, draft).await
            }
            RedashAction::ExecuteQuery => {
                let args: IdArgs = self.validation.parse_args(tool, args)?;
                self.execute_query(args.id).await
            }
            RedashAction::ArchiveQuery => {
                let args: IdArgs = self.validation.parse_args(tool, args)?;
                self.archive_query(args.id).await
            }
            RedashAction::ListDataSources => {
                self.validation.parse_args::<NoArgs>(tool, args)?;
                self.list_data_sources().await
            }
        }
    }

    async fn list_queries(&self) -> Result<ToolOutcome, ToolError> {
        self.run(
            RedashAction::ListQueries,
            |client| async move { client.list_queries().await },
            |_, _| QueriesPayload {
                queries: Vec::new(),
            },
            |queries: Vec<Query>| {
                (
                    format!("Fetched {} queries.", queries.len()),
                    QueriesPayload { queries },
                )
            },
        )
        .await
    }

    async fn get_query(&self, id: i64) -> Result<ToolOutcome, ToolError> {
        self.run(
            RedashAction::GetQuery,
            |client| async move { client.get_query(id).await },
            |_, _| QueryPayload { query: None },
            |query: QueryDetail| {
                (
                    "Fetched query details.".to_string(),
                    QueryPayload { query: Some(query) },
                )
            },
        )
        .await
    }

    async fn create_query(&self, draft: QueryDraft) -> Result<ToolOutcome, ToolError> {
        self.run(
            RedashAction::CreateQuery,
            |client| async move { client.create_query(&draft).await },
            |_, _| QueryPayload { query: None },
            |query: QueryDetail| {
                (
                    "Created new query.".to_string(),
                    QueryPayload { query: Some(query) },
                )
            },
        )
        .await
    }

    async fn update_query(&self, id: i64, draft: QueryDraft) -> Result<ToolOutcome, ToolError> {
        self.run(
            RedashAction::UpdateQuery,
            |client| async move { client.update_query(id, &draft).await },
            |_, _| QueryPayload { query: None },
            |query: QueryDetail| {
                (
                    "Updated query.".to_string(),
                    QueryPayload { query: Some(query) },
                )
            },
        )
        .await
    }

    async fn execute_query(&self, id: i64) -> Result<ToolOutcome, ToolError> {
        let logger = self.logger.clone();
        self.run(
            RedashAction::ExecuteQuery,
            |client| async move { client.execute_query(id).await },
            |_, _| QueryResultPayload {
                query_result: Value::Null,
            },
            move |output: ExecuteOutput| {
                if !output.unwrapped {
                    logger.warn(
                        "execute response had no query_result; passing body through",
                        Some(&serde_json::json!({"id": id})),
                    );
                }
                (
                    "Executed query and fetched result.".to_string(),
                    QueryResultPayload {
                        query_result: output.result,
                    },
                )
            },
        )
        .await
    }

    async fn archive_query(&self, id: i64) -> Result<ToolOutcome, ToolError> {
        self.run(
            RedashAction::ArchiveQuery,
            |client| async move { client.archive_query(id).await },
            |stage, err| ArchivePayload {
                success: false,
                message: match stage {
                    Stage::Client => "client error".to_string(),
                    Stage::Operation => err.to_string(),
                },
            },
            |()| {
                (
                    ARCHIVED_MESSAGE.to_string(),
                    ArchivePayload {
                        success: true,
                        message: ARCHIVED_MESSAGE.to_string(),
                    },
                )
            },
        )
        .await
    }

    async fn list_data_sources(&self) -> Result<ToolOutcome, ToolError> {
        self.run(
            RedashAction::ListDataSources,
            |client| async move { client.list_data_sources().await },
            |_, _| DataSourcesPayload {
                data_sources: Vec::new(),
            },
            |data_sources: Vec<DataSource>| {
                (
                    format!("Fetched {} data sources.", data_sources.len()),
                    DataSourcesPayload { data_sources },
                )
            },
        )
        .await
    }

    /// Shared adapter skeleton: build client, call once, map the outcome.
    /// Only a payload encode failure escapes as `Err`.
    async fn run<T, P, Op, Fut, Fallback, Success>(
        &self,
        action: RedashAction,
        op: Op,
        fallback: Fallback,
        success: Success,
    ) -> Result<ToolOutcome, ToolError>
    where
        P: Serialize,
        Op: FnOnce(RedashClient) -> Fut,
        Fut: Future<Output = Result<T, RedashError>>,
        Fallback: Fn(Stage, &RedashError) -> P,
        Success: FnOnce(T) -> (String, P),
    {
        let client = match RedashClient::from_env(self.http.clone()) {
            Ok(client) => client,
            Err(err) => {
                self.log_failure(action, Stage::Client, &err);
                return ToolOutcome::from_payload(
                    format!("Failed to create client: {}", err),
                    &fallback(Stage::Client, &err),
                );
            }
        };
        self.logger.debug(
            "calling redash",
            Some(&serde_json::json!({
                "tool": action.tool_name(),
                "base_url": client.base_url(),
            })),
        );

        match op(client).await {
            Ok(value) => {
                let (summary, payload) = success(value);
                ToolOutcome::from_payload(summary, &payload)
            }
            Err(err) => {
                self.log_failure(action, Stage::Operation, &err);
                ToolOutcome::from_payload(
                    format!("Failed to {}: {}", action.failure_verb(), err),
                    &fallback(Stage::Operation, &err),
                )
            }
        }
    }

    fn log_failure(&self, action: RedashAction, stage: Stage, err: &RedashError) {
        let stage = match stage {
            Stage::Client => "client",
            Stage::Operation => "operation",
        };
        self.logger.warn(
            "redash call failed",
            Some(&serde_json::json!({
                "tool": action.tool_name(),
                "stage": stage,
                "error": err.to_string(),
            })),
        );
    }
}

/// Registry entry binding one action to the shared manager.
pub struct RedashTool {
    manager: Arc<RedashManager>,
    action: RedashAction,
}

impl RedashTool {
    pub fn new(manager: Arc<RedashManager>, action: RedashAction) -> Self {
        Self { manager, action }
    }
}

#[async_trait]
impl ToolHandler for RedashTool {
    async fn handle(&self, args: Value) -> Result<ToolOutcome, ToolError> {
        self.manager.handle_action(self.action, args).await
    }
}

pub fn redash_handlers(manager: Arc<RedashManager>) -> HandlerMap {
    let mut handlers = HandlerMap::new();
    for action in RedashAction::ALL {
        handlers.insert(
            action.tool_name().to_string(),
            Arc::new(RedashTool::new(manager.clone(), action)),
        );
    }
    handlers
}
