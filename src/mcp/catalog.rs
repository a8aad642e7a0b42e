use crate::errors::{ErrorCode, McpError};
use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

static TOOL_CATALOG: Lazy<Vec<ToolDef>> = Lazy::new(|| {
    let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tool_catalog.json"));
    serde_json::from_str(raw).expect("tool_catalog.json must be valid JSON")
});

static TOOL_VALIDATORS: Lazy<HashMap<String, JSONSchema>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for tool in TOOL_CATALOG.iter() {
        if let Ok(schema) = JSONSchema::compile(&tool.input_schema) {
            map.insert(tool.name.clone(), schema);
        }
    }
    map
});

pub fn tool_catalog() -> &'static Vec<ToolDef> {
    &TOOL_CATALOG
}

/// Checks `args` against the tool's input schema. Tools missing from the
/// catalog pass through; the executor reports them as unknown.
pub fn validate_tool_args(tool_name: &str, args: &Value) -> Result<(), McpError> {
    let Some(schema) = TOOL_VALIDATORS.get(tool_name) else {
        return Ok(());
    };
    if let Err(errors) = schema.validate(args) {
        let mut lines = vec![format!("Invalid arguments for {}", tool_name)];
        for err in errors.take(10) {
            let path = err.instance_path.to_string();
            let path = if path.is_empty() {
                "(root)".to_string()
            } else {
                path
            };
            lines.push(format!("- {}: {}", path, describe_error(&err.kind, &err)));
        }
        return Err(McpError::new(ErrorCode::InvalidParams, lines.join("\n")));
    }
    Ok(())
}

fn describe_error(kind: &ValidationErrorKind, err: &dyn std::fmt::Display) -> String {
    match kind {
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            let fields: Vec<String> = unexpected.iter().map(|f| format!("'{}'", f)).collect();
            format!("unknown field {}", fields.join(", "))
        }
        ValidationErrorKind::Required { property } => {
            let prop = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            format!("missing required field '{}'", prop)
        }
        ValidationErrorKind::Type { kind } => format!("expected {}", format_type_kind(kind)),
        _ => err.to_string(),
    }
}

fn format_type_kind(kind: &TypeKind) -> String {
    match kind {
        TypeKind::Single(primitive) => primitive.to_string(),
        TypeKind::Multiple(types) => {
            let list: Vec<String> = (*types).into_iter().map(|t| t.to_string()).collect();
            if list.is_empty() {
                "unknown".to_string()
            } else {
                list.join(" | ")
            }
        }
    }
}

/// Catalog entries as advertised by `tools/list`.
pub fn list_tools() -> Vec<ToolDef> {
    TOOL_CATALOG.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_the_seven_redash_tools() {
        let names: Vec<&str> = tool_catalog().iter().map(|t| t.name.as_str()).collect();
        for expected in [
            "list_queries",
            "get_query",
            "create_query",
            "update_query",
            "execute_query",
            "archive_query",
            "list_data_sources",
        ] {
            assert!(names.contains(&expected), "missing {}", expected);
        }
        assert_eq!(names.len(), 7);
    }

    #[test]
    fn every_schema_compiles() {
        for tool in tool_catalog() {
            assert!(
                TOOL_VALIDATORS.contains_key(&tool.name),
                "schema for {} must compile",
                tool.name
            );
        }
    }

    #[test]
    fn rejects_missing_required_field() {
        let err = validate_tool_args("get_query", &serde_json::json!({})).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams);
        assert!(err.message.contains("missing required field 'id'"));
    }

    #[test]
    fn rejects_wrong_type_and_unknown_fields() {
        let err = validate_tool_args("get_query", &serde_json::json!({"id": "5"})).unwrap_err();
        assert!(err.message.contains("/id: expected integer"));

        let err = validate_tool_args("list_queries", &serde_json::json!({"page": 2})).unwrap_err();
        assert!(err.message.contains("unknown field 'page'"));
    }

    #[test]
    fn accepts_valid_arguments_and_unknown_tools() {
        assert!(validate_tool_args(
            "create_query",
            &serde_json::json!({"name": "A", "query": "select 1", "data_source_id": 3})
        )
        .is_ok());
        assert!(validate_tool_args("no_such_tool", &Value::Null).is_ok());
    }
}
