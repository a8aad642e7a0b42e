use crate::errors::ToolError;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct Validation;

impl Validation {
    pub fn new() -> Self {
        Self
    }

    /// Decodes tool arguments into their typed form. A missing `arguments`
    /// member is treated as an empty object so argument-less tools accept it.
    pub fn parse_args<T: DeserializeOwned>(&self, tool: &str, args: Value) -> Result<T, ToolError> {
        let args = match args {
            Value::Null => Value::Object(Default::default()),
            Value::Object(_) => args,
            other => {
                return Err(ToolError::invalid_params(format!(
                    "{} arguments must be an object, got {}",
                    tool,
                    value_type_name(&other)
                )))
            }
        };
        serde_json::from_value(args).map_err(|err| {
            ToolError::invalid_params(format!("Invalid arguments for {}: {}", tool, err))
        })
    }
}

pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
