use crate::errors::ToolError;
use serde::Serialize;
use serde_json::Value;

/// Outcome of a tool that ran: a one-line summary for humans plus the JSON
/// payload for machines. Remote failures are outcomes too.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub summary: String,
    pub payload: Value,
    payload_text: String,
}

impl ToolOutcome {
    /// `payload_text` is encoded from the typed payload so field order on the
    /// wire follows the struct declaration.
    pub fn from_payload<T: Serialize>(
        summary: impl Into<String>,
        payload: &T,
    ) -> Result<Self, ToolError> {
        let payload_text = serde_json::to_string(payload)?;
        let payload = serde_json::to_value(payload)?;
        Ok(Self {
            summary: summary.into(),
            payload,
            payload_text,
        })
    }

    pub fn payload_text(&self) -> &str {
        &self.payload_text
    }

    /// MCP `CallToolResult`: summary then payload as text content, the payload
    /// again as structured content. `isError` stays false even for remote
    /// failures.
    pub fn to_call_result(&self) -> Value {
        serde_json::json!({
            "content": [
                { "type": "text", "text": self.summary },
                { "type": "text", "text": self.payload_text },
            ],
            "structuredContent": self.payload,
            "isError": false,
        })
    }
}
