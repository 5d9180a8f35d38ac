//! Tool schema types.
//!
//! [`Tool`] is the schema a tool presents to the host/LLM when registered.
//! Execution traits live with the extension that registers the tool.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Schema of an agent-invocable tool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Tool name — the exact string sent to/from the LLM.
    pub name: String,
    /// Human-readable description shown to the model.
    pub description: String,
    /// JSON Schema of the tool arguments.
    pub input_schema: Value,
}

impl Tool {
    /// Create a new tool schema.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Result content a tool hands back to the agent loop.
///
/// Tools in this subsystem always resolve to text; failures are reported as
/// text content too so the agent can see and react to them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutput {
    /// Text content returned to the agent.
    pub content: String,
    /// Whether the tool reports a failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ToolOutput {
    /// Successful text output.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: None,
        }
    }

    /// Failure reported as text content.
    #[must_use]
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: Some(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_schema_wire_format() {
        let tool = Tool::new("handoff", "Start a handoff", json!({"type": "object"}));
        let json = serde_json::to_value(&tool).unwrap();
        assert_eq!(json["name"], "handoff");
        assert_eq!(json["inputSchema"]["type"], "object");
    }

    #[test]
    fn tool_output_error_flag() {
        let ok = ToolOutput::text("done");
        assert!(ok.is_error.is_none());
        let err = ToolOutput::error("no model");
        assert_eq!(err.is_error, Some(true));
    }
}
