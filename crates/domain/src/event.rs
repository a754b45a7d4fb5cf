use serde::Serialize;

/// Client-facing events emitted while a turn executes.
///
/// Each value is serialized as one JSON object with a mandatory `event`
/// key and event-specific fields, matching the SSE wire contract.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum OutputEvent {
    /// A chunk of assistant text.
    #[serde(rename = "token")]
    Token { text: String },

    /// The model is invoking a tool.
    #[serde(rename = "tool_call")]
    ToolCall {
        tool: String,
        args: serde_json::Value,
    },

    /// Tool execution result.
    #[serde(rename = "tool_result")]
    ToolResult { tool: String, content: String },

    /// The run aborted; a generic user-safe message only.
    #[serde(rename = "error")]
    Error { message: String },
}

impl OutputEvent {
    /// The wire name of this event's `event` key.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Token { .. } => "token",
            Self::ToolCall { .. } => "tool_call",
            Self::ToolResult { .. } => "tool_result",
            Self::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_event_serializes_with_event_key() {
        let ev = OutputEvent::Token {
            text: "hello".into(),
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["event"], "token");
        assert_eq!(json["text"], "hello");
    }

    #[test]
    fn tool_call_event_carries_tool_and_args() {
        let ev = OutputEvent::ToolCall {
            tool: "get_user_cravings".into(),
            args: serde_json::json!({}),
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["event"], "tool_call");
        assert_eq!(json["tool"], "get_user_cravings");
    }
}
