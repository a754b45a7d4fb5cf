//! OpenAI-compatible adapter.
//!
//! Works with OpenAI, Azure-style gateways, Ollama, vLLM, LM Studio, and
//! any other endpoint that follows the OpenAI chat completions contract.

use serde_json::Value;

use qc_domain::config::LlmConfig;
use qc_domain::error::{Error, Result};
use qc_domain::message::Message;
use qc_domain::tool::{ToolCall, ToolDefinition};

use crate::traits::{ChatModel, ChatRequest, ChatResponse};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A chat-completion adapter for any OpenAI-compatible API endpoint.
pub struct OpenAiCompatModel {
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    client: reqwest::Client,
}

impl OpenAiCompatModel {
    /// Create a new adapter from config. The API key comes from the
    /// environment variable named in `[llm] api_key_env`; when unset the
    /// request goes out without an `Authorization` header (local endpoints
    /// such as Ollama accept that).
    pub fn from_config(cfg: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var(&cfg.api_key_env).ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            tracing::warn!(
                env = %cfg.api_key_env,
                "no API key configured; sending unauthenticated requests"
            );
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            api_key,
            temperature: cfg.temperature,
            client,
        })
    }

    fn build_body(&self, req: &ChatRequest) -> Value {
        let messages: Vec<Value> = req.messages.iter().map(msg_to_openai).collect();

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": req.temperature.unwrap_or(self.temperature),
        });
        if !req.tools.is_empty() {
            let tools: Vec<Value> = req.tools.iter().map(tool_to_openai).collect();
            body["tools"] = Value::Array(tools);
        }
        if let Some(max) = req.max_tokens {
            body["max_tokens"] = serde_json::json!(max);
        }
        body
    }
}

#[async_trait::async_trait]
impl ChatModel for OpenAiCompatModel {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_body(req);

        let mut builder = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(format!("chat completion: {e}"))
            } else {
                Error::Http(e.to_string())
            }
        })?;

        let status = resp.status();
        let payload: Value = resp.json().await.map_err(|e| Error::Provider {
            provider: "openai_compat".into(),
            message: format!("malformed response body: {e}"),
        })?;

        if !status.is_success() {
            let message = payload["error"]["message"]
                .as_str()
                .unwrap_or("request failed")
                .to_string();
            return Err(Error::Provider {
                provider: "openai_compat".into(),
                message: format!("HTTP {status}: {message}"),
            });
        }

        parse_chat_response(&payload)
    }

    fn provider_id(&self) -> &str {
        "openai_compat"
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Message serialization helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn msg_to_openai(msg: &Message) -> Value {
    match msg {
        Message::System { text } => serde_json::json!({
            "role": "system",
            "content": text,
        }),
        Message::User { text } => serde_json::json!({
            "role": "user",
            "content": text,
        }),
        Message::Assistant { text, tool_calls } => {
            let mut obj = serde_json::json!({ "role": "assistant" });
            obj["content"] = if text.is_empty() {
                Value::Null
            } else {
                Value::String(text.clone())
            };
            if !tool_calls.is_empty() {
                let calls: Vec<Value> = tool_calls
                    .iter()
                    .map(|tc| {
                        serde_json::json!({
                            "id": tc.call_id,
                            "type": "function",
                            "function": {
                                "name": tc.tool_name,
                                "arguments": tc.arguments.to_string(),
                            }
                        })
                    })
                    .collect();
                obj["tool_calls"] = Value::Array(calls);
            }
            obj
        }
        Message::ToolResult {
            call_id, content, ..
        } => serde_json::json!({
            "role": "tool",
            "tool_call_id": call_id,
            "content": content,
        }),
    }
}

fn tool_to_openai(tool: &ToolDefinition) -> Value {
    serde_json::json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        }
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response deserialization helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn parse_chat_response(body: &Value) -> Result<ChatResponse> {
    let choice = body
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
        .ok_or_else(|| Error::Provider {
            provider: "openai_compat".into(),
            message: "no choices in response".into(),
        })?;

    let message = choice.get("message").ok_or_else(|| Error::Provider {
        provider: "openai_compat".into(),
        message: "no message in choice".into(),
    })?;

    let text = message
        .get("content")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let model = body
        .get("model")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();

    Ok(ChatResponse {
        text,
        tool_calls: parse_tool_calls(message),
        model,
    })
}

fn parse_tool_calls(message: &Value) -> Vec<ToolCall> {
    let arr = match message.get("tool_calls").and_then(|v| v.as_array()) {
        Some(a) => a,
        None => return Vec::new(),
    };
    arr.iter()
        .filter_map(|tc| {
            let name = tc["function"]["name"].as_str()?.to_string();
            let call_id = tc
                .get("id")
                .and_then(|v| v.as_str())
                .map(String::from)
                .unwrap_or_else(|| format!("call_{}", uuid::Uuid::new_v4()));
            // Arguments arrive as a JSON-encoded string; an empty or
            // unparsable payload becomes an empty object rather than
            // dropping the call.
            let raw_args = tc["function"]["arguments"].as_str().unwrap_or("");
            let arguments = if raw_args.trim().is_empty() {
                Value::Object(Default::default())
            } else {
                serde_json::from_str(raw_args).unwrap_or_else(|e| {
                    tracing::warn!(
                        tool = %name,
                        error = %e,
                        "tool call arguments are not valid JSON; defaulting to empty object"
                    );
                    Value::Object(Default::default())
                })
            };
            Some(ToolCall {
                call_id,
                tool_name: name,
                arguments,
            })
        })
        .collect()
}
