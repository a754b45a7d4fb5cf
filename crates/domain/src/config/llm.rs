use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chat-completion provider
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible chat completions endpoint.
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Model identifier sent in the request body.
    #[serde(default = "d_model")]
    pub model: String,
    /// Environment variable holding the API key.
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    /// Sampling temperature.
    #[serde(default = "d_temperature")]
    pub temperature: f32,
    /// Hard timeout for one completion request, in milliseconds.
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            model: d_model(),
            api_key_env: d_api_key_env(),
            temperature: d_temperature(),
            timeout_ms: d_timeout_ms(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn d_model() -> String {
    "gpt-4.1".into()
}
fn d_api_key_env() -> String {
    "QC_LLM_API_KEY".into()
}
fn d_temperature() -> f32 {
    0.2
}
fn d_timeout_ms() -> u64 {
    60_000
}
