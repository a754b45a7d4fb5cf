//! Chat-completion provider adapters.
//!
//! The orchestrator only sees the [`ChatModel`] trait; the single concrete
//! adapter speaks the OpenAI chat-completions wire format, which also covers
//! Azure OpenAI-style gateways, Ollama, vLLM, and LM Studio.

mod openai_compat;
mod traits;

pub use openai_compat::OpenAiCompatModel;
pub use traits::{ChatModel, ChatRequest, ChatResponse};
