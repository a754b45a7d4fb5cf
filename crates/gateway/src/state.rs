//! Shared application state handed to every request handler and turn.

use std::sync::Arc;

use qc_domain::config::Config;
use qc_providers::ChatModel;
use qc_store::{CheckpointStore, UserDataStore};

use crate::runtime::policy::PolicyFilter;
use crate::runtime::tools::ToolRegistry;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub model: Arc<dyn ChatModel>,
    pub user_data: Arc<dyn UserDataStore>,
    pub checkpoints: Arc<dyn CheckpointStore>,
    pub tools: Arc<ToolRegistry>,
    pub policy: Arc<PolicyFilter>,
    /// SHA-256 of the bearer token; `None` disables auth (dev mode).
    pub api_token_hash: Option<Arc<Vec<u8>>>,
}
