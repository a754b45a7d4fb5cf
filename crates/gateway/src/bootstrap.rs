//! Startup wiring: config validation, store construction, provider
//! adapter, and the shared [`AppState`].

use std::sync::Arc;

use anyhow::Context;
use qc_domain::config::{Config, ConfigSeverity};
use qc_providers::OpenAiCompatModel;
use qc_store::{FileUserDataStore, JsonlCheckpointStore};
use tracing::warn;

use crate::api::auth::token_hash;
use crate::runtime::policy::PolicyFilter;
use crate::runtime::tools::ToolRegistry;
use crate::state::AppState;

/// Build the shared application state from a loaded config.
///
/// Validation errors abort startup; warnings only log.
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    let mut fatal = false;
    for issue in config.validate() {
        match issue.severity {
            ConfigSeverity::Error => {
                tracing::error!(%issue, "config error");
                fatal = true;
            }
            ConfigSeverity::Warning => warn!(%issue, "config warning"),
        }
    }
    if fatal {
        anyhow::bail!("configuration is invalid, refusing to start");
    }

    let data_dir = std::path::Path::new(&config.store.data_dir);
    let user_data =
        FileUserDataStore::new(&data_dir.join("users")).context("opening user data store")?;
    let checkpoints =
        JsonlCheckpointStore::new(&data_dir.join("threads")).context("opening checkpoint store")?;

    let model = OpenAiCompatModel::from_config(&config.llm).context("building model adapter")?;
    let policy = PolicyFilter::new().context("compiling content policy")?;

    let api_token_hash = token_hash(std::env::var(&config.server.api_token_env).ok());
    if api_token_hash.is_none() {
        warn!(
            env = %config.server.api_token_env,
            "no API token configured; endpoints are unauthenticated"
        );
    }

    Ok(AppState {
        config,
        model: Arc::new(model),
        user_data: Arc::new(user_data),
        checkpoints: Arc::new(checkpoints),
        tools: Arc::new(ToolRegistry::standard()),
        policy: Arc::new(policy),
        api_token_hash: api_token_hash.map(Arc::new),
    })
}
