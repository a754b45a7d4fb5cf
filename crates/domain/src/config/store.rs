use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Persistence paths
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root directory for user data and thread checkpoints.
    /// Checkpoints land in `<data_dir>/threads/<thread_id>.jsonl`,
    /// user records in `<data_dir>/users/<user_id>.json`.
    #[serde(default = "d_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: d_data_dir(),
        }
    }
}

fn d_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
