mod coach;
mod llm;
mod server;
mod store;

pub use coach::*;
pub use llm::*;
pub use server::*;
pub use store::*;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub coach: CoachConfig,
}

/// Severity of a config validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Warning,
    Error,
}

/// One validation finding.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: ConfigSeverity,
    pub message: String,
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Config {
    /// Sanity-check the loaded config. Errors abort startup; warnings log.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.llm.base_url.is_empty() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                message: "[llm] base_url must not be empty".into(),
            });
        }
        if self.coach.max_tool_loops == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                message: "[coach] max_tool_loops must be at least 1".into(),
            });
        }
        if self.coach.recent_rows == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                message: "[coach] recent_rows = 0 disables craving/diary context".into(),
            });
        }

        issues
    }
}
