use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Coaching / orchestrator knobs
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachConfig {
    /// How far back (days) the context snapshot looks for cravings/diary.
    #[serde(default = "d_window_days")]
    pub recent_window_days: i64,
    /// Row cap per snapshot slice (cravings and diary independently).
    #[serde(default = "d_recent_rows")]
    pub recent_rows: usize,
    /// Maximum model/tool round-trips in one turn before the run is
    /// converted into a single error event.
    #[serde(default = "d_max_tool_loops")]
    pub max_tool_loops: usize,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            recent_window_days: d_window_days(),
            recent_rows: d_recent_rows(),
            max_tool_loops: d_max_tool_loops(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_window_days() -> i64 {
    30
}
fn d_recent_rows() -> usize {
    20
}
fn d_max_tool_loops() -> usize {
    8
}
