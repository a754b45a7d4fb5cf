//! The per-request context snapshot: a read-only bundle of the user's
//! quit preferences, goals, and recent craving/diary rows, built once per
//! inbound message and carried through the turn state machine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The user's quit preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    pub quit_date: NaiveDate,
    pub reason: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub cigarettes_per_day: Option<u32>,
    #[serde(default)]
    pub years_smoking: Option<u32>,
    /// Price per cigarette in the user's local currency.
    #[serde(default)]
    pub price_per_cigarette: Option<f64>,
}

/// One quit goal attached to the user's preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalEntry {
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
}

/// One logged craving episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CravingEntry {
    pub date: NaiveDate,
    pub comments: String,
    #[serde(default)]
    pub have_smoked: bool,
    #[serde(default)]
    pub desire_range: Option<u32>,
    #[serde(default)]
    pub cigarettes_smoked: Option<u32>,
    #[serde(default)]
    pub feeling: Option<String>,
    #[serde(default)]
    pub activity: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

/// One diary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub date: NaiveDate,
    pub notes: String,
    #[serde(default)]
    pub have_smoked: bool,
    #[serde(default)]
    pub craving_range: Option<u32>,
    #[serde(default)]
    pub number_of_cravings: Option<u32>,
    #[serde(default)]
    pub cigarettes_smoked: Option<u32>,
}

/// Immutable per-request context bundle.
///
/// Built once from the persistence layer, never mutated by the
/// orchestrator — only copied into the turn's conversation context.
/// A user with no preference record yields `ContextSnapshot::default()`
/// and coaching degrades to generic, non-personalized advice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub quit_date: Option<NaiveDate>,
    /// Signed: negative when the quit date is in the future. Never clamped.
    pub days_since_quit: Option<i64>,
    pub quit_reason: Option<String>,
    pub language: Option<String>,
    pub cigarettes_per_day: Option<u32>,
    pub years_smoking: Option<u32>,
    pub price_per_cigarette: Option<f64>,
    pub goals: Vec<GoalEntry>,
    /// Recent cravings, newest first.
    pub cravings: Vec<CravingEntry>,
    /// Recent diary entries, newest first.
    pub diary: Vec<DiaryEntry>,
}

impl ContextSnapshot {
    pub fn is_empty(&self) -> bool {
        self.quit_date.is_none()
            && self.goals.is_empty()
            && self.cravings.is_empty()
            && self.diary.is_empty()
    }
}

/// Signed day count between the quit date and `today`.
pub fn days_since_quit(quit_date: NaiveDate, today: NaiveDate) -> i64 {
    (today - quit_date).num_days()
}

/// One-line description of where the user stands relative to the quit date.
pub fn quit_status_line(days: i64) -> String {
    match days {
        d if d < 0 => format!("Quit date is {} day(s) from now", -d),
        0 => "Quit date is today".to_string(),
        d => format!("{d} day(s) smoke-free"),
    }
}

/// Fixed celebratory annotation for canonical quit-duration checkpoints.
///
/// Only exact landings count; the string is attached to the conversation
/// context for that turn only.
pub fn milestone_for(days: i64) -> Option<&'static str> {
    match days {
        1 => Some("First day smoke-free! Your body is already healing."),
        7 => Some("One week! The worst of withdrawal is behind you."),
        30 => Some("One month! Your lung function is improving."),
        90 => Some("Three months! Your risk of heart disease is decreasing."),
        365 => Some("One year! Your risk of heart disease is half that of a smoker."),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn days_since_quit_is_signed() {
        let today = d(2026, 8, 27);
        assert_eq!(days_since_quit(d(2026, 8, 17), today), 10);
        assert_eq!(days_since_quit(today, today), 0);
        assert_eq!(days_since_quit(d(2026, 9, 1), today), -5);
    }

    #[test]
    fn quit_today_takes_the_today_branch() {
        assert_eq!(quit_status_line(0), "Quit date is today");
    }

    #[test]
    fn negative_days_render_future_quit_date() {
        assert_eq!(quit_status_line(-5), "Quit date is 5 day(s) from now");
    }

    #[test]
    fn milestones_only_on_exact_checkpoints() {
        assert!(milestone_for(1).is_some());
        assert!(milestone_for(7).is_some());
        assert!(milestone_for(30).is_some());
        assert!(milestone_for(90).is_some());
        assert!(milestone_for(365).is_some());
        assert!(milestone_for(0).is_none());
        assert!(milestone_for(2).is_none());
        assert!(milestone_for(31).is_none());
        assert!(milestone_for(-1).is_none());
    }

    #[test]
    fn empty_snapshot_reports_empty() {
        assert!(ContextSnapshot::default().is_empty());
        let snap = ContextSnapshot {
            quit_date: Some(d(2026, 1, 1)),
            ..Default::default()
        };
        assert!(!snap.is_empty());
    }
}
