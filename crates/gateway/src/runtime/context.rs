//! Context snapshot builder.
//!
//! Gathers the user's preference record, goals, cravings and diary
//! entries into one [`ContextSnapshot`] ahead of the model call. Each
//! source is fetched independently; a failing source is logged and
//! skipped so a broken store never blocks the turn.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use qc_domain::config::CoachConfig;
use qc_domain::snapshot::{days_since_quit, ContextSnapshot};
use qc_store::UserDataStore;
use tracing::warn;

pub struct SnapshotBuilder {
    store: Arc<dyn UserDataStore>,
    window_days: i64,
    rows: usize,
}

impl SnapshotBuilder {
    pub fn new(store: Arc<dyn UserDataStore>, coach: &CoachConfig) -> Self {
        Self {
            store,
            window_days: coach.recent_window_days as i64,
            rows: coach.recent_rows,
        }
    }

    /// Assemble the snapshot for `user_id` as of `today`.
    ///
    /// A missing preference record yields an empty snapshot (new users
    /// have no profile yet). Fetch errors on any source leave that
    /// source's fields unset and the rest intact.
    pub async fn build(&self, user_id: &str, today: NaiveDate) -> ContextSnapshot {
        let since = today - Duration::days(self.window_days);
        let mut snap = ContextSnapshot::default();

        match self.store.preference(user_id).await {
            Ok(Some(pref)) => {
                snap.quit_date = Some(pref.quit_date);
                snap.days_since_quit = Some(days_since_quit(pref.quit_date, today));
                snap.quit_reason = Some(pref.reason);
                snap.language = pref.language;
                snap.cigarettes_per_day = pref.cigarettes_per_day;
                snap.years_smoking = pref.years_smoking;
                snap.price_per_cigarette = pref.price_per_cigarette;
            }
            Ok(None) => {}
            Err(e) => warn!(user_id, error = %e, "preference fetch failed"),
        }

        match self.store.goals(user_id).await {
            Ok(goals) => snap.goals = goals,
            Err(e) => warn!(user_id, error = %e, "goals fetch failed"),
        }

        match self.store.cravings(user_id, since, self.rows).await {
            Ok(cravings) => snap.cravings = cravings,
            Err(e) => warn!(user_id, error = %e, "cravings fetch failed"),
        }

        match self.store.diary(user_id, since, self.rows).await {
            Ok(diary) => snap.diary = diary,
            Err(e) => warn!(user_id, error = %e, "diary fetch failed"),
        }

        snap
    }

    /// Convenience wrapper with the wall-clock date.
    pub async fn build_now(&self, user_id: &str) -> ContextSnapshot {
        self.build(user_id, Utc::now().date_naive()).await
    }
}
