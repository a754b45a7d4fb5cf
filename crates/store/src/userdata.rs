//! Read-only access to the user's quit data.
//!
//! The CRUD layer that writes these records lives elsewhere; the
//! orchestrator only ever reads, so the trait exposes bounded fetches and
//! nothing else.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use qc_domain::error::{Error, Result};
use qc_domain::snapshot::{CravingEntry, DiaryEntry, GoalEntry, PreferenceRecord};

/// Read-only source of preference, goal, craving, and diary rows.
#[async_trait::async_trait]
pub trait UserDataStore: Send + Sync {
    /// The user's quit preferences. `None` when the user never set any.
    async fn preference(&self, user_id: &str) -> Result<Option<PreferenceRecord>>;

    /// All goals attached to the user's preferences.
    async fn goals(&self, user_id: &str) -> Result<Vec<GoalEntry>>;

    /// Cravings on or after `since`, newest first, at most `limit` rows.
    async fn cravings(
        &self,
        user_id: &str,
        since: NaiveDate,
        limit: usize,
    ) -> Result<Vec<CravingEntry>>;

    /// Diary entries on or after `since`, newest first, at most `limit` rows.
    async fn diary(
        &self,
        user_id: &str,
        since: NaiveDate,
        limit: usize,
    ) -> Result<Vec<DiaryEntry>>;
}

/// Everything the store holds for one user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default)]
    pub preference: Option<PreferenceRecord>,
    #[serde(default)]
    pub goals: Vec<GoalEntry>,
    #[serde(default)]
    pub cravings: Vec<CravingEntry>,
    #[serde(default)]
    pub diary: Vec<DiaryEntry>,
}

fn window<T: Clone>(
    mut rows: Vec<T>,
    date_of: impl Fn(&T) -> NaiveDate,
    since: NaiveDate,
    limit: usize,
) -> Vec<T> {
    rows.retain(|r| date_of(r) >= since);
    // Newest first.
    rows.sort_by_key(|r| std::cmp::Reverse(date_of(r)));
    rows.truncate(limit);
    rows
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// File-backed store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One JSON file per user under `<base_dir>/<user_id>.json`.
pub struct FileUserDataStore {
    base_dir: PathBuf,
    cache: RwLock<HashMap<String, UserRecord>>,
}

impl FileUserDataStore {
    pub fn new(base_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(base_dir)?;
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            cache: RwLock::new(HashMap::new()),
        })
    }

    async fn record(&self, user_id: &str) -> Result<UserRecord> {
        if let Some(cached) = self.cache.read().get(user_id) {
            return Ok(cached.clone());
        }

        if user_id.is_empty()
            || !user_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::Store(format!("invalid user id: {user_id:?}")));
        }

        let path = self.base_dir.join(format!("{user_id}.json"));
        let record = tokio::task::spawn_blocking(move || -> Result<UserRecord> {
            match std::fs::read_to_string(&path) {
                Ok(raw) => serde_json::from_str(&raw).map_err(Error::Json),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(UserRecord::default()),
                Err(e) => Err(Error::Io(e)),
            }
        })
        .await
        .map_err(|e| Error::Store(format!("spawn_blocking join: {e}")))??;

        self.cache
            .write()
            .insert(user_id.to_owned(), record.clone());
        Ok(record)
    }
}

#[async_trait::async_trait]
impl UserDataStore for FileUserDataStore {
    async fn preference(&self, user_id: &str) -> Result<Option<PreferenceRecord>> {
        Ok(self.record(user_id).await?.preference)
    }

    async fn goals(&self, user_id: &str) -> Result<Vec<GoalEntry>> {
        Ok(self.record(user_id).await?.goals)
    }

    async fn cravings(
        &self,
        user_id: &str,
        since: NaiveDate,
        limit: usize,
    ) -> Result<Vec<CravingEntry>> {
        let rows = self.record(user_id).await?.cravings;
        Ok(window(rows, |c| c.date, since, limit))
    }

    async fn diary(
        &self,
        user_id: &str,
        since: NaiveDate,
        limit: usize,
    ) -> Result<Vec<DiaryEntry>> {
        let rows = self.record(user_id).await?.diary;
        Ok(window(rows, |d| d.date, since, limit))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// In-memory store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// In-memory store for demos and tests.
#[derive(Default)]
pub struct MemoryUserDataStore {
    records: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryUserDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user_id: impl Into<String>, record: UserRecord) {
        self.records.write().insert(user_id.into(), record);
    }

    fn get(&self, user_id: &str) -> UserRecord {
        self.records.read().get(user_id).cloned().unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl UserDataStore for MemoryUserDataStore {
    async fn preference(&self, user_id: &str) -> Result<Option<PreferenceRecord>> {
        Ok(self.get(user_id).preference)
    }

    async fn goals(&self, user_id: &str) -> Result<Vec<GoalEntry>> {
        Ok(self.get(user_id).goals)
    }

    async fn cravings(
        &self,
        user_id: &str,
        since: NaiveDate,
        limit: usize,
    ) -> Result<Vec<CravingEntry>> {
        Ok(window(self.get(user_id).cravings, |c| c.date, since, limit))
    }

    async fn diary(
        &self,
        user_id: &str,
        since: NaiveDate,
        limit: usize,
    ) -> Result<Vec<DiaryEntry>> {
        Ok(window(self.get(user_id).diary, |d| d.date, since, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn craving(date: NaiveDate, comments: &str) -> CravingEntry {
        CravingEntry {
            date,
            comments: comments.into(),
            have_smoked: false,
            desire_range: Some(5),
            cigarettes_smoked: None,
            feeling: None,
            activity: None,
            company: None,
        }
    }

    #[tokio::test]
    async fn unknown_user_has_no_preference_and_no_rows() {
        let store = MemoryUserDataStore::new();
        assert!(store.preference("ghost").await.unwrap().is_none());
        assert!(store
            .cravings("ghost", d(2026, 1, 1), 20)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn cravings_are_windowed_newest_first() {
        let store = MemoryUserDataStore::new();
        store.insert(
            "u1",
            UserRecord {
                cravings: vec![
                    craving(d(2026, 8, 1), "old"),
                    craving(d(2026, 8, 20), "newer"),
                    craving(d(2026, 8, 25), "newest"),
                    craving(d(2026, 6, 1), "ancient"),
                ],
                ..Default::default()
            },
        );

        let rows = store.cravings("u1", d(2026, 7, 28), 2).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].comments, "newest");
        assert_eq!(rows[1].comments, "newer");
    }

    #[tokio::test]
    async fn file_store_round_trips_a_user_record() {
        let dir = tempfile::tempdir().unwrap();
        let record = UserRecord {
            preference: Some(PreferenceRecord {
                quit_date: d(2026, 8, 17),
                reason: "my kids".into(),
                language: Some("en-us".into()),
                cigarettes_per_day: Some(15),
                years_smoking: Some(10),
                price_per_cigarette: Some(0.5),
            }),
            goals: vec![GoalEntry {
                description: "run 5k".into(),
                is_completed: false,
            }],
            ..Default::default()
        };
        std::fs::write(
            dir.path().join("u1.json"),
            serde_json::to_string(&record).unwrap(),
        )
        .unwrap();

        let store = FileUserDataStore::new(dir.path()).unwrap();
        let pref = store.preference("u1").await.unwrap().unwrap();
        assert_eq!(pref.reason, "my kids");
        assert_eq!(store.goals("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn file_store_rejects_path_traversal_user_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileUserDataStore::new(dir.path()).unwrap();
        assert!(store.preference("../etc/passwd").await.is_err());
    }
}
