//! Thread checkpoints: the persisted message history that lets a
//! conversation resume across requests.
//!
//! Each thread gets a `<thread_id>.jsonl` file under the threads directory,
//! one serialized [`Message`] per line. An in-memory write-through cache
//! keeps reads off disk after the first load.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use qc_domain::error::{Error, Result};
use qc_domain::message::Message;

/// Cross-turn message history keyed by thread id.
///
/// `save` replaces the whole history; the orchestrator always persists the
/// full (append-only grown) list at the end of a run.
#[async_trait::async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Load a thread's history. An unknown thread id yields an empty list.
    async fn load(&self, thread_id: &str) -> Result<Vec<Message>>;

    /// Persist a thread's full history.
    async fn save(&self, thread_id: &str, messages: &[Message]) -> Result<()>;
}

/// File-backed checkpoint store: one JSONL file per thread.
pub struct JsonlCheckpointStore {
    base_dir: PathBuf,
    cache: RwLock<HashMap<String, Vec<Message>>>,
}

impl JsonlCheckpointStore {
    pub fn new(base_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(base_dir)?;
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            cache: RwLock::new(HashMap::new()),
        })
    }

    fn path_for(&self, thread_id: &str) -> Result<PathBuf> {
        // Thread ids are server-generated UUIDs; reject anything that
        // could escape the threads directory.
        if thread_id.is_empty()
            || !thread_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::Store(format!("invalid thread id: {thread_id:?}")));
        }
        Ok(self.base_dir.join(format!("{thread_id}.jsonl")))
    }
}

#[async_trait::async_trait]
impl CheckpointStore for JsonlCheckpointStore {
    async fn load(&self, thread_id: &str) -> Result<Vec<Message>> {
        if let Some(cached) = self.cache.read().get(thread_id) {
            return Ok(cached.clone());
        }

        let path = self.path_for(thread_id)?;
        let messages = tokio::task::spawn_blocking(move || -> Result<Vec<Message>> {
            let raw = match std::fs::read_to_string(&path) {
                Ok(s) => s,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
                Err(e) => return Err(Error::Io(e)),
            };
            raw.lines()
                .filter(|l| !l.trim().is_empty())
                .map(|l| serde_json::from_str::<Message>(l).map_err(Error::Json))
                .collect()
        })
        .await
        .map_err(|e| Error::Store(format!("spawn_blocking join: {e}")))??;

        self.cache
            .write()
            .insert(thread_id.to_owned(), messages.clone());
        Ok(messages)
    }

    async fn save(&self, thread_id: &str, messages: &[Message]) -> Result<()> {
        let path = self.path_for(thread_id)?;
        let mut buf = String::new();
        for msg in messages {
            buf.push_str(&serde_json::to_string(msg)?);
            buf.push('\n');
        }

        // Write to a temp file and rename into place so a crash mid-write
        // never leaves a truncated checkpoint.
        let tmp = path.with_extension("jsonl.tmp");
        tokio::task::spawn_blocking(move || -> Result<()> {
            std::fs::write(&tmp, buf.as_bytes())?;
            std::fs::rename(&tmp, &path)?;
            Ok(())
        })
        .await
        .map_err(|e| Error::Store(format!("spawn_blocking join: {e}")))??;

        self.cache
            .write()
            .insert(thread_id.to_owned(), messages.to_vec());

        tracing::debug!(thread_id, count = messages.len(), "checkpoint saved");
        Ok(())
    }
}
