//! Persistence collaborators for the orchestrator.
//!
//! Both stores are defined as traits so any compliant backend satisfies
//! them; the bundled implementations are file-backed (JSONL checkpoints,
//! JSON user records) plus an in-memory user store for tests and demos.

mod checkpoint;
mod userdata;

pub use checkpoint::{CheckpointStore, JsonlCheckpointStore};
pub use userdata::{FileUserDataStore, MemoryUserDataStore, UserDataStore, UserRecord};
