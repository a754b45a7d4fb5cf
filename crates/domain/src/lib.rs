//! Shared domain types for the quitcoach gateway: configuration, errors,
//! conversation messages, output events, the per-request context snapshot,
//! and the health-recovery formulas used by the coaching tools.

pub mod config;
pub mod error;
pub mod event;
pub mod health;
pub mod message;
pub mod prompts;
pub mod snapshot;
pub mod tool;
