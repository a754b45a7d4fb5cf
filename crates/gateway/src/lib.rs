//! The quitcoach gateway: HTTP API plus the conversational turn
//! orchestrator that powers the smoking-cessation coach.

pub mod api;
pub mod bootstrap;
pub mod runtime;
pub mod state;
