//! Turn orchestration: policy filtering, context enrichment, the model
//! loop with tool rounds, and event emission.

pub mod context;
pub mod policy;
pub mod prompt;
pub mod tools;
pub mod turn;

pub use turn::{run_turn, Step, TurnInput, TurnState};
