//! Core types - pure abstractions shared across the codebase.

mod outcome;
mod selector;
mod state;

pub use outcome::{Outcome, Reasons};
pub use selector::{Part, TaskSelector};
pub use state::{register_shutdown, setup_shutdown_handler};
