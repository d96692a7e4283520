//! Actor Message Definitions
//!
//! ```text
//! WatchActor --Reload--> ReloadActor --> Runner
//!     |
//!     +--WatchFailed--> Coordinator <--Quit-- TaskDispatcher
//! ```

use crate::core::TaskSelector;

/// Messages to the reload actor. All of them go through the debounce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadMsg {
    /// Rebuild and rerun, optionally as a test or bench run
    Reload(Option<TaskSelector>),
}

/// Messages to the coordinator.
#[derive(Debug)]
pub enum ControlMsg {
    /// The quit hotkey was pressed
    Quit,
    /// The watcher subscription broke; the session cannot continue
    WatchFailed(String),
}
