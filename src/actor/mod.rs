//! Actor System for the Dev Loop
//!
//! Message-passing concurrency for one puzzle day:
//!
//! ```text
//! WatchActor --> ReloadActor --> Runner --> WorkerSupervisor
//!  (notify)      (debounce)     (build)     (solution process)
//!                    ^
//! TaskDispatcher ----+  (reload / test / bench hotkeys)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `watch` - File watcher with noise filtering
//! - `debounce` - Trailing-edge debounce shared by reload requests
//! - `reload` - Serialized access to the session runner
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod debounce;
pub mod messages;
pub mod reload;
pub mod watch;

pub use coordinator::Coordinator;
