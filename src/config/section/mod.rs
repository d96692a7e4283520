//! Configuration section definitions.
//!
//! | Section    | Purpose                                   |
//! |------------|-------------------------------------------|
//! | `[dev]`    | Dev loop (builder, debounce, watcher)     |
//! | `[build]`  | Compiler binary, edition, flags           |
//! | `[client]` | Puzzle platform client                    |

mod build;
mod client;
mod dev;

pub use build::BuildConfig;
pub use client::ClientConfig;
pub use dev::{Builder, DevConfig};
