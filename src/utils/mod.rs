//! Utility modules shared by the dev loop.

pub mod date;
pub mod exec;
pub mod path;
