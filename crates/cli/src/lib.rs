//! Library half of the `scalar` binary: configuration, logging and state files.

pub mod config;
pub mod logging;
pub mod state;
