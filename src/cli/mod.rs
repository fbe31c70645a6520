//! CLI command handlers for Splitflap Control.
//!
//! This module provides the daemon entry point plus scriptable one-shot
//! commands for formatting, sending and configuration.

pub mod airports;
pub mod common;
pub mod config;
pub mod format;
pub mod run;
pub mod send;

// Re-export types used by main.rs and tests
pub use airports::AirportsArgs;
pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use format::FormatArgs;
pub use run::RunArgs;
pub use send::SendArgs;
