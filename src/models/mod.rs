//! Data models for display payloads and mode settings.
//!
//! Models carry no I/O and no scheduling logic; they are shared by the
//! scheduler, the sinks, the control API and the CLI.

pub mod display_text;
pub mod mode;

// Re-export all model types
pub use display_text::{DisplayText, DEFAULT_WIDTH};
pub use mode::{ClockFormat, CycleInterval, Mode};
