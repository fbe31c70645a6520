//! Splitflap Control Library
//!
//! This library provides the pieces behind the `splitflapctl` daemon: the
//! display-mode scheduler, the identifier-shortening code formatter, and the
//! sinks that carry fixed-width text to a splitflap display.

// Module declarations
pub mod airports;
pub mod cli;
pub mod config;
pub mod constants;
pub mod formatter;
pub mod models;
pub mod scheduler;
pub mod sink;
#[cfg(feature = "web")]
pub mod web;
