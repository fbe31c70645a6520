//! Application-wide constants.
//!
//! This module defines constants used throughout the application,
//! including the application name and the fixed update periods.

use std::time::Duration;

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "Splitflap Control";

/// The binary name of the application (used in command examples, lowercase with hyphens).
pub const APP_BINARY_NAME: &str = "splitflapctl";

/// Directory name under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "SplitflapControl";

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "SPLITFLAP_CONFIG_DIR";

/// Clock mode refresh period.
pub const CLOCK_PERIOD: Duration = Duration::from_secs(1);

/// Mock flight mode refresh period.
pub const FLIGHT_PERIOD: Duration = Duration::from_secs(30);

/// Delay between modules when calibrating the whole display.
pub const CALIBRATE_STAGGER: Duration = Duration::from_secs(2);
