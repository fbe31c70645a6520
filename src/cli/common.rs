//! Shared CLI plumbing: exit codes, the command error type and sink setup.

use std::fmt;
use std::sync::Arc;
#[cfg(feature = "mqtt")]
use std::time::Duration;

use tracing::info;

use crate::config::{Config, SinkKind};
use crate::scheduler::SchedulerError;
use crate::sink::{DisplaySink, HttpSink};

/// How long `run` and `send` wait for the MQTT broker.
#[cfg(feature = "mqtt")]
const MQTT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command completed.
    Success = 0,
    /// Unexpected failure (I/O, device error, ...).
    GeneralError = 1,
    /// Bad arguments or configuration.
    ValidationError = 2,
    /// The display could not be reached.
    NotConnected = 3,
}

impl ExitCode {
    /// Numeric code for `std::process::exit`.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Error returned by CLI command handlers.
#[derive(Debug)]
pub struct CliError {
    message: String,
    exit_code: ExitCode,
}

impl CliError {
    /// General failure.
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: ExitCode::GeneralError,
        }
    }

    /// Invalid input or configuration.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: ExitCode::ValidationError,
        }
    }

    /// The display is unreachable.
    pub fn not_connected(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: ExitCode::NotConnected,
        }
    }

    /// Exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        self.exit_code
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

impl From<SchedulerError> for CliError {
    fn from(err: SchedulerError) -> Self {
        let message = err.to_string();
        match err {
            SchedulerError::NotConnected => Self::not_connected(message),
            SchedulerError::InvalidModule { .. } => Self::validation(message),
            _ => Self::io(message),
        }
    }
}

/// Result type for CLI command handlers.
pub type CliResult<T> = Result<T, CliError>;

/// Loads the configuration, mapping failures to a validation error.
pub fn load_config() -> CliResult<Config> {
    Config::load().map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))
}

/// A connected sink and the module count to render for.
pub struct ConnectedSink {
    /// The sink.
    pub sink: Arc<dyn DisplaySink>,
    /// Module count reported by the device, or the configured width.
    pub width: usize,
}

/// Builds the configured sink and waits for it to connect.
pub async fn connect_sink(config: &Config) -> CliResult<ConnectedSink> {
    match config.sink.kind {
        SinkKind::Http => {
            let sink = HttpSink::new(&config.sink.device_url);
            let status = sink.status().await.map_err(|e| {
                CliError::not_connected(format!(
                    "Failed to connect to display at {}: {e}",
                    sink.base_url()
                ))
            })?;
            let width = config.resolve_width(status.modules);
            Ok(ConnectedSink {
                sink: Arc::new(sink),
                width,
            })
        }
        SinkKind::Mqtt => connect_mqtt(config).await,
    }
}

#[cfg(feature = "mqtt")]
async fn connect_mqtt(config: &Config) -> CliResult<ConnectedSink> {
    let mqtt = &config.sink.mqtt;
    let sink = crate::sink::MqttSink::connect(mqtt);
    if !sink.wait_connected(MQTT_CONNECT_TIMEOUT).await {
        return Err(CliError::not_connected(format!(
            "Timed out connecting to MQTT broker {}:{}",
            mqtt.host, mqtt.port
        )));
    }
    info!("Publishing to MQTT topic {}", sink.topic());
    Ok(ConnectedSink {
        sink: Arc::new(sink),
        width: config.resolve_width(None),
    })
}

#[cfg(not(feature = "mqtt"))]
async fn connect_mqtt(_config: &Config) -> CliResult<ConnectedSink> {
    info!("MQTT sink requested but not compiled in");
    Err(CliError::validation(
        "This build does not include MQTT support (rebuild with the `mqtt` feature)",
    ))
}
