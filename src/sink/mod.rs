//! Display sinks: where rendered text ends up.
//!
//! The scheduler only knows the [`DisplaySink`] trait. Concrete sinks talk to
//! the device's REST API ([`HttpSink`]) or publish to an MQTT broker
//! ([`MqttSink`], behind the `mqtt` feature). [`MockSink`] records payloads
//! for tests.
//!
//! Every operation returns a `'static` future so the caller can spawn it and
//! move on; publishes are fire-and-forget from the scheduler's point of view.

pub mod http;
pub mod mock;
#[cfg(feature = "mqtt")]
pub mod mqtt;

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::DisplayText;

pub use http::HttpSink;
pub use mock::MockSink;
#[cfg(feature = "mqtt")]
pub use mqtt::MqttSink;

/// Boxed future returned by sink operations.
pub type SinkFuture<T> = Pin<Box<dyn Future<Output = Result<T, SinkError>> + Send + 'static>>;

/// Errors reported by display sinks.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink has not established a connection to the display.
    #[error("not connected to display")]
    NotConnected,
    /// The sink cannot perform this operation.
    #[error("{operation} is not supported by the {sink} sink")]
    Unsupported {
        /// Sink kind, e.g. "mqtt".
        sink: &'static str,
        /// Operation name, e.g. "home".
        operation: &'static str,
    },
    /// The device answered with a non-success HTTP status.
    #[error("device returned HTTP {0}")]
    Status(u16),
    /// Transport-level HTTP failure (timeout, refused connection, ...).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// MQTT client failure.
    #[error("MQTT publish failed: {0}")]
    Mqtt(String),
    /// The device answered with a body we could not understand.
    #[error("invalid device response: {0}")]
    InvalidResponse(String),
}

/// Delivery guarantee hint for a publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Qos {
    /// Fire once, no acknowledgement.
    #[default]
    AtMostOnce,
    /// Retry until acknowledged.
    AtLeastOnce,
}

/// Per-publish options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublishOptions {
    /// Delivery guarantee requested from the transport.
    pub qos: Qos,
}

/// Display status as reported by the sink.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceStatus {
    /// Module count, if the transport can report it.
    pub modules: Option<usize>,
    /// WiFi signal strength in dBm, if reported.
    pub wifi_rssi: Option<i32>,
    /// Whether the display is reachable.
    pub online: bool,
}

/// A destination for display text.
pub trait DisplaySink: Send + Sync {
    /// Short identifier for logs and error messages.
    fn kind(&self) -> &'static str;

    /// Whether the sink currently believes the display is reachable.
    fn is_connected(&self) -> bool;

    /// Queries the display status. Consulted once at connection time to size
    /// all display text.
    fn status(&self) -> SinkFuture<DeviceStatus>;

    /// Sends fixed-width text to the display.
    fn publish(&self, text: &DisplayText, options: PublishOptions) -> SinkFuture<()>;

    /// Homes every module.
    fn home(&self) -> SinkFuture<()> {
        unsupported(self.kind(), "home")
    }

    /// Recalibrates a single module.
    fn calibrate(&self, _module: usize) -> SinkFuture<()> {
        unsupported(self.kind(), "calibrate")
    }

    /// Releases the connection. Later publishes fail until the sink reconnects.
    fn disconnect(&self) {}
}

fn unsupported<T: Send + 'static>(sink: &'static str, operation: &'static str) -> SinkFuture<T> {
    Box::pin(async move { Err(SinkError::Unsupported { sink, operation }) })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StatusOnly;

    impl DisplaySink for StatusOnly {
        fn kind(&self) -> &'static str {
            "status-only"
        }

        fn is_connected(&self) -> bool {
            true
        }

        fn status(&self) -> SinkFuture<DeviceStatus> {
            Box::pin(async { Ok(DeviceStatus::default()) })
        }

        fn publish(&self, _text: &DisplayText, _options: PublishOptions) -> SinkFuture<()> {
            Box::pin(async { Ok(()) })
        }
    }

    #[tokio::test]
    async fn test_maintenance_defaults_to_unsupported() {
        let sink = StatusOnly;
        let err = sink.home().await.unwrap_err();
        assert!(matches!(
            err,
            SinkError::Unsupported {
                sink: "status-only",
                operation: "home"
            }
        ));
        assert!(sink.calibrate(2).await.is_err());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(SinkError::Status(503).to_string(), "device returned HTTP 503");
        assert_eq!(
            SinkError::Unsupported {
                sink: "mqtt",
                operation: "home"
            }
            .to_string(),
            "home is not supported by the mqtt sink"
        );
    }
}
