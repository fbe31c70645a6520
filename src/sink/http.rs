//! REST sink for the splitflap controller board.
//!
//! The board exposes a small form-encoded API:
//!
//! - `GET  /api/status` - `{ "modules": 6, "wifi_rssi": -61 }`
//! - `POST /api/text` - field `text`
//! - `POST /api/home`
//! - `POST /api/calibrate` - field `module`

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{DeviceStatus, DisplaySink, PublishOptions, SinkError, SinkFuture};
use crate::models::{DisplayText, DEFAULT_WIDTH};

const STATUS_TIMEOUT: Duration = Duration::from_secs(5);
const TEXT_TIMEOUT: Duration = Duration::from_secs(10);
const MAINTENANCE_TIMEOUT: Duration = Duration::from_secs(30);

/// Body of `GET /api/status`.
#[derive(Debug, Deserialize)]
struct StatusResponse {
    modules: Option<usize>,
    wifi_rssi: Option<i32>,
}

/// Display sink backed by the controller board's HTTP API.
#[derive(Clone)]
pub struct HttpSink {
    base_url: String,
    http: reqwest::Client,
    connected: Arc<AtomicBool>,
}

impl HttpSink {
    /// Creates a sink for the board at `address` (IP, host or URL).
    ///
    /// The sink starts disconnected; call [`DisplaySink::status`] to connect.
    pub fn new(address: &str) -> Self {
        Self {
            base_url: normalize_base_url(address),
            http: reqwest::Client::new(),
            connected: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The normalized base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post(
        &self,
        path: &str,
        form: Option<Vec<(&'static str, String)>>,
        timeout: Duration,
    ) -> SinkFuture<()> {
        if !self.is_connected() {
            return Box::pin(async { Err(SinkError::NotConnected) });
        }

        let mut request = self.http.post(self.url(path)).timeout(timeout);
        if let Some(fields) = form {
            request = request.form(&fields);
        }

        Box::pin(async move {
            let response = request.send().await?;
            check_status(&response)?;
            Ok(())
        })
    }
}

impl DisplaySink for HttpSink {
    fn kind(&self) -> &'static str {
        "http"
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn status(&self) -> SinkFuture<DeviceStatus> {
        let request = self.http.get(self.url("/api/status")).timeout(STATUS_TIMEOUT);
        let connected = Arc::clone(&self.connected);
        let base_url = self.base_url.clone();

        Box::pin(async move {
            let result: Result<DeviceStatus, SinkError> = async {
                let response = request.send().await?;
                check_status(&response)?;
                let body: StatusResponse = response
                    .json()
                    .await
                    .map_err(|e| SinkError::InvalidResponse(e.to_string()))?;
                Ok(DeviceStatus {
                    // Boards without a module count report 0 or omit it.
                    modules: Some(body.modules.filter(|&m| m > 0).unwrap_or(DEFAULT_WIDTH)),
                    wifi_rssi: body.wifi_rssi,
                    online: true,
                })
            }
            .await;

            connected.store(result.is_ok(), Ordering::SeqCst);
            match &result {
                Ok(status) => info!(
                    "Connected to splitflap at {} ({} modules, RSSI: {:?} dBm)",
                    base_url,
                    status.modules.unwrap_or(DEFAULT_WIDTH),
                    status.wifi_rssi
                ),
                Err(e) => warn!("Connection to {} failed: {}", base_url, e),
            }
            result
        })
    }

    fn publish(&self, text: &DisplayText, _options: PublishOptions) -> SinkFuture<()> {
        debug!("POST /api/text \"{}\"", text);
        self.post(
            "/api/text",
            Some(vec![("text", text.as_str().to_owned())]),
            TEXT_TIMEOUT,
        )
    }

    fn home(&self) -> SinkFuture<()> {
        info!("Homing all modules");
        self.post("/api/home", None, MAINTENANCE_TIMEOUT)
    }

    fn calibrate(&self, module: usize) -> SinkFuture<()> {
        info!("Calibrating module {}", module);
        self.post(
            "/api/calibrate",
            Some(vec![("module", module.to_string())]),
            MAINTENANCE_TIMEOUT,
        )
    }

    /// Marks the sink disconnected until the next successful status query.
    fn disconnect(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            info!("Disconnected from splitflap display");
        }
    }
}

fn check_status(response: &reqwest::Response) -> Result<(), SinkError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(SinkError::Status(status.as_u16()))
    }
}

/// Adds `http://` when no scheme is given and strips one trailing slash.
///
/// ```
/// use splitflap_control::sink::http::normalize_base_url;
///
/// assert_eq!(normalize_base_url("192.168.1.50/"), "http://192.168.1.50");
/// ```
#[must_use]
pub fn normalize_base_url(address: &str) -> String {
    let address = address.trim();
    let with_scheme = if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{address}")
    };
    match with_scheme.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => with_scheme,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url_adds_scheme() {
        assert_eq!(normalize_base_url("10.0.0.7"), "http://10.0.0.7");
        assert_eq!(normalize_base_url(" flap.local "), "http://flap.local");
    }

    #[test]
    fn test_normalize_base_url_keeps_existing_scheme() {
        assert_eq!(normalize_base_url("https://flap.example"), "https://flap.example");
        assert_eq!(normalize_base_url("http://10.0.0.7:8080/"), "http://10.0.0.7:8080");
    }

    #[tokio::test]
    async fn test_publish_before_connect_fails_fast() {
        let sink = HttpSink::new("127.0.0.1:9");
        assert!(!sink.is_connected());

        let err = sink
            .publish(&DisplayText::fit("HI", 6), PublishOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SinkError::NotConnected));

        let err = sink.home().await.unwrap_err();
        assert!(matches!(err, SinkError::NotConnected));
    }
}
