//! In-memory sink for tests and dry runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::{DeviceStatus, DisplaySink, PublishOptions, SinkError, SinkFuture};
use crate::models::DisplayText;

/// Sink that records every payload instead of sending it.
///
/// Publishes are recorded at call time, before the returned future is
/// polled, so tests observe them in dispatch order.
pub struct MockSink {
    modules: Option<usize>,
    connected: AtomicBool,
    fail_publishes: AtomicBool,
    published: Mutex<Vec<DisplayText>>,
    maintenance: Mutex<Vec<String>>,
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSink {
    /// A connected sink that reports no module count.
    pub fn new() -> Self {
        Self {
            modules: None,
            connected: AtomicBool::new(true),
            fail_publishes: AtomicBool::new(false),
            published: Mutex::new(Vec::new()),
            maintenance: Mutex::new(Vec::new()),
        }
    }

    /// A connected sink whose status reports `modules` modules.
    pub fn with_modules(modules: usize) -> Self {
        Self {
            modules: Some(modules),
            ..Self::new()
        }
    }

    /// Simulates the display going away or coming back.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Makes subsequent publishes fail (while still recording them).
    pub fn set_fail_publishes(&self, fail: bool) {
        self.fail_publishes.store(fail, Ordering::SeqCst);
    }

    /// Every payload published so far, oldest first.
    pub fn published(&self) -> Vec<DisplayText> {
        self.published
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    /// Published payloads as plain strings.
    pub fn published_strings(&self) -> Vec<String> {
        self.published()
            .into_iter()
            .map(DisplayText::into_string)
            .collect()
    }

    /// Most recent payload, if any.
    pub fn last(&self) -> Option<DisplayText> {
        self.published.lock().ok().and_then(|p| p.last().cloned())
    }

    /// Maintenance calls in order, e.g. `"home"`, `"calibrate 2"`.
    pub fn maintenance_log(&self) -> Vec<String> {
        self.maintenance
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    fn record_maintenance(&self, entry: String) -> SinkFuture<()> {
        if !self.is_connected() {
            return Box::pin(async { Err(SinkError::NotConnected) });
        }
        if let Ok(mut log) = self.maintenance.lock() {
            log.push(entry);
        }
        Box::pin(async { Ok(()) })
    }
}

impl DisplaySink for MockSink {
    fn kind(&self) -> &'static str {
        "mock"
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn status(&self) -> SinkFuture<DeviceStatus> {
        let status = DeviceStatus {
            modules: self.modules,
            wifi_rssi: None,
            online: self.is_connected(),
        };
        Box::pin(async move { Ok(status) })
    }

    fn publish(&self, text: &DisplayText, _options: PublishOptions) -> SinkFuture<()> {
        if let Ok(mut published) = self.published.lock() {
            published.push(text.clone());
        }
        if self.fail_publishes.load(Ordering::SeqCst) {
            Box::pin(async { Err(SinkError::Status(503)) })
        } else {
            Box::pin(async { Ok(()) })
        }
    }

    fn home(&self) -> SinkFuture<()> {
        self.record_maintenance("home".to_string())
    }

    fn calibrate(&self, module: usize) -> SinkFuture<()> {
        self.record_maintenance(format!("calibrate {module}"))
    }

    fn disconnect(&self) {
        self.set_connected(false);
    }
}
