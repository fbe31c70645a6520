//! MQTT sink: publishes display text to a broker topic.
//!
//! The display firmware subscribes to the topic and shows whatever payload
//! arrives. MQTT gives no way to ask for the module count, so the configured
//! width is used as-is.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use super::{DeviceStatus, DisplaySink, PublishOptions, Qos, SinkError, SinkFuture};
use crate::config::MqttConfig;
use crate::models::DisplayText;

const KEEP_ALIVE: Duration = Duration::from_secs(30);
const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const REQUEST_CAPACITY: usize = 10;

/// Display sink that publishes to an MQTT topic.
pub struct MqttSink {
    client: AsyncClient,
    topic: String,
    connected: Arc<AtomicBool>,
    event_loop: AbortHandle,
}

impl MqttSink {
    /// Creates the client and spawns its event loop on the current runtime.
    ///
    /// The connection is established in the background; use
    /// [`wait_connected`](Self::wait_connected) to block until the broker
    /// acknowledges it.
    pub fn connect(config: &MqttConfig) -> Self {
        let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
        options.set_keep_alive(KEEP_ALIVE);
        if let Some((username, password)) = config.credentials() {
            options.set_credentials(username, password);
        }

        let (client, mut event_loop) = AsyncClient::new(options, REQUEST_CAPACITY);
        let connected = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&connected);
        let broker = format!("{}:{}", config.host, config.port);
        let task = tokio::spawn(async move {
            loop {
                match event_loop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        flag.store(true, Ordering::SeqCst);
                        info!("Connected to MQTT broker {}", broker);
                    }
                    Ok(Event::Incoming(Packet::Disconnect)) => {
                        flag.store(false, Ordering::SeqCst);
                        warn!("MQTT broker {} closed the connection", broker);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        if flag.swap(false, Ordering::SeqCst) {
                            warn!("MQTT connection to {} lost: {}", broker, e);
                        } else {
                            debug!("MQTT connection to {} failed: {}", broker, e);
                        }
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                }
            }
        });

        Self {
            client,
            topic: config.topic.clone(),
            connected,
            event_loop: task.abort_handle(),
        }
    }

    /// Waits until the broker acknowledges the connection or `timeout` elapses.
    pub async fn wait_connected(&self, timeout: Duration) -> bool {
        let poll = async {
            while !self.is_connected() {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        };
        tokio::time::timeout(timeout, poll).await.is_ok()
    }

    /// Topic payloads are published to.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl Drop for MqttSink {
    fn drop(&mut self) {
        self.event_loop.abort();
    }
}

impl DisplaySink for MqttSink {
    fn kind(&self) -> &'static str {
        "mqtt"
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn status(&self) -> SinkFuture<DeviceStatus> {
        let status = DeviceStatus {
            modules: None,
            wifi_rssi: None,
            online: self.is_connected(),
        };
        Box::pin(async move { Ok(status) })
    }

    fn publish(&self, text: &DisplayText, options: PublishOptions) -> SinkFuture<()> {
        let client = self.client.clone();
        let topic = self.topic.clone();
        let payload = text.as_str().as_bytes().to_vec();
        let qos = match options.qos {
            Qos::AtMostOnce => QoS::AtMostOnce,
            Qos::AtLeastOnce => QoS::AtLeastOnce,
        };

        Box::pin(async move {
            client
                .publish(topic, qos, false, payload)
                .await
                .map_err(|e| SinkError::Mqtt(e.to_string()))
        })
    }

    fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        if let Err(e) = self.client.try_disconnect() {
            debug!("MQTT disconnect request not queued: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Broker address nothing listens on.
    fn unreachable_broker() -> MqttConfig {
        MqttConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..MqttConfig::default()
        }
    }

    #[tokio::test]
    async fn test_status_before_connack() {
        let sink = MqttSink::connect(&unreachable_broker());

        assert_eq!(sink.kind(), "mqtt");
        assert_eq!(sink.topic(), "splitflap/text");
        assert!(!sink.is_connected());

        let status = sink.status().await.unwrap();
        assert_eq!(status.modules, None);
        assert_eq!(status.wifi_rssi, None);
        assert!(!status.online);
    }

    #[tokio::test]
    async fn test_wait_connected_times_out_without_broker() {
        let sink = MqttSink::connect(&unreachable_broker());

        assert!(!sink.wait_connected(Duration::from_millis(300)).await);

        sink.disconnect();
        assert!(!sink.is_connected());
    }
}
