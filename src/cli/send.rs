//! One-shot publish command.

use std::time::Duration;

use crate::cli::common::{connect_sink, load_config, CliError, CliResult};
use crate::config::SinkKind;
use crate::formatter::{self, CodeMapping};
use crate::models::DisplayText;
use crate::sink::PublishOptions;
use clap::Args;

const MQTT_FLUSH_DELAY: Duration = Duration::from_millis(500);

/// Send text to the display once and exit
#[derive(Debug, Clone, Args)]
pub struct SendArgs {
    /// Text to show
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Treat TEXT as an identifier and shorten it through the airline table
    #[arg(long)]
    pub code: bool,

    /// Device address, overriding the configured one
    #[arg(long, value_name = "URL")]
    pub device: Option<String>,
}

impl SendArgs {
    /// Execute the send command
    pub async fn execute(&self) -> CliResult<()> {
        let mut config = load_config()?;
        if let Some(device) = &self.device {
            config.sink.device_url.clone_from(device);
        }

        let connected = connect_sink(&config).await?;
        let text = if self.code {
            formatter::format(Some(&self.text), &CodeMapping::airlines(), connected.width)
        } else {
            DisplayText::fit(&self.text, connected.width)
        };

        connected
            .sink
            .publish(&text, PublishOptions::default())
            .await
            .map_err(|e| CliError::io(format!("Failed to send \"{text}\": {e}")))?;

        if config.sink.kind == SinkKind::Mqtt {
            // rumqttc only queues the publish; give the event loop time to send it.
            tokio::time::sleep(MQTT_FLUSH_DELAY).await;
        }

        println!("Sent \"{text}\"");
        Ok(())
    }
}
