//! Configuration management CLI commands.

use crate::cli::common::{load_config, CliError, CliResult};
use crate::config::{Config, SinkKind};
use crate::models::{ClockFormat, CycleInterval};
use clap::{Args, Subcommand};

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Set configuration values
    Set(ConfigSetArgs),
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Set configuration values
#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// Number of display modules
    #[arg(long, value_name = "N")]
    width: Option<usize>,

    /// Device address for the HTTP sink
    #[arg(long, value_name = "URL")]
    device_url: Option<String>,

    /// Display transport
    #[arg(long, value_enum)]
    sink: Option<SinkKind>,

    /// Airport interval (2m, 5m, 15m or 30m)
    #[arg(long, value_name = "INTERVAL")]
    interval: Option<String>,

    /// Clock template (HH:MM, HH:MM:SS or "h:MM A")
    #[arg(long, value_name = "FORMAT")]
    clock_format: Option<String>,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(),
            ConfigCommand::Set(args) => args.execute(),
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_config()?;

        if self.json {
            let json = serde_json::to_string_pretty(&config).map_err(|e| {
                CliError::io(format!("Failed to serialize configuration to JSON: {e}"))
            })?;
            println!("{json}");
        } else {
            output_human_readable(&config);
        }

        Ok(())
    }
}

impl ConfigSetArgs {
    /// Execute set command
    pub fn execute(&self) -> CliResult<()> {
        if self.width.is_none()
            && self.device_url.is_none()
            && self.sink.is_none()
            && self.interval.is_none()
            && self.clock_format.is_none()
        {
            return Err(CliError::validation(
                "At least one configuration option must be specified: --width, --device-url, --sink, --interval, or --clock-format",
            ));
        }

        let mut config = load_config()?;

        if let Some(width) = self.width {
            config.display.width = width;
        }
        if let Some(url) = &self.device_url {
            config.sink.device_url = url.trim().to_string();
        }
        if let Some(kind) = self.sink {
            config.sink.kind = kind;
        }
        if let Some(interval) = &self.interval {
            config.display.airport_interval =
                interval.parse::<CycleInterval>().map_err(CliError::validation)?;
        }
        if let Some(format) = &self.clock_format {
            config.display.clock_format =
                format.parse::<ClockFormat>().map_err(CliError::validation)?;
        }

        config
            .validate()
            .map_err(|e| CliError::validation(e.to_string()))?;
        config
            .save()
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;

        println!("Configuration updated successfully.");

        Ok(())
    }
}

/// Output configuration in human-readable format
fn output_human_readable(config: &Config) {
    let path = Config::config_file_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "(unknown)".to_string());

    println!("Configuration ({path})");
    println!();
    println!("Display:");
    println!("  Width:            {}", config.display.width);
    println!("  Clock format:     {}", config.display.clock_format);
    println!("  Airport interval: {}", config.display.airport_interval);
    println!();
    println!("Sink:");
    println!("  Kind:             {}", config.sink.kind);
    println!("  Device URL:       {}", config.sink.device_url);
    println!(
        "  MQTT broker:      {}:{}",
        config.sink.mqtt.host, config.sink.mqtt.port
    );
    println!("  MQTT topic:       {}", config.sink.mqtt.topic);
    println!();
    println!("Server:");
    println!("  Listen:           {}", config.server.bind_addr());
}
