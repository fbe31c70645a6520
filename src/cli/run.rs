//! Daemon command: connect, schedule, serve the control API.

use std::sync::Arc;

use crate::cli::common::{connect_sink, load_config, CliError, CliResult};
use crate::config::SinkKind;
use crate::models::Mode;
use crate::scheduler::{self, SchedulerEvent};
use clap::Args;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

/// Run the scheduler and control API until interrupted
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Mode to start right away (clock, flight or airports)
    #[arg(long, value_name = "MODE")]
    pub mode: Option<Mode>,

    /// Display transport, overriding the configured one
    #[arg(long, value_enum)]
    pub sink: Option<SinkKind>,

    /// Device address, overriding the configured one
    #[arg(long, value_name = "URL")]
    pub device: Option<String>,

    /// Do not start the control API
    #[arg(long)]
    pub no_server: bool,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(&self) -> CliResult<()> {
        let mut config = load_config()?;
        if let Some(kind) = self.sink {
            config.sink.kind = kind;
        }
        if let Some(device) = &self.device {
            config.sink.device_url.clone_from(device);
        }

        let connected = connect_sink(&config).await?;
        info!(
            "Display connected via {} ({} modules)",
            connected.sink.kind(),
            connected.width
        );

        let sink = Arc::clone(&connected.sink);
        let handle = scheduler::spawn(config.scheduler_settings(connected.width), connected.sink);
        tokio::spawn(log_events(handle.subscribe()));

        if let Some(mode) = self.mode {
            handle.start(mode).await?;
        }

        if self.no_server {
            info!("Control API disabled; press Ctrl-C to stop");
            shutdown_signal().await;
        } else {
            serve(&config, handle.clone()).await?;
        }

        handle.shutdown().await?;
        sink.disconnect();
        info!("Shut down cleanly");
        Ok(())
    }
}

#[cfg(feature = "web")]
async fn serve(config: &crate::config::Config, handle: scheduler::SchedulerHandle) -> CliResult<()> {
    let addr: std::net::SocketAddr = config.server.bind_addr().parse().map_err(|e| {
        CliError::validation(format!(
            "Invalid server address {}: {e}",
            config.server.bind_addr()
        ))
    })?;
    crate::web::run_server(handle, addr, shutdown_signal())
        .await
        .map_err(|e| CliError::io(format!("{e:#}")))
}

#[cfg(not(feature = "web"))]
async fn serve(_config: &crate::config::Config, _handle: scheduler::SchedulerHandle) -> CliResult<()> {
    warn!("Control API not compiled in (enable the `web` feature); press Ctrl-C to stop");
    shutdown_signal().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Interrupt received, shutting down");
}

async fn log_events(mut events: broadcast::Receiver<SchedulerEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => debug!(?event, "Scheduler event"),
            Err(RecvError::Lagged(skipped)) => warn!("Event log skipped {} events", skipped),
            Err(RecvError::Closed) => break,
        }
    }
}
