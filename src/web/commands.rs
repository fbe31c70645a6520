//! Remote commands posted by a companion controller.
//!
//! Commands are JSON objects tagged by `type`, e.g.
//! `{"type": "setText", "text": "HELLO"}` or `{"type": "calibrate", "module": 2}`.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{ClockFormat, Mode};
use crate::scheduler::{SchedulerError, SchedulerHandle};

/// A remote control command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RemoteCommand {
    /// Show free text.
    SetText {
        /// Text to show.
        text: String,
    },
    /// Start clock mode, optionally switching template.
    StartTime {
        /// Clock template. Unknown templates fall back to the default.
        #[serde(default, deserialize_with = "lenient_clock_format")]
        format: Option<ClockFormat>,
    },
    /// Stop clock mode if it is running.
    StopTime,
    /// Start flight tracking.
    StartFlight {
        /// Area of interest. The mock feed ignores it.
        #[serde(default)]
        location: Option<String>,
        /// Search radius. The mock feed ignores it.
        #[serde(default)]
        radius: Option<f64>,
    },
    /// Stop flight tracking if it is running.
    StopFlight,
    /// Start airport cycling.
    StartAirports,
    /// Stop airport cycling if it is running.
    StopAirports,
    /// Calibrate one module, or home all of them when `module` is absent.
    Calibrate {
        /// Module index.
        #[serde(default)]
        module: Option<usize>,
    },
}

impl RemoteCommand {
    /// The wire name of the command.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetText { .. } => "setText",
            Self::StartTime { .. } => "startTime",
            Self::StopTime => "stopTime",
            Self::StartFlight { .. } => "startFlight",
            Self::StopFlight => "stopFlight",
            Self::StartAirports => "startAirports",
            Self::StopAirports => "stopAirports",
            Self::Calibrate { .. } => "calibrate",
        }
    }

    /// Runs the command against the scheduler.
    pub async fn apply(self, scheduler: &SchedulerHandle) -> Result<(), SchedulerError> {
        match self {
            Self::SetText { text } => {
                scheduler.send_text(text).await?;
            }
            Self::StartTime { format } => scheduler.start_clock(format).await?,
            Self::StopTime => {
                scheduler.stop_if_active(Mode::Clock).await?;
            }
            Self::StartFlight { location, radius } => {
                if location.is_some() || radius.is_some() {
                    info!(
                        "Flight area {:?} radius {:?} ignored by mock feed",
                        location, radius
                    );
                }
                scheduler.start(Mode::FlightMock).await?;
            }
            Self::StopFlight => {
                scheduler.stop_if_active(Mode::FlightMock).await?;
            }
            Self::StartAirports => scheduler.start(Mode::AirportCycle).await?,
            Self::StopAirports => {
                scheduler.stop_if_active(Mode::AirportCycle).await?;
            }
            Self::Calibrate { module: Some(module) } => {
                scheduler.calibrate(Some(module)).await?;
            }
            Self::Calibrate { module: None } => scheduler.home().await?,
        }
        Ok(())
    }
}

fn lenient_clock_format<'de, D>(deserializer: D) -> Result<Option<ClockFormat>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(|raw| {
        raw.parse().unwrap_or_else(|e| {
            warn!("{}; using {}", e, ClockFormat::default());
            ClockFormat::default()
        })
    }))
}

/// Acknowledgement returned for an accepted command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandReceipt {
    /// Unique receipt identifier.
    pub id: Uuid,
    /// Wire name of the command.
    pub command: String,
    /// Time the command was accepted (RFC 3339).
    pub received_at: String,
}

impl CommandReceipt {
    /// Issues a receipt for `command`.
    pub fn issue(command: &RemoteCommand) -> Self {
        let receipt = Self {
            id: Uuid::new_v4(),
            command: command.name().to_string(),
            received_at: chrono::Utc::now().to_rfc3339(),
        };
        info!("Remote command received: {} ({})", receipt.command, receipt.id);
        receipt
    }
}
