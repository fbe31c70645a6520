//! Display-mode scheduler service.
//!
//! The [`ModeScheduler`] state lives inside a single tokio task. Everything
//! else talks to it through a cloneable [`SchedulerHandle`]: each call sends a
//! closure over a channel and waits for the reply. Timer ticks arrive on a
//! second channel and go through the same loop, so commands and ticks never
//! run concurrently and the state needs no lock.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use splitflap_control::models::Mode;
//! use splitflap_control::scheduler::{self, SchedulerSettings};
//! use splitflap_control::sink::MockSink;
//!
//! # async fn demo() -> Result<(), splitflap_control::scheduler::SchedulerError> {
//! let handle = scheduler::spawn(SchedulerSettings::default(), Arc::new(MockSink::new()));
//! handle.start(Mode::AirportCycle).await?;
//! # Ok(())
//! # }
//! ```

pub mod content;
mod engine;
pub mod events;
pub mod timer;

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info};

use crate::formatter::CodeLookup;
use crate::models::{ClockFormat, CycleInterval, DisplayText, Mode};
use crate::sink::DisplaySink;

pub use content::{
    render_airport, AirportCycler, Clock, FixedClock, LastShown, MockFlightFeed, SystemClock,
    FLIGHT_CANDIDATES,
};
pub use engine::{AirportStatus, ModeScheduler, SchedulerError, SchedulerSettings, SchedulerStatus};
pub use events::SchedulerEvent;
pub use timer::{ManualTaskScheduler, TaskHandle, TaskScheduler, Tick, TokioTaskScheduler};

/// Pending commands before callers start waiting.
const COMMAND_CAPACITY: usize = 32;

type Command = Box<dyn FnOnce(&mut ModeScheduler) + Send>;

/// Spawns the scheduler service with real tokio timers.
///
/// Must be called from within a tokio runtime.
pub fn spawn(settings: SchedulerSettings, sink: Arc<dyn DisplaySink>) -> SchedulerHandle {
    let (tick_tx, tick_rx) = mpsc::unbounded_channel();
    let scheduler = ModeScheduler::new(settings, sink, Box::new(TokioTaskScheduler::new(tick_tx)));
    spawn_with(scheduler, tick_rx)
}

/// Spawns the service around an already-built scheduler.
///
/// `ticks` must be the receiving end of the channel the scheduler's timers
/// send to.
pub fn spawn_with(
    scheduler: ModeScheduler,
    ticks: mpsc::UnboundedReceiver<Tick>,
) -> SchedulerHandle {
    let (commands_tx, commands_rx) = mpsc::channel(COMMAND_CAPACITY);
    let events = scheduler.event_sender();
    tokio::spawn(run(scheduler, commands_rx, ticks));
    SchedulerHandle {
        commands: commands_tx,
        events,
    }
}

async fn run(
    mut scheduler: ModeScheduler,
    mut commands: mpsc::Receiver<Command>,
    mut ticks: mpsc::UnboundedReceiver<Tick>,
) {
    info!("Scheduler service started ({} modules)", scheduler.width());
    loop {
        tokio::select! {
            biased;
            command = commands.recv() => match command {
                Some(command) => command(&mut scheduler),
                None => break,
            },
            Some(tick) = ticks.recv() => scheduler.tick(tick.generation),
        }
    }
    scheduler.stop();
    info!("Scheduler service stopped");
}

/// Cloneable handle to the scheduler service.
#[derive(Clone)]
pub struct SchedulerHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<SchedulerEvent>,
}

impl SchedulerHandle {
    async fn call<R, F>(&self, f: F) -> Result<R, SchedulerError>
    where
        R: Send + 'static,
        F: FnOnce(&mut ModeScheduler) -> R + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let command: Command = Box::new(move |scheduler| {
            let _ = reply_tx.send(f(scheduler));
        });
        self.commands
            .send(command)
            .await
            .map_err(|_| SchedulerError::ServiceStopped)?;
        reply_rx.await.map_err(|_| SchedulerError::ServiceStopped)
    }

    /// Subscribes to scheduler events.
    pub fn subscribe(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.events.subscribe()
    }

    /// Starts `mode`, stopping whatever was active.
    pub async fn start(&self, mode: Mode) -> Result<(), SchedulerError> {
        self.call(move |s| s.start(mode)).await?
    }

    /// Starts clock mode, switching to `format` first when given.
    pub async fn start_clock(&self, format: Option<ClockFormat>) -> Result<(), SchedulerError> {
        self.call(move |s| s.start_clock(format)).await?
    }

    /// Stops the active mode, returning it.
    pub async fn stop(&self) -> Result<Option<Mode>, SchedulerError> {
        self.call(ModeScheduler::stop).await
    }

    /// Stops `mode` only if it is the active one.
    pub async fn stop_if_active(&self, mode: Mode) -> Result<bool, SchedulerError> {
        self.call(move |s| {
            if s.active() == Some(mode) {
                s.stop();
                true
            } else {
                debug!("{} not active, nothing to stop", mode.display_name());
                false
            }
        })
        .await
    }

    /// Changes the airport interval.
    pub async fn set_interval(&self, interval: CycleInterval) -> Result<(), SchedulerError> {
        self.call(move |s| s.set_interval(interval)).await
    }

    /// Changes the clock template.
    pub async fn set_clock_format(&self, format: ClockFormat) -> Result<(), SchedulerError> {
        self.call(move |s| s.set_clock_format(format)).await?
    }

    /// Stops cycling and rewinds to the first airport.
    pub async fn reset_cycler(&self) -> Result<(), SchedulerError> {
        self.call(ModeScheduler::reset_cycler).await
    }

    /// Sends free text.
    pub async fn send_text(&self, text: impl Into<String>) -> Result<DisplayText, SchedulerError> {
        let text = text.into();
        self.call(move |s| s.send_text(&text)).await?
    }

    /// Sends an identifier through the code formatter.
    pub async fn send_code(
        &self,
        identifier: impl Into<String>,
    ) -> Result<DisplayText, SchedulerError> {
        let identifier = identifier.into();
        self.call(move |s| s.send_code(&identifier)).await?
    }

    /// Sends the current airport without advancing.
    pub async fn send_current_airport(&self) -> Result<DisplayText, SchedulerError> {
        self.call(ModeScheduler::send_current_airport).await?
    }

    /// Blanks the display.
    pub async fn blank(&self) -> Result<DisplayText, SchedulerError> {
        self.call(ModeScheduler::blank).await?
    }

    /// Shows one character on every module.
    pub async fn test_character(&self, character: char) -> Result<DisplayText, SchedulerError> {
        self.call(move |s| s.test_character(character)).await?
    }

    /// Formats an identifier against the live mapping.
    pub async fn lookup_code(
        &self,
        identifier: impl Into<String>,
    ) -> Result<CodeLookup, SchedulerError> {
        let identifier = identifier.into();
        self.call(move |s| s.lookup_code(&identifier)).await
    }

    /// Adds or replaces a code mapping entry.
    pub async fn upsert_code(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), SchedulerError> {
        let (key, value) = (key.into(), value.into());
        self.call(move |s| s.upsert_code(&key, &value)).await
    }

    /// Current scheduler state.
    pub async fn status(&self) -> Result<SchedulerStatus, SchedulerError> {
        self.call(|s| s.status()).await
    }

    /// The airport sequence.
    pub async fn airports(&self) -> Result<Vec<String>, SchedulerError> {
        self.call(|s| s.airports()).await
    }

    /// Homes every module and waits for the device.
    pub async fn home(&self) -> Result<(), SchedulerError> {
        let request = self.call(|s| s.home()).await??;
        request.await?;
        Ok(())
    }

    /// Recalibrates one module, or all of them when `module` is `None`.
    pub async fn calibrate(&self, module: Option<usize>) -> Result<(), SchedulerError> {
        let request = self
            .call(move |s| match module {
                Some(module) => s.calibrate(module),
                None => s.calibrate_all(),
            })
            .await??;
        request.await?;
        Ok(())
    }

    /// Stops the active mode ahead of shutdown.
    pub async fn shutdown(&self) -> Result<(), SchedulerError> {
        self.call(|s| {
            s.stop();
        })
        .await
    }
}
