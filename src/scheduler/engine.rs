//! The mode scheduler: one active display mode, its timer, and the manual
//! display operations.
//!
//! ## Design
//!
//! - At most one mode is active; starting a mode stops the previous one first
//! - Every (re)schedule bumps a generation counter; ticks from an older
//!   generation are ignored
//! - Publishes are spawned and never awaited here; failures come back as
//!   [`SchedulerEvent::PublishFailed`]
//! - Timer, clock and sink are injected so tests can drive everything by hand

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use super::content::{
    render_airport, AirportCycler, Clock, LastShown, MockFlightFeed, SystemClock,
};
use super::events::SchedulerEvent;
use super::timer::{TaskHandle, TaskScheduler};
use crate::constants::{CALIBRATE_STAGGER, CLOCK_PERIOD, FLIGHT_PERIOD};
use crate::formatter::{self, CodeLookup, CodeMapping};
use crate::models::{ClockFormat, CycleInterval, DisplayText, Mode, DEFAULT_WIDTH};
use crate::sink::{DisplaySink, PublishOptions, SinkError, SinkFuture};

/// Capacity of the event broadcast channel.
const EVENT_CAPACITY: usize = 64;

/// Errors returned by scheduler operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The sink reports no connection to the display.
    #[error("not connected to display")]
    NotConnected,
    /// The scheduler service task is gone.
    #[error("scheduler service has stopped")]
    ServiceStopped,
    /// Module index outside the display.
    #[error("module {module} does not exist (display has {width} modules)")]
    InvalidModule {
        /// Requested module.
        module: usize,
        /// Display width.
        width: usize,
    },
    /// The sink failed a maintenance operation.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Startup settings for a [`ModeScheduler`].
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// Module count.
    pub width: usize,
    /// Template used by clock mode.
    pub clock_format: ClockFormat,
    /// Initial time between airports.
    pub airport_interval: CycleInterval,
    /// Airport sequence; an empty list falls back to the built-in one.
    pub airports: Vec<String>,
    /// Identifier to short-code table.
    pub mapping: CodeMapping,
    /// Seed for the mock flight feed; `None` seeds from entropy.
    pub flight_seed: Option<u64>,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            clock_format: ClockFormat::default(),
            airport_interval: CycleInterval::default(),
            airports: Vec::new(),
            mapping: CodeMapping::airlines(),
            flight_seed: None,
        }
    }
}

/// Airport cycler part of [`SchedulerStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AirportStatus {
    /// 1-based position of the next airport.
    pub position: usize,
    /// Sequence length.
    pub total: usize,
    /// Next airport to be shown.
    pub next: String,
    /// Last airport shown, with its local time.
    pub last_shown: Option<LastShown>,
}

/// Point-in-time snapshot of the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedulerStatus {
    /// Active mode, if any.
    pub mode: Option<Mode>,
    /// Module count.
    pub width: usize,
    /// Whether the sink reports a connection.
    pub connected: bool,
    /// Sink kind, e.g. "http".
    pub sink: String,
    /// Airport cycler state.
    pub airport: AirportStatus,
    /// Time between airports.
    pub interval: CycleInterval,
    /// Clock mode template.
    pub clock_format: ClockFormat,
}

/// Owns the active mode and everything needed to produce its content.
pub struct ModeScheduler {
    active: Option<Mode>,
    cycler: AirportCycler,
    clock_format: ClockFormat,
    flights: MockFlightFeed,
    mapping: CodeMapping,
    width: usize,
    generation: u64,
    timer: Option<TaskHandle>,
    timers: Box<dyn TaskScheduler>,
    sink: Arc<dyn DisplaySink>,
    clock: Box<dyn Clock>,
    events: broadcast::Sender<SchedulerEvent>,
}

impl ModeScheduler {
    /// Creates an idle scheduler using the system clock.
    pub fn new(
        settings: SchedulerSettings,
        sink: Arc<dyn DisplaySink>,
        timers: Box<dyn TaskScheduler>,
    ) -> Self {
        let mut cycler = AirportCycler::new(settings.airports).unwrap_or_else(|| {
            debug!("Using built-in airport list");
            AirportCycler::canadian()
        });
        cycler.set_interval(settings.airport_interval);

        let flights = match settings.flight_seed {
            Some(seed) => MockFlightFeed::seeded(seed),
            None => MockFlightFeed::new(),
        };
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            active: None,
            cycler,
            clock_format: settings.clock_format,
            flights,
            mapping: settings.mapping,
            width: settings.width,
            generation: 0,
            timer: None,
            timers,
            sink,
            clock: Box::new(SystemClock),
            events,
        }
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Subscribes to scheduler events.
    pub fn subscribe(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.events.subscribe()
    }

    /// Sender side of the event channel, for handles that subscribe later.
    pub(crate) fn event_sender(&self) -> broadcast::Sender<SchedulerEvent> {
        self.events.clone()
    }

    /// The active mode.
    pub fn active(&self) -> Option<Mode> {
        self.active
    }

    /// Current timer generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Module count.
    pub fn width(&self) -> usize {
        self.width
    }

    // ── Modes ─────────────────────────────────────────────────────────────

    /// Makes `mode` the active mode, publishing its first value immediately.
    ///
    /// Fails without touching any state if the display is not connected.
    pub fn start(&mut self, mode: Mode) -> Result<(), SchedulerError> {
        if !self.sink.is_connected() {
            warn!("Cannot start {}: not connected to display", mode.display_name());
            return Err(SchedulerError::NotConnected);
        }

        self.stop();
        self.active = Some(mode);
        match mode {
            Mode::AirportCycle => info!(
                "Airport cycling started - {} airports every {}",
                self.cycler.len(),
                self.cycler.interval()
            ),
            Mode::Clock => info!("Clock started ({})", self.clock_format),
            Mode::FlightMock => info!("Flight tracking started (mock feed)"),
        }
        self.emit(SchedulerEvent::ModeStarted { mode });

        self.publish_next(mode);
        self.schedule(mode);
        Ok(())
    }

    /// Stops the active mode, if any. The display keeps its last text.
    pub fn stop(&mut self) -> Option<Mode> {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        let mode = self.active.take()?;
        info!("{} stopped", mode.display_name());
        self.emit(SchedulerEvent::ModeStopped { mode });
        Some(mode)
    }

    /// Handles a timer tick scheduled under `generation`.
    pub fn tick(&mut self, generation: u64) {
        if generation != self.generation {
            trace!(
                "Ignoring stale tick (generation {}, current {})",
                generation,
                self.generation
            );
            return;
        }
        let Some(mode) = self.active else {
            trace!("Ignoring tick with no active mode");
            return;
        };
        if !self.sink.is_connected() {
            warn!("Skipping {} update: not connected to display", mode.display_name());
            return;
        }
        self.publish_next(mode);
    }

    /// Changes the airport interval, rescheduling if airport cycling is active.
    ///
    /// The next airport after a reschedule is shown one full new interval later.
    pub fn set_interval(&mut self, interval: CycleInterval) {
        if !self.cycler.set_interval(interval) {
            return;
        }
        info!("Airport interval set to {}", interval);
        self.emit(SchedulerEvent::IntervalChanged { interval });

        if self.active == Some(Mode::AirportCycle) {
            if let Some(timer) = self.timer.take() {
                timer.cancel();
            }
            self.schedule(Mode::AirportCycle);
        }
    }

    /// Changes the clock template, restarting clock mode if it is active.
    pub fn set_clock_format(&mut self, format: ClockFormat) -> Result<(), SchedulerError> {
        if self.clock_format == format {
            return Ok(());
        }
        self.clock_format = format;
        info!("Clock format set to {}", format);
        if self.active == Some(Mode::Clock) {
            self.start(Mode::Clock)?;
        }
        Ok(())
    }

    /// Starts clock mode, switching to `format` first when given.
    ///
    /// The clock is (re)started exactly once, so a running clock publishes
    /// one update in the new format.
    pub fn start_clock(&mut self, format: Option<ClockFormat>) -> Result<(), SchedulerError> {
        self.require_connection()?;
        if let Some(format) = format.filter(|f| *f != self.clock_format) {
            self.clock_format = format;
            info!("Clock format set to {}", format);
        }
        self.start(Mode::Clock)
    }

    /// Stops airport cycling if active and rewinds the cycler.
    pub fn reset_cycler(&mut self) {
        if self.active == Some(Mode::AirportCycle) {
            self.stop();
        }
        let previous = self.cycler.interval();
        self.cycler.reset();
        info!("Airport cycling reset to start");
        if previous != self.cycler.interval() {
            self.emit(SchedulerEvent::IntervalChanged {
                interval: self.cycler.interval(),
            });
        }
    }

    // ── Manual sends ──────────────────────────────────────────────────────

    /// Publishes free text, fitted to the display. The active mode keeps running.
    pub fn send_text(&mut self, text: &str) -> Result<DisplayText, SchedulerError> {
        self.require_connection()?;
        let text = DisplayText::fit(text, self.width);
        info!("Sending text: \"{}\"", text);
        Ok(self.dispatch(text, None))
    }

    /// Publishes an identifier after running it through the code formatter.
    pub fn send_code(&mut self, identifier: &str) -> Result<DisplayText, SchedulerError> {
        self.require_connection()?;
        let text = formatter::format(Some(identifier), &self.mapping, self.width);
        info!("Sending code {} as \"{}\"", identifier, text);
        Ok(self.dispatch(text, None))
    }

    /// Publishes the current airport without advancing the cycler.
    pub fn send_current_airport(&mut self) -> Result<DisplayText, SchedulerError> {
        self.require_connection()?;
        let now = self.clock.now();
        self.cycler.mark_shown(now);
        let code = self.cycler.current().to_string();
        info!(
            "Sent current airport: {} ({}/{})",
            code,
            self.cycler.index() + 1,
            self.cycler.len()
        );
        let text = render_airport(&code, self.width);
        Ok(self.dispatch(text, None))
    }

    /// Publishes spaces to every module.
    pub fn blank(&mut self) -> Result<DisplayText, SchedulerError> {
        self.require_connection()?;
        info!("Blanking display");
        let text = DisplayText::blank(self.width);
        Ok(self.dispatch(text, None))
    }

    /// Publishes one character on every module, uppercased.
    pub fn test_character(&mut self, character: char) -> Result<DisplayText, SchedulerError> {
        self.require_connection()?;
        let upper = character.to_uppercase().next().unwrap_or(character);
        info!("Testing character '{}'", upper);
        let text = DisplayText::repeated(upper, self.width);
        Ok(self.dispatch(text, None))
    }

    // ── Code mapping ──────────────────────────────────────────────────────

    /// Runs `identifier` through the formatter against the live mapping.
    pub fn lookup_code(&self, identifier: &str) -> CodeLookup {
        formatter::describe(identifier, &self.mapping, self.width)
    }

    /// Adds or replaces a mapping entry. Empty arguments are ignored.
    pub fn upsert_code(&mut self, key: &str, value: &str) {
        if key.is_empty() || value.is_empty() {
            debug!("Ignoring empty code mapping update");
            return;
        }
        self.mapping.upsert(key, value);
        info!(
            "Code mapping updated: {} -> {}",
            key.to_uppercase(),
            value.to_uppercase()
        );
    }

    // ── Status ────────────────────────────────────────────────────────────

    /// Snapshot of the current state.
    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            mode: self.active,
            width: self.width,
            connected: self.sink.is_connected(),
            sink: self.sink.kind().to_string(),
            airport: AirportStatus {
                position: self.cycler.index() + 1,
                total: self.cycler.len(),
                next: self.cycler.current().to_string(),
                last_shown: self.cycler.last_shown().cloned(),
            },
            interval: self.cycler.interval(),
            clock_format: self.clock_format,
        }
    }

    /// The airport sequence.
    pub fn airports(&self) -> Vec<String> {
        self.cycler.sequence().to_vec()
    }

    // ── Maintenance ───────────────────────────────────────────────────────

    /// Homes every module. The returned future performs the request.
    pub fn home(&self) -> Result<SinkFuture<()>, SchedulerError> {
        self.require_connection()?;
        Ok(self.sink.home())
    }

    /// Recalibrates one module.
    pub fn calibrate(&self, module: usize) -> Result<SinkFuture<()>, SchedulerError> {
        self.require_connection()?;
        if module >= self.width {
            return Err(SchedulerError::InvalidModule {
                module,
                width: self.width,
            });
        }
        Ok(self.sink.calibrate(module))
    }

    /// Recalibrates every module, starting one every two seconds.
    pub fn calibrate_all(&self) -> Result<SinkFuture<()>, SchedulerError> {
        self.require_connection()?;
        let sink = Arc::clone(&self.sink);
        let modules = self.width;
        info!("Calibrating all {} modules", modules);

        Ok(Box::pin(async move {
            let start = Instant::now();
            for module in 0..modules {
                tokio::time::sleep_until(start + stagger(module)).await;
                sink.calibrate(module).await?;
            }
            Ok(())
        }))
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn require_connection(&self) -> Result<(), SchedulerError> {
        if self.sink.is_connected() {
            Ok(())
        } else {
            Err(SchedulerError::NotConnected)
        }
    }

    fn period(&self, mode: Mode) -> Duration {
        match mode {
            Mode::Clock => CLOCK_PERIOD,
            Mode::FlightMock => FLIGHT_PERIOD,
            Mode::AirportCycle => self.cycler.interval().duration(),
        }
    }

    fn schedule(&mut self, mode: Mode) {
        self.generation += 1;
        let period = self.period(mode);
        debug!(
            "Scheduling {} every {:?} (generation {})",
            mode, period, self.generation
        );
        self.timer = Some(self.timers.schedule_repeating(period, self.generation));
    }

    fn publish_next(&mut self, mode: Mode) {
        match mode {
            Mode::Clock => {
                let rendered = self.clock_format.render(&self.clock.now());
                let text = DisplayText::fit(&rendered, self.width);
                self.dispatch(text, Some(mode));
            }
            Mode::FlightMock => {
                let code = self.flights.next_code();
                let text = formatter::format(Some(code), &self.mapping, self.width);
                info!("Flight update: {}", code);
                self.dispatch(text, Some(mode));
            }
            Mode::AirportCycle => {
                let step = self.cycler.advance(self.clock.now());
                info!("Airport {}/{}: {}", step.position, step.total, step.code);
                self.emit(SchedulerEvent::AirportShown {
                    code: step.code.clone(),
                    position: step.position,
                    total: step.total,
                });
                self.dispatch(render_airport(&step.code, self.width), Some(mode));
                if step.wrapped {
                    info!(
                        "Completed full cycle of {} airports, starting over",
                        step.total
                    );
                    self.emit(SchedulerEvent::CycleCompleted { total: step.total });
                }
            }
        }
    }

    /// Hands `text` to the sink and returns it. Errors surface asynchronously.
    fn dispatch(&self, text: DisplayText, mode: Option<Mode>) -> DisplayText {
        let publish = self.sink.publish(&text, PublishOptions::default());
        self.emit(SchedulerEvent::Published {
            mode,
            text: text.as_str().to_string(),
        });

        let events = self.events.clone();
        let payload = text.as_str().to_string();
        tokio::spawn(async move {
            if let Err(e) = publish.await {
                warn!("Failed to send \"{}\": {}", payload, e);
                let _ = events.send(SchedulerEvent::PublishFailed {
                    text: payload,
                    error: e.to_string(),
                });
            }
        });
        text
    }

    fn emit(&self, event: SchedulerEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn stagger(module: usize) -> Duration {
    CALIBRATE_STAGGER * module as u32
}
