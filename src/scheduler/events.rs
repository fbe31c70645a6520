//! Scheduler events broadcast to observers (log, API, tests).

use serde::Serialize;

use crate::models::{CycleInterval, Mode};

/// Something that happened inside the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SchedulerEvent {
    /// A mode became active.
    ModeStarted {
        /// The new mode.
        mode: Mode,
    },
    /// The active mode was stopped.
    ModeStopped {
        /// The mode that was active.
        mode: Mode,
    },
    /// Text was handed to the sink.
    Published {
        /// Mode that produced it, `None` for manual sends.
        mode: Option<Mode>,
        /// Exact payload.
        text: String,
    },
    /// The airport cycler showed a code.
    AirportShown {
        /// Airport code.
        code: String,
        /// 1-based position.
        position: usize,
        /// Sequence length.
        total: usize,
    },
    /// The airport cycler wrapped to the start.
    CycleCompleted {
        /// Number of airports in one cycle.
        total: usize,
    },
    /// The airport interval changed.
    IntervalChanged {
        /// New interval.
        interval: CycleInterval,
    },
    /// The sink rejected a payload.
    PublishFailed {
        /// Payload that failed.
        text: String,
        /// Sink error message.
        error: String,
    },
}
