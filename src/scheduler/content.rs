//! Content producers for the timed modes: the airport cycler, the wall clock
//! and the mock flight feed.

use chrono::{Local, NaiveTime};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::airports::CANADIAN_AIRPORTS;
use crate::models::{CycleInterval, DisplayText};

/// Flight codes the mock feed picks from.
pub const FLIGHT_CANDIDATES: &[&str] = &[
    "AC123", "UA456", "DL789", "AA321", "WS654", "F9987", "B6123", "NK456", "AS789", "HA321",
    "SY654", "G4987",
];

// ── Clock ─────────────────────────────────────────────────────────────────────

/// Source of local wall-clock time.
pub trait Clock: Send {
    /// Current local time of day.
    fn now(&self) -> NaiveTime;
}

/// Reads the system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Always returns the same time.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.0
    }
}

// ── Airport cycler ────────────────────────────────────────────────────────────

/// Most recent airport sent to the display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastShown {
    /// Airport code.
    pub code: String,
    /// Local time it was shown.
    pub at: NaiveTime,
}

/// Result of advancing the cycler by one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirportStep {
    /// Code to display.
    pub code: String,
    /// 1-based position of `code` in the sequence.
    pub position: usize,
    /// Sequence length.
    pub total: usize,
    /// True when this step wrapped the index back to the start.
    pub wrapped: bool,
}

/// Walks a fixed airport sequence one code per tick.
#[derive(Debug, Clone)]
pub struct AirportCycler {
    sequence: Vec<String>,
    index: usize,
    interval: CycleInterval,
    last_shown: Option<LastShown>,
}

impl AirportCycler {
    /// Creates a cycler at index 0 with the default interval.
    ///
    /// Returns `None` for an empty sequence.
    pub fn new(sequence: Vec<String>) -> Option<Self> {
        if sequence.is_empty() {
            return None;
        }
        Some(Self {
            sequence,
            index: 0,
            interval: CycleInterval::default(),
            last_shown: None,
        })
    }

    /// Cycler over the built-in Canadian airport list.
    pub fn canadian() -> Self {
        Self {
            sequence: CANADIAN_AIRPORTS.iter().map(|c| (*c).to_string()).collect(),
            index: 0,
            interval: CycleInterval::default(),
            last_shown: None,
        }
    }

    /// The code at the current index.
    pub fn current(&self) -> &str {
        &self.sequence[self.index]
    }

    /// Returns the current code and moves to the next one, wrapping at the end.
    pub fn advance(&mut self, now: NaiveTime) -> AirportStep {
        let code = self.sequence[self.index].clone();
        let position = self.index + 1;
        self.index = (self.index + 1) % self.sequence.len();
        self.last_shown = Some(LastShown {
            code: code.clone(),
            at: now,
        });

        AirportStep {
            code,
            position,
            total: self.sequence.len(),
            wrapped: self.index == 0,
        }
    }

    /// Records a manual send of the current code without advancing.
    pub fn mark_shown(&mut self, now: NaiveTime) {
        self.last_shown = Some(LastShown {
            code: self.current().to_string(),
            at: now,
        });
    }

    /// Back to index 0 and the default interval.
    pub fn reset(&mut self) {
        self.index = 0;
        self.interval = CycleInterval::default();
        self.last_shown = None;
    }

    /// 0-based index of the next code to show.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Sequence length.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Always false; empty sequences are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// The full sequence.
    pub fn sequence(&self) -> &[String] {
        &self.sequence
    }

    /// Time between codes.
    pub fn interval(&self) -> CycleInterval {
        self.interval
    }

    /// Changes the time between codes. Returns false if it was already set.
    pub fn set_interval(&mut self, interval: CycleInterval) -> bool {
        if self.interval == interval {
            return false;
        }
        self.interval = interval;
        true
    }

    /// Last code sent to the display, if any.
    pub fn last_shown(&self) -> Option<&LastShown> {
        self.last_shown.as_ref()
    }
}

/// Renders an airport code with two leading spaces, fitted to `width`.
///
/// ```
/// use splitflap_control::scheduler::render_airport;
///
/// assert_eq!(render_airport("CYYZ", 6).as_str(), "  CYYZ");
/// ```
pub fn render_airport(code: &str, width: usize) -> DisplayText {
    DisplayText::fit(&format!("  {code}"), width)
}

// ── Mock flight feed ──────────────────────────────────────────────────────────

/// Stand-in for a live flight feed: a uniformly random pick per tick.
pub struct MockFlightFeed {
    rng: SmallRng,
}

impl MockFlightFeed {
    /// Entropy-seeded feed.
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Deterministic feed for tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Picks the next flight code.
    pub fn next_code(&mut self) -> &'static str {
        FLIGHT_CANDIDATES[self.rng.gen_range(0..FLIGHT_CANDIDATES.len())]
    }
}

impl Default for MockFlightFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three() -> AirportCycler {
        AirportCycler::new(vec!["CYYC".into(), "CYVR".into(), "CYYZ".into()]).unwrap()
    }

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_sequence_rejected() {
        assert!(AirportCycler::new(Vec::new()).is_none());
    }

    #[test]
    fn test_advance_wraps_after_full_cycle() {
        let mut cycler = three();
        let steps: Vec<AirportStep> = (0..4).map(|_| cycler.advance(noon())).collect();

        let codes: Vec<&str> = steps.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["CYYC", "CYVR", "CYYZ", "CYYC"]);
        assert_eq!(steps.iter().filter(|s| s.wrapped).count(), 1);
        assert!(steps[2].wrapped);
        assert_eq!(steps[2].position, 3);
        assert_eq!(cycler.index(), 1);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut cycler = three();
        cycler.advance(noon());
        assert!(cycler.set_interval(CycleInterval::FifteenMinutes));
        assert!(!cycler.set_interval(CycleInterval::FifteenMinutes));

        cycler.reset();
        assert_eq!(cycler.index(), 0);
        assert_eq!(cycler.interval(), CycleInterval::TwoMinutes);
        assert!(cycler.last_shown().is_none());
    }

    #[test]
    fn test_mark_shown_does_not_advance() {
        let mut cycler = three();
        cycler.mark_shown(noon());
        assert_eq!(cycler.index(), 0);
        assert_eq!(cycler.last_shown().unwrap().code, "CYYC");
    }

    #[test]
    fn test_canadian_list_starts_with_calgary() {
        let cycler = AirportCycler::canadian();
        assert_eq!(cycler.current(), "CYYC");
        assert_eq!(cycler.len(), CANADIAN_AIRPORTS.len());
    }

    #[test]
    fn test_render_airport_pads_and_truncates() {
        assert_eq!(render_airport("CYYZ", 6).as_str(), "  CYYZ");
        assert_eq!(render_airport("CYYZ", 8).as_str(), "  CYYZ  ");
        assert_eq!(render_airport("CYYZ", 4).as_str(), "  CY");
    }

    #[test]
    fn test_seeded_feed_is_deterministic() {
        let mut a = MockFlightFeed::seeded(42);
        let mut b = MockFlightFeed::seeded(42);
        for _ in 0..20 {
            let code = a.next_code();
            assert_eq!(code, b.next_code());
            assert!(FLIGHT_CANDIDATES.contains(&code));
        }
    }
}
