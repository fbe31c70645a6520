//! Integration tests for the scheduler service running on real tokio timers.
//!
//! Time is paused, so each test advances the clock explicitly instead of
//! waiting for real minutes to pass.

use std::sync::Arc;
use std::time::Duration;

use splitflap_control::models::{CycleInterval, Mode};
use splitflap_control::scheduler::{self, SchedulerError, SchedulerEvent, SchedulerSettings};
use splitflap_control::sink::MockSink;

fn three_airports() -> SchedulerSettings {
    SchedulerSettings {
        airports: vec!["CYYC".into(), "CYVR".into(), "CYYZ".into()],
        flight_seed: Some(7),
        ..SchedulerSettings::default()
    }
}

async fn advance(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}

#[tokio::test(start_paused = true)]
async fn test_airport_cycling_follows_interval() {
    let sink = Arc::new(MockSink::new());
    let handle = scheduler::spawn(three_airports(), sink.clone());

    handle.start(Mode::AirportCycle).await.unwrap();
    assert_eq!(sink.published_strings(), vec!["  CYYC"]);

    advance(119).await;
    assert_eq!(sink.published().len(), 1, "nothing before the interval elapses");

    advance(2).await;
    assert_eq!(sink.published_strings(), vec!["  CYYC", "  CYVR"]);

    advance(240).await;
    assert_eq!(
        sink.published_strings(),
        vec!["  CYYC", "  CYVR", "  CYYZ", "  CYYC"],
        "sequence wraps back to the first airport"
    );

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_starting_a_mode_replaces_the_previous_one() {
    let sink = Arc::new(MockSink::new());
    let handle = scheduler::spawn(three_airports(), sink.clone());

    handle.start(Mode::AirportCycle).await.unwrap();
    handle.start(Mode::Clock).await.unwrap();
    let after_switch = sink.published().len();

    // Five clock ticks and no airport tick, even past the airport interval.
    advance(5).await;
    let status = handle.status().await.unwrap();
    assert_eq!(status.mode, Some(Mode::Clock));
    let published = sink.published_strings();
    assert!(published.len() >= after_switch + 4);
    assert!(published[after_switch..].iter().all(|t| !t.contains("CYVR")));

    handle.stop().await.unwrap();
    let stopped_at = sink.published().len();
    advance(300).await;
    assert_eq!(sink.published().len(), stopped_at, "stopped modes stay quiet");
    assert_eq!(handle.status().await.unwrap().mode, None);
}

#[tokio::test(start_paused = true)]
async fn test_interval_change_waits_a_full_new_interval() {
    let sink = Arc::new(MockSink::new());
    let handle = scheduler::spawn(three_airports(), sink.clone());

    handle.start(Mode::AirportCycle).await.unwrap();
    advance(60).await;
    handle.set_interval(CycleInterval::FiveMinutes).await.unwrap();
    assert_eq!(sink.published().len(), 1, "no immediate tick on reschedule");

    // The old two-minute deadline has passed, the new one has not.
    advance(120).await;
    assert_eq!(sink.published().len(), 1);

    advance(181).await;
    assert_eq!(sink.published_strings(), vec!["  CYYC", "  CYVR"]);

    let status = handle.status().await.unwrap();
    assert_eq!(status.interval, CycleInterval::FiveMinutes);
    assert_eq!(status.airport.position, 3);
}

#[tokio::test(start_paused = true)]
async fn test_events_are_broadcast() {
    let sink = Arc::new(MockSink::new());
    let handle = scheduler::spawn(three_airports(), sink.clone());
    let mut events = handle.subscribe();

    handle.start(Mode::AirportCycle).await.unwrap();

    assert_eq!(
        events.recv().await.unwrap(),
        SchedulerEvent::ModeStarted {
            mode: Mode::AirportCycle
        }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        SchedulerEvent::AirportShown {
            code: "CYYC".into(),
            position: 1,
            total: 3
        }
    );
    assert!(matches!(
        events.recv().await.unwrap(),
        SchedulerEvent::Published {
            mode: Some(Mode::AirportCycle),
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_disconnected_display_rejects_start() {
    let sink = Arc::new(MockSink::new());
    sink.set_connected(false);
    let handle = scheduler::spawn(three_airports(), sink.clone());

    let err = handle.start(Mode::Clock).await.unwrap_err();
    assert!(matches!(err, SchedulerError::NotConnected));
    assert!(sink.published().is_empty());
    assert_eq!(handle.status().await.unwrap().mode, None);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_the_active_mode() {
    let sink = Arc::new(MockSink::new());
    let handle = scheduler::spawn(three_airports(), sink.clone());
    handle.start(Mode::AirportCycle).await.unwrap();

    handle.shutdown().await.unwrap();
    advance(600).await;

    assert_eq!(sink.published().len(), 1);
    assert_eq!(handle.status().await.unwrap().mode, None);
}

#[tokio::test(start_paused = true)]
async fn test_calibrate_all_staggers_modules() {
    let sink = Arc::new(MockSink::with_modules(3));
    let settings = SchedulerSettings {
        width: 3,
        ..three_airports()
    };
    let handle = scheduler::spawn(settings, sink.clone());

    handle.calibrate(None).await.unwrap();
    assert_eq!(
        sink.maintenance_log(),
        vec!["calibrate 0", "calibrate 1", "calibrate 2"]
    );

    let err = handle.calibrate(Some(3)).await.unwrap_err();
    assert!(matches!(
        err,
        SchedulerError::InvalidModule {
            module: 3,
            width: 3
        }
    ));
}
