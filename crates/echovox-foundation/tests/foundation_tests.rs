//! Foundation crate tests
//!
//! Tests cover:
//! - Phase machine transitions (valid, invalid, subscription delivery)
//! - Clock abstraction (RealClock, TestClock)
//! - Error recovery strategies

use echovox_foundation::clock::{real_clock, test_clock, Clock, RealClock};
use echovox_foundation::error::{AppError, PlaybackError, RecoveryStrategy};
use echovox_foundation::phase::{Phase, PhaseManager};
use std::path::PathBuf;
use std::time::{Duration, Instant};

// ─── Phase Machine Tests ────────────────────────────────────────────

#[test]
fn phase_manager_starts_idle() {
    let phases = PhaseManager::new();
    assert_eq!(phases.current(), Phase::Idle);
}

#[test]
fn conversion_round_trip() {
    let phases = PhaseManager::new();
    phases.transition(Phase::Converting).unwrap();
    assert_eq!(phases.current(), Phase::Converting);
    phases.transition(Phase::Idle).unwrap();
    assert_eq!(phases.current(), Phase::Idle);
}

#[test]
fn playback_pause_resume_stop() {
    let phases = PhaseManager::new();
    phases.transition(Phase::Playing).unwrap();
    phases.transition(Phase::Paused).unwrap();
    phases.transition(Phase::Playing).unwrap();
    phases.transition(Phase::Idle).unwrap();
    assert_eq!(phases.current(), Phase::Idle);
}

#[test]
fn paused_can_stop_directly() {
    let phases = PhaseManager::new();
    phases.transition(Phase::Playing).unwrap();
    phases.transition(Phase::Paused).unwrap();
    assert!(phases.transition(Phase::Idle).is_ok());
}

#[test]
fn converting_cannot_start_playback() {
    let phases = PhaseManager::new();
    phases.transition(Phase::Converting).unwrap();
    let err = phases.transition(Phase::Playing).unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));
    // Failed transition leaves the phase untouched.
    assert_eq!(phases.current(), Phase::Converting);
}

#[test]
fn idle_cannot_pause() {
    let phases = PhaseManager::new();
    assert!(phases.transition(Phase::Paused).is_err());
}

#[test]
fn transitions_are_delivered_to_subscribers() {
    let phases = PhaseManager::new();
    let rx = phases.subscribe();
    phases.transition(Phase::Converting).unwrap();
    phases.transition(Phase::Idle).unwrap();
    assert_eq!(rx.try_recv().unwrap(), Phase::Converting);
    assert_eq!(rx.try_recv().unwrap(), Phase::Idle);
}

#[test]
fn phase_display_names() {
    assert_eq!(Phase::Idle.to_string(), "idle");
    assert_eq!(Phase::Converting.to_string(), "converting");
    assert_eq!(Phase::Playing.to_string(), "playing");
    assert_eq!(Phase::Paused.to_string(), "paused");
}

// ─── Clock Tests ────────────────────────────────────────────────────

#[test]
fn real_clock_now_returns_current_time() {
    let clock = RealClock::new();
    let before = Instant::now();
    let clock_time = clock.now();
    let after = Instant::now();
    assert!(clock_time >= before);
    assert!(clock_time <= after);
}

#[test]
fn real_clock_factory_function() {
    let clock = real_clock();
    let t = clock.now();
    assert!(t.elapsed() < Duration::from_secs(1));
}

#[test]
fn test_clock_sleep_advances_without_blocking() {
    let clock = test_clock();
    let t0 = clock.now();
    clock.sleep(Duration::from_secs(10));
    let t1 = clock.now();
    assert_eq!(t1.duration_since(t0), Duration::from_secs(10));
}

#[test]
fn test_clock_advance_accumulates() {
    let clock = test_clock();
    let start = clock.now();
    clock.advance(Duration::from_millis(100));
    clock.advance(Duration::from_millis(200));
    clock.advance(Duration::from_millis(300));
    let elapsed = clock.now().duration_since(start);
    assert_eq!(elapsed, Duration::from_millis(600));
}

// ─── Error Recovery Tests ───────────────────────────────────────────

#[test]
fn synthesis_failure_is_not_fatal() {
    let err = AppError::Synthesis("connection reset".into());
    assert!(matches!(err.recovery_strategy(), RecoveryStrategy::Ignore));
}

#[test]
fn missing_audio_file_is_ignored() {
    let err = AppError::Playback(PlaybackError::FileNotFound {
        path: PathBuf::from("output.mp3"),
    });
    assert!(matches!(err.recovery_strategy(), RecoveryStrategy::Ignore));
}

#[test]
fn transient_errors_retry() {
    let err = AppError::Transient("poll lagged".into());
    match err.recovery_strategy() {
        RecoveryStrategy::Retry { max_attempts, delay } => {
            assert_eq!(max_attempts, 3);
            assert_eq!(delay, Duration::from_secs(1));
        }
        other => panic!("expected retry, got {:?}", other),
    }
}

#[test]
fn shutdown_and_config_errors_are_fatal() {
    assert!(matches!(
        AppError::ShutdownRequested.recovery_strategy(),
        RecoveryStrategy::Fatal
    ));
    assert!(matches!(
        AppError::Config("bad voice id".into()).recovery_strategy(),
        RecoveryStrategy::Fatal
    ));
}
