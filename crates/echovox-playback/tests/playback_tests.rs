//! Playback crate tests
//!
//! The watcher is exercised against a bare `PlaybackShared`, so no audio
//! device is needed. The playback thread itself is hardware-backed and is
//! covered by the state-machine unit tests in `controller.rs`.

use echovox_playback::{CompletionWatcher, PlaybackEvent, PlaybackShared, PlaybackState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

const FAST_POLL: Duration = Duration::from_millis(5);

#[tokio::test]
async fn watcher_reports_when_playback_stops() {
    let shared = Arc::new(PlaybackShared::new());
    shared.set_state(PlaybackState::Playing);

    let (tx, mut rx) = mpsc::channel(4);
    let _watcher = CompletionWatcher::spawn_with_interval(Arc::clone(&shared), tx, FAST_POLL);

    // Let the watcher observe the playing state, then end playback.
    tokio::time::sleep(Duration::from_millis(25)).await;
    shared.set_state(PlaybackState::Stopped);

    let event = timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("watcher did not report in time")
        .expect("event channel closed");
    assert_eq!(event, PlaybackEvent::Finished);
}

#[tokio::test]
async fn watcher_reports_when_playback_pauses() {
    let shared = Arc::new(PlaybackShared::new());
    shared.set_state(PlaybackState::Playing);

    let (tx, mut rx) = mpsc::channel(4);
    let _watcher = CompletionWatcher::spawn_with_interval(Arc::clone(&shared), tx, FAST_POLL);

    // Still playing: no notification yet.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());

    shared.set_state(PlaybackState::Paused);
    let event = timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("watcher did not report after pause")
        .expect("event channel closed");
    assert_eq!(event, PlaybackEvent::Finished);
}

#[tokio::test]
async fn cancelled_watcher_still_notifies_once() {
    let shared = Arc::new(PlaybackShared::new());
    shared.set_state(PlaybackState::Playing);

    let (tx, mut rx) = mpsc::channel(4);
    let watcher = CompletionWatcher::spawn_with_interval(Arc::clone(&shared), tx, FAST_POLL);
    watcher.cancel();

    let event = timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("cancelled watcher did not report")
        .expect("event channel closed");
    assert_eq!(event, PlaybackEvent::Finished);

    // Exactly one notification, then the channel closes with the task.
    assert!(timeout(Duration::from_millis(200), rx.recv())
        .await
        .expect("channel should close")
        .is_none());
}

#[tokio::test]
async fn watcher_gives_up_if_playback_never_starts() {
    let shared = Arc::new(PlaybackShared::new());
    // State stays Stopped: the play command was lost or failed.

    let (tx, mut rx) = mpsc::channel(4);
    let _watcher = CompletionWatcher::spawn_with_interval(Arc::clone(&shared), tx, FAST_POLL);

    let event = timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("watcher did not give up")
        .expect("event channel closed");
    assert_eq!(event, PlaybackEvent::Finished);
}
