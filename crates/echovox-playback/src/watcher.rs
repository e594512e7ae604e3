use crate::controller::{PlaybackShared, PlaybackState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Fixed poll interval for playback-completion detection.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Ticks the watcher tolerates before its first `Playing` observation; the
/// play command crosses a queue, so the state flip is not instantaneous.
const STARTUP_GRACE_TICKS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    Finished,
}

/// Polls playback state until it leaves `Playing` (or the watcher is
/// cancelled), then emits a single `Finished` notification.
///
/// Purely observational: the watcher never mutates playback state.
pub struct CompletionWatcher {
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl CompletionWatcher {
    pub fn spawn(shared: Arc<PlaybackShared>, events: mpsc::Sender<PlaybackEvent>) -> Self {
        Self::spawn_with_interval(shared, events, POLL_INTERVAL)
    }

    pub fn spawn_with_interval(
        shared: Arc<PlaybackShared>,
        events: mpsc::Sender<PlaybackEvent>,
        poll: Duration,
    ) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll);
            let mut saw_playing = false;
            let mut ticks = 0u32;

            loop {
                interval.tick().await;
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                match shared.state() {
                    PlaybackState::Playing => saw_playing = true,
                    _ => {
                        if saw_playing || ticks >= STARTUP_GRACE_TICKS {
                            break;
                        }
                    }
                }
                ticks = ticks.saturating_add(1);
            }

            let _ = events.send(PlaybackEvent::Finished).await;
        });

        Self {
            cancelled,
            handle: Some(handle),
        }
    }

    /// Ask the watcher to exit at its next tick.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Cancel and drop the task without waiting for the next tick.
    pub fn abort(mut self) {
        self.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
