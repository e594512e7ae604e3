//! Audio playback for EchoVox
//!
//! A dedicated OS thread owns the audio output (the rodio stream and sink are
//! not `Send`); the rest of the application talks to it through a command
//! channel and observes a shared atomic state. A separate completion watcher
//! polls that state and notifies the interaction surface when playback ends.

pub mod controller;
pub mod watcher;

pub use controller::{PlaybackCommand, PlaybackHandle, PlaybackShared, PlaybackState};
pub use watcher::{CompletionWatcher, PlaybackEvent, POLL_INTERVAL};
