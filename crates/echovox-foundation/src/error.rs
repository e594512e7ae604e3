use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Playback subsystem error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid phase transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Shutdown requested")]
    ShutdownRequested,

    #[error("Fatal error, cannot recover: {0}")]
    Fatal(String),

    #[error("Transient error, will retry: {0}")]
    Transient(String),
}

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Audio file not found: {path:?}")]
    FileNotFound { path: PathBuf },

    #[error("Audio output unavailable: {0}")]
    Stream(#[from] rodio::StreamError),

    #[error("Sink creation failed: {0}")]
    Sink(#[from] rodio::PlayError),

    #[error("Failed to decode audio file: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),

    #[error("Playback thread is not running")]
    ThreadGone,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub enum RecoveryStrategy {
    Retry { max_attempts: u32, delay: Duration },
    Ignore,
    Fatal,
}

impl AppError {
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self {
            // Conversions are retried inside the engine; at this level the
            // failure is surfaced to the user and the surface returns to idle.
            AppError::Synthesis(_) => RecoveryStrategy::Ignore,
            AppError::Playback(PlaybackError::FileNotFound { .. }) => RecoveryStrategy::Ignore,
            AppError::Playback(PlaybackError::Decode(_)) => RecoveryStrategy::Ignore,
            AppError::Playback(_) => RecoveryStrategy::Fatal,
            AppError::InvalidTransition { .. } => RecoveryStrategy::Ignore,
            AppError::Transient(_) => RecoveryStrategy::Retry {
                max_attempts: 3,
                delay: Duration::from_secs(1),
            },
            AppError::Fatal(_) | AppError::ShutdownRequested | AppError::Config(_) => {
                RecoveryStrategy::Fatal
            }
        }
    }
}
