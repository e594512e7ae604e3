//! Error types for TTS functionality

use thiserror::Error;

/// TTS error types
#[derive(Error, Debug)]
pub enum TtsError {
    /// Text was empty after trimming; never reaches the network
    #[error("No text to convert")]
    EmptyText,

    /// Voice not present in the catalog
    #[error("Voice not found: {0}")]
    VoiceNotFound(String),

    /// Failed to reach the synthesis service
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The service accepted the request but synthesis failed
    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    /// The service returned no audio bytes
    #[error("Service returned no audio data")]
    EmptyAudio,

    /// The request was cancelled before its result was committed
    #[error("Synthesis cancelled")]
    Cancelled,

    /// IO error writing the output file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for TTS operations
pub type TtsResult<T> = Result<T, TtsError>;
