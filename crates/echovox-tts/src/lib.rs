//! Text-to-speech abstraction layer for EchoVox
//!
//! This crate provides the foundational types and traits for cloud
//! text-to-speech synthesis: the voice catalog, synthesis requests and
//! outcomes, the engine trait, and cooperative cancellation.

use std::sync::atomic::{AtomicU64, Ordering};

pub mod engine;
pub mod error;
pub mod types;
pub mod voices;

pub use engine::{CancelToken, SynthesisEngine};
pub use error::{TtsError, TtsResult};
pub use types::{RetryPolicy, SynthesisOutcome, SynthesisRequest};
pub use voices::{VoiceEntry, VoiceGender};

/// Generates unique synthesis IDs
static SYNTHESIS_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a unique synthesis ID
pub fn next_synthesis_id() -> u64 {
    SYNTHESIS_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}
