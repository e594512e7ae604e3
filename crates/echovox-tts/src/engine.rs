//! Synthesis engine abstraction and cooperative cancellation

use crate::error::TtsResult;
use crate::types::{SynthesisOutcome, SynthesisRequest};
use crate::voices::VoiceEntry;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between the interaction surface and
/// an in-flight conversion.
///
/// Cancellation is best-effort: a blocking service call that has already
/// started may run to completion, but its result is discarded (and the
/// output file left untouched) when the flag is set.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Core synthesis engine interface.
///
/// Implementations talk to a specific provider and write the resulting audio
/// to the request's output path.
#[async_trait]
pub trait SynthesisEngine: Send + Sync {
    /// Engine name/identifier
    fn name(&self) -> &str;

    /// Voices this engine can synthesize with
    fn voices(&self) -> &'static [VoiceEntry];

    /// Convert the request's text to audio and write it to
    /// `request.output_path`, overwriting any existing file.
    ///
    /// Must validate the request before any network activity and honor the
    /// cancel token both before starting and before committing the result.
    async fn synthesize_to_file(
        &self,
        request: &SynthesisRequest,
        cancel: &CancelToken,
    ) -> TtsResult<SynthesisOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_token_starts_clear() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
