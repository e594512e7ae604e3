//! Core types for text-to-speech synthesis

use crate::error::{TtsError, TtsResult};
use crate::next_synthesis_id;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// One conversion request, created per convert action and discarded after
/// the call returns.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// Unique id; a stale completion is identified by comparing ids
    pub id: u64,
    pub text: String,
    pub voice_id: String,
    /// Speaking-rate adjustment relative to the voice default, percent
    pub rate_pct: i32,
    /// Loudness adjustment relative to the voice default, percent
    pub volume_pct: i32,
    /// Destination file, overwritten on every conversion
    pub output_path: PathBuf,
}

impl SynthesisRequest {
    pub fn new(
        text: impl Into<String>,
        voice_id: impl Into<String>,
        rate_pct: i32,
        volume_pct: i32,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: next_synthesis_id(),
            text: text.into(),
            voice_id: voice_id.into(),
            rate_pct,
            volume_pct,
            output_path: output_path.into(),
        }
    }

    /// Validate the request before any network activity.
    pub fn validate(&self) -> TtsResult<()> {
        if self.text.trim().is_empty() {
            return Err(TtsError::EmptyText);
        }
        if crate::voices::by_id(&self.voice_id).is_none() {
            return Err(TtsError::VoiceNotFound(self.voice_id.clone()));
        }
        Ok(())
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisOutcome {
    pub synthesis_id: u64,
    pub bytes_written: u64,
    /// Number of attempts the engine needed, 1 for a first-try success
    pub attempts: u32,
}

/// Bounded retry for transient service failures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            pause: Duration::from_secs(1),
        }
    }
}

/// Render a signed percentage the way the service expects it: always with an
/// explicit sign, e.g. `+10%`, `-25%`, `+0%`.
pub fn format_signed_pct(value: i32) -> String {
    format!("{:+}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_pct_rendering() {
        assert_eq!(format_signed_pct(10), "+10%");
        assert_eq!(format_signed_pct(-25), "-25%");
        assert_eq!(format_signed_pct(0), "+0%");
        assert_eq!(format_signed_pct(100), "+100%");
    }

    #[test]
    fn request_ids_are_unique_and_increasing() {
        let a = SynthesisRequest::new("a", "zh-CN-XiaoxiaoNeural", 0, 0, "out.mp3");
        let b = SynthesisRequest::new("b", "zh-CN-XiaoxiaoNeural", 0, 0, "out.mp3");
        assert!(b.id > a.id);
    }

    #[test]
    fn whitespace_only_text_is_rejected() {
        let req = SynthesisRequest::new("  \n\t ", "zh-CN-XiaoxiaoNeural", 0, 0, "out.mp3");
        assert!(matches!(req.validate(), Err(TtsError::EmptyText)));
    }

    #[test]
    fn unknown_voice_is_rejected() {
        let req = SynthesisRequest::new("hello", "en-US-GuyNeural", 0, 0, "out.mp3");
        assert!(matches!(req.validate(), Err(TtsError::VoiceNotFound(_))));
    }

    #[test]
    fn valid_request_passes() {
        let req = SynthesisRequest::new("hello", "zh-CN-XiaoxiaoNeural", 10, 70, "out.mp3");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn retry_policy_default_matches_service_guidance() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.pause, Duration::from_secs(1));
    }
}
