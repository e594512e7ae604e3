//! Offline tests for the edge engine. Nothing here opens a connection: the
//! request is rejected (or the cancel honored) before any network activity.

#[cfg(test)]
mod tests {
    use crate::EdgeEngine;
    use echovox_foundation::clock::test_clock;
    use echovox_tts::{
        CancelToken, RetryPolicy, SynthesisEngine, SynthesisRequest, TtsError,
    };
    use std::time::Duration;

    #[test]
    fn engine_identity() {
        let engine = EdgeEngine::new();
        assert_eq!(engine.name(), "edge-read-aloud");
        assert_eq!(engine.voices().len(), 13);
    }

    #[tokio::test]
    async fn empty_text_never_reaches_the_network() {
        let engine = EdgeEngine::new();
        let request = SynthesisRequest::new("   ", "zh-CN-XiaoxiaoNeural", 10, 10, "output.mp3");
        let err = engine
            .synthesize_to_file(&request, &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TtsError::EmptyText));
    }

    #[tokio::test]
    async fn unknown_voice_is_rejected_up_front() {
        let engine = EdgeEngine::new();
        let request = SynthesisRequest::new("hello", "fr-FR-DeniseNeural", 0, 0, "output.mp3");
        let err = engine
            .synthesize_to_file(&request, &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TtsError::VoiceNotFound(_)));
    }

    #[tokio::test]
    async fn pre_cancelled_request_is_dropped_before_connect() {
        let clock = test_clock();
        let engine = EdgeEngine::with_policy(
            RetryPolicy {
                max_attempts: 1,
                pause: Duration::from_secs(1),
            },
            clock,
        );
        let cancel = CancelToken::new();
        cancel.cancel();
        let request = SynthesisRequest::new("hello", "zh-CN-XiaoxiaoNeural", 10, 70, "output.mp3");
        let err = engine
            .synthesize_to_file(&request, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, TtsError::Cancelled));
    }
}
