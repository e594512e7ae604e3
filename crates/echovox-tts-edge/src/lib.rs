//! Edge read-aloud synthesis engine for EchoVox
//!
//! Wraps the `msedge-tts` synchronous client. The client performs a blocking
//! websocket exchange, so every conversion runs on a `spawn_blocking` worker
//! with a fresh connection; the interactive task only awaits the join handle.

use async_trait::async_trait;
use echovox_foundation::clock::{real_clock, Clock};
use echovox_tts::voices;
use echovox_tts::{
    CancelToken, RetryPolicy, SynthesisEngine, SynthesisOutcome, SynthesisRequest, TtsError,
    TtsResult, VoiceEntry,
};
use msedge_tts::tts::client::connect;
use msedge_tts::tts::SpeechConfig;
use std::sync::Arc;
use tracing::{debug, warn};

mod tests;

/// Streaming MP3 format the playback side decodes directly.
const AUDIO_FORMAT: &str = "audio-24khz-48kbitrate-mono-mp3";

pub struct EdgeEngine {
    retry: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl EdgeEngine {
    pub fn new() -> Self {
        Self {
            retry: RetryPolicy::default(),
            clock: real_clock(),
        }
    }

    pub fn with_policy(retry: RetryPolicy, clock: Arc<dyn Clock>) -> Self {
        Self { retry, clock }
    }

    fn speech_config(request: &SynthesisRequest) -> SpeechConfig {
        SpeechConfig {
            voice_name: request.voice_id.clone(),
            audio_format: AUDIO_FORMAT.to_string(),
            pitch: 0,
            rate: request.rate_pct,
            volume: request.volume_pct,
        }
    }

    /// One connect-and-synthesize round trip. Blocking.
    fn synthesize_once(text: &str, config: &SpeechConfig) -> TtsResult<Vec<u8>> {
        let mut client =
            connect().map_err(|e| TtsError::Connect(e.to_string()))?;
        let audio = client
            .synthesize(text, config)
            .map_err(|e| TtsError::Synthesis(e.to_string()))?;
        if audio.audio_bytes.is_empty() {
            return Err(TtsError::EmptyAudio);
        }
        Ok(audio.audio_bytes)
    }
}

impl Default for EdgeEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SynthesisEngine for EdgeEngine {
    fn name(&self) -> &str {
        "edge-read-aloud"
    }

    fn voices(&self) -> &'static [VoiceEntry] {
        voices::all()
    }

    async fn synthesize_to_file(
        &self,
        request: &SynthesisRequest,
        cancel: &CancelToken,
    ) -> TtsResult<SynthesisOutcome> {
        request.validate()?;
        if cancel.is_cancelled() {
            return Err(TtsError::Cancelled);
        }

        let synthesis_id = request.id;
        let text = request.text.clone();
        let config = Self::speech_config(request);
        let output_path = request.output_path.clone();
        let retry = self.retry;
        let clock = Arc::clone(&self.clock);
        let token = cancel.clone();

        debug!(
            synthesis_id,
            voice = %request.voice_id,
            rate = request.rate_pct,
            volume = request.volume_pct,
            "Starting edge synthesis"
        );

        let outcome = tokio::task::spawn_blocking(move || -> TtsResult<SynthesisOutcome> {
            let mut attempt = 0u32;
            loop {
                attempt += 1;
                match Self::synthesize_once(&text, &config) {
                    Ok(bytes) => {
                        // A cancelled request must not overwrite the output
                        // file, even when the service call already finished.
                        if token.is_cancelled() {
                            return Err(TtsError::Cancelled);
                        }
                        std::fs::write(&output_path, &bytes)?;
                        return Ok(SynthesisOutcome {
                            synthesis_id,
                            bytes_written: bytes.len() as u64,
                            attempts: attempt,
                        });
                    }
                    Err(TtsError::Cancelled) => return Err(TtsError::Cancelled),
                    Err(e) if attempt < retry.max_attempts => {
                        warn!(
                            synthesis_id,
                            "Synthesis attempt {}/{} failed: {}", attempt, retry.max_attempts, e
                        );
                        if token.is_cancelled() {
                            return Err(TtsError::Cancelled);
                        }
                        clock.sleep(retry.pause);
                    }
                    Err(e) => return Err(e),
                }
            }
        })
        .await
        .map_err(|e| TtsError::Synthesis(format!("synthesis worker failed: {e}")))??;

        if cancel.is_cancelled() {
            return Err(TtsError::Cancelled);
        }

        debug!(
            synthesis_id,
            bytes = outcome.bytes_written,
            attempts = outcome.attempts,
            "Edge synthesis complete"
        );
        Ok(outcome)
    }
}
