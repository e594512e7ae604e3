//! One-shot conversion with hardcoded inputs: no arguments, no prompts.
//! Synthesizes a fixed passage with a fixed voice and writes the MP3 to an
//! absolute path, then exits. Failures propagate as a non-zero exit.

use echovox_tts::{voices, CancelToken, SynthesisEngine, SynthesisRequest};
use echovox_tts_edge::EdgeEngine;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const SCRIPT: &str = "秋风轻拂过窗棂，带来了几丝凉意，宣告着季节更迭的消息。\
落叶如同一封封信件，从枝头飘落，静静地躺在大地之上，述说着过往的故事。\
天空变得格外高远，云朵也似乎变得轻盈起来，仿佛整个世界都在这一刻放慢了脚步。";

const VOICE_KEY: &str = "5";
const RATE_PCT: i32 = 10;
const VOLUME_PCT: i32 = 10;
const OUTPUT_PATH: &str = "/tmp/echovox/output_once.mp3";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let voice = voices::by_key(VOICE_KEY);
    tracing::info!("Synthesizing {} chars with {}", SCRIPT.chars().count(), voice.id);

    let output = Path::new(OUTPUT_PATH);
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let engine = EdgeEngine::new();
    let request = SynthesisRequest::new(SCRIPT, voice.id, RATE_PCT, VOLUME_PCT, output);
    let outcome = engine
        .synthesize_to_file(&request, &CancelToken::new())
        .await?;

    tracing::info!(
        "Wrote {} bytes to {} in {} attempt(s)",
        outcome.bytes_written,
        OUTPUT_PATH,
        outcome.attempts
    );
    Ok(())
}
