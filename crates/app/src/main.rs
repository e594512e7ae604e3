use anyhow::Context;
use clap::Parser;
use echovox_app::config::AppConfig;
use echovox_app::ui::run_tui;
use echovox_foundation::ShutdownHandler;
use echovox_playback::PlaybackHandle;
use echovox_tts::SynthesisEngine;
use echovox_tts_edge::EdgeEngine;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "echovox",
    about = "Convert text to speech with Edge read-aloud voices"
)]
struct Cli {
    /// Config file (TOML); defaults to ./echovox.toml when present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the output audio file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Override the startup voice id
    #[arg(long)]
    voice: Option<String>,
}

fn init_logging(log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "echovox.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // The TUI owns the terminal; logs go to the rolling file only.
    tracing_subscriber::fmt()
        .with_writer(non_blocking_file)
        .with_env_filter(filter)
        .with_ansi(false)
        .init();
    Ok(guard)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_path(path),
        None => AppConfig::new(),
    }
    .map_err(|e| anyhow::anyhow!(e))?;

    if let Some(output) = cli.output {
        config.output_path = output;
    }
    if let Some(voice) = cli.voice {
        config.voice = voice;
    }
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let _guard = init_logging(&config.log_dir)?;
    tracing::info!("Starting EchoVox");

    let playback = PlaybackHandle::spawn().context("audio output unavailable")?;
    let engine: Arc<dyn SynthesisEngine> = Arc::new(EdgeEngine::new());
    let shutdown = ShutdownHandler::new().install().await;

    run_tui(config, engine, playback, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
