use config::{Config, Environment, File};
use echovox_tts::voices;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Runtime configuration for the interactive surface.
///
/// Loaded from an optional `echovox.toml`, overridden by `ECHOVOX__*`
/// environment variables, then by CLI flags.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Provider voice id to select at startup
    pub voice: String,
    /// Initial speaking-rate adjustment, signed percent
    pub rate_pct: i32,
    /// Initial loudness adjustment, signed percent
    pub volume_pct: i32,
    /// Conversion output file, overwritten on every conversion
    pub output_path: PathBuf,
    /// Directory for the rolling log file
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            voice: voices::default_voice().id.to_string(),
            rate_pct: 10,
            volume_pct: 10,
            output_path: PathBuf::from("output.mp3"),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl AppConfig {
    pub fn new() -> Result<Self, String> {
        let config_path = Path::new("echovox.toml");
        if config_path.exists() {
            tracing::info!("Loading configuration from: {}", config_path.display());
            Self::from_path(config_path)
        } else {
            Self::build(None)
        }
    }

    /// Load settings from a specific config file path (also used by tests)
    pub fn from_path(config_path: impl AsRef<Path>) -> Result<Self, String> {
        Self::build(Some(config_path.as_ref()))
    }

    fn build(config_path: Option<&Path>) -> Result<Self, String> {
        let defaults = AppConfig::default();

        let mut builder = Config::builder();
        builder = builder
            .set_default("voice", defaults.voice.clone())
            .unwrap()
            .set_default("rate_pct", defaults.rate_pct as i64)
            .unwrap()
            .set_default("volume_pct", defaults.volume_pct as i64)
            .unwrap()
            .set_default("output_path", defaults.output_path.display().to_string())
            .unwrap()
            .set_default("log_dir", defaults.log_dir.display().to_string())
            .unwrap();

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // Environment variables override the file's settings.
        builder = builder.add_source(Environment::with_prefix("ECHOVOX").separator("__"));

        let config = builder
            .build()
            .map_err(|e| format!("Failed to build config: {}", e))?;

        let mut settings: AppConfig = config
            .try_deserialize()
            .map_err(|e| format!("Failed to deserialize settings: {}", e))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&mut self) -> Result<(), String> {
        if voices::by_id(&self.voice).is_none() {
            tracing::warn!(
                "Unknown voice id '{}'. Defaulting to '{}'.",
                self.voice,
                voices::default_voice().id
            );
            self.voice = voices::default_voice().id.to_string();
        }

        if !(-100..=100).contains(&self.rate_pct) {
            tracing::warn!("Rate {}% out of range. Clamping.", self.rate_pct);
            self.rate_pct = self.rate_pct.clamp(-100, 100);
        }
        if !(-100..=100).contains(&self.volume_pct) {
            tracing::warn!("Volume {}% out of range. Clamping.", self.volume_pct);
            self.volume_pct = self.volume_pct.clamp(-100, 100);
        }

        if self.output_path.as_os_str().is_empty() {
            return Err("output_path must not be empty".to_string());
        }

        Ok(())
    }
}

/// Read a text file for import into the text area. The file must be valid
/// UTF-8; anything else is rejected without touching the current text.
pub fn read_text_file(path: &Path) -> anyhow::Result<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", path.display(), e))?;
    String::from_utf8(bytes)
        .map_err(|_| anyhow::anyhow!("{} is not valid UTF-8 text", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.voice, "zh-CN-XiaoxiaoNeural");
        assert_eq!(config.rate_pct, 10);
        assert_eq!(config.volume_pct, 10);
    }

    #[test]
    fn unknown_voice_falls_back_to_default() {
        let mut config = AppConfig {
            voice: "en-GB-SoniaNeural".to_string(),
            ..AppConfig::default()
        };
        config.validate().unwrap();
        assert_eq!(config.voice, voices::default_voice().id);
    }

    #[test]
    fn out_of_range_percentages_are_clamped() {
        let mut config = AppConfig {
            rate_pct: 250,
            volume_pct: -300,
            ..AppConfig::default()
        };
        config.validate().unwrap();
        assert_eq!(config.rate_pct, 100);
        assert_eq!(config.volume_pct, -100);
    }

    #[test]
    fn config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("echovox.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "voice = \"zh-TW-YunJheNeural\"").unwrap();
        writeln!(file, "rate_pct = -20").unwrap();
        drop(file);

        let settings = AppConfig::from_path(&path).unwrap();
        assert_eq!(settings.voice, "zh-TW-YunJheNeural");
        assert_eq!(settings.rate_pct, -20);
        // Untouched fields keep their defaults.
        assert_eq!(settings.volume_pct, 10);
    }

    #[test]
    fn import_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.txt");
        std::fs::write(&path, [0xffu8, 0xfe, 0x80, 0x81]).unwrap();
        assert!(read_text_file(&path).is_err());
    }

    #[test]
    fn import_reads_utf8_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.txt");
        std::fs::write(&path, "秋风轻拂过窗棂\nsecond line").unwrap();
        let text = read_text_file(&path).unwrap();
        assert!(text.starts_with("秋风"));
        assert!(text.contains("second line"));
    }

    #[test]
    fn missing_import_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_text_file(&dir.path().join("absent.txt")).is_err());
    }
}
