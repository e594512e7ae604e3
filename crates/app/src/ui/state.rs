//! Interaction-surface state machine.
//!
//! User input is translated into [`Action`]s; dispatching an action mutates
//! [`UiState`] and returns the [`Effect`]s the runtime must execute (spawn a
//! synthesis task, drive the playback thread, read an import file). Worker
//! completions come back as [`AppEvent`]s. Keeping the dispatch table explicit
//! keeps every flag mutation on the UI task and makes the surface testable
//! without a terminal.

use crate::config::AppConfig;
use echovox_foundation::{Phase, PhaseManager};
use echovox_tts::voices::{self, VoiceEntry};
use echovox_tts::{CancelToken, SynthesisOutcome, SynthesisRequest, TtsError};
use std::collections::VecDeque;
use std::path::PathBuf;

const RATE_STEP: i32 = 5;
const VOLUME_STEP: i32 = 5;
const STATUS_LOG_CAP: usize = 50;

/// User intents, keyed by what the user did rather than which key did it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Convert,
    Play,
    Pause,
    Stop,
    ClearText,
    VoiceNext,
    VoicePrev,
    RateUp,
    RateDown,
    VolumeUp,
    VolumeDown,
    InsertChar(char),
    Backspace,
    NewLine,
    BeginImport,
    ImportInput(char),
    ImportBackspace,
    ImportSubmit,
    ImportCancel,
    DismissModal,
    Quit,
}

/// Side effects the runtime executes on behalf of the surface.
#[derive(Debug)]
pub enum Effect {
    StartSynthesis {
        request: SynthesisRequest,
        cancel: CancelToken,
    },
    LoadAndPlay(PathBuf),
    ResumePlayback,
    PausePlayback,
    StopPlayback,
    SetSinkVolume(f32),
    ImportFile(PathBuf),
    Quit,
}

/// Completions delivered back from worker tasks.
#[derive(Debug)]
pub enum AppEvent {
    SynthesisFinished {
        id: u64,
        result: Result<SynthesisOutcome, TtsError>,
    },
    PlaybackFinished,
}

struct ActiveConversion {
    id: u64,
    cancel: CancelToken,
}

pub struct UiState {
    text: String,
    voice_index: usize,
    rate_pct: i32,
    volume_pct: i32,
    output_path: PathBuf,
    phases: PhaseManager,
    busy: bool,
    active: Option<ActiveConversion>,
    modal: Option<String>,
    import_input: Option<String>,
    status_log: VecDeque<String>,
    should_quit: bool,
}

impl UiState {
    pub fn new(config: &AppConfig) -> Self {
        let voice_index = voices::all()
            .iter()
            .position(|v| v.id == config.voice)
            .unwrap_or(0);
        let mut state = Self {
            text: String::new(),
            voice_index,
            rate_pct: config.rate_pct,
            volume_pct: config.volume_pct,
            output_path: config.output_path.clone(),
            phases: PhaseManager::new(),
            busy: false,
            active: None,
            modal: None,
            import_input: None,
            status_log: VecDeque::new(),
            should_quit: false,
        };
        state.log("Ready. Enter text and press Enter to convert.".to_string());
        state
    }

    // ── accessors ──────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phases.current()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn voice(&self) -> &'static VoiceEntry {
        &voices::all()[self.voice_index]
    }

    pub fn rate_pct(&self) -> i32 {
        self.rate_pct
    }

    pub fn volume_pct(&self) -> i32 {
        self.volume_pct
    }

    pub fn modal(&self) -> Option<&str> {
        self.modal.as_deref()
    }

    pub fn import_input(&self) -> Option<&str> {
        self.import_input.as_deref()
    }

    pub fn status_lines(&self) -> impl Iterator<Item = &str> {
        self.status_log.iter().map(String::as_str)
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn set_text(&mut self, text: String) {
        self.text = text;
    }

    pub fn show_warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.modal = Some(message);
    }

    pub fn log(&mut self, message: String) {
        tracing::info!("{}", message);
        self.status_log.push_back(message);
        while self.status_log.len() > STATUS_LOG_CAP {
            self.status_log.pop_front();
        }
    }

    // ── dispatch ───────────────────────────────────────────────────

    /// Run one action through the surface. Overlapping actions are
    /// serialized: anything arriving while a handler is in flight is a no-op.
    pub fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        if self.busy {
            return Vec::new();
        }
        self.busy = true;
        let effects = self.handle(action);
        self.busy = false;
        effects
    }

    fn handle(&mut self, action: Action) -> Vec<Effect> {
        // A modal warning blocks everything until dismissed.
        if self.modal.is_some() {
            return match action {
                Action::DismissModal => {
                    self.modal = None;
                    Vec::new()
                }
                Action::Quit => self.quit(),
                _ => Vec::new(),
            };
        }

        // Import prompt captures all text input while open.
        if self.import_input.is_some() {
            return self.handle_import(action);
        }

        match action {
            Action::Convert => self.convert(),
            Action::Play => self.play(),
            Action::Pause => self.pause(),
            Action::Stop => self.stop(),
            Action::ClearText => {
                if !self.converting() {
                    self.text.clear();
                }
                Vec::new()
            }
            Action::VoiceNext => self.change_voice(1),
            Action::VoicePrev => self.change_voice(-1),
            Action::RateUp => {
                self.rate_pct = (self.rate_pct + RATE_STEP).min(100);
                Vec::new()
            }
            Action::RateDown => {
                self.rate_pct = (self.rate_pct - RATE_STEP).max(-100);
                Vec::new()
            }
            Action::VolumeUp => {
                self.volume_pct = (self.volume_pct + VOLUME_STEP).min(100);
                vec![Effect::SetSinkVolume(sink_gain(self.volume_pct))]
            }
            Action::VolumeDown => {
                self.volume_pct = (self.volume_pct - VOLUME_STEP).max(-100);
                vec![Effect::SetSinkVolume(sink_gain(self.volume_pct))]
            }
            Action::InsertChar(c) => {
                if !self.converting() {
                    self.text.push(c);
                }
                Vec::new()
            }
            Action::NewLine => {
                if !self.converting() {
                    self.text.push('\n');
                }
                Vec::new()
            }
            Action::Backspace => {
                if !self.converting() {
                    self.text.pop();
                }
                Vec::new()
            }
            Action::BeginImport => {
                if !self.converting() {
                    self.import_input = Some(String::new());
                }
                Vec::new()
            }
            Action::DismissModal => Vec::new(),
            Action::Quit => self.quit(),
            Action::ImportInput(_)
            | Action::ImportBackspace
            | Action::ImportSubmit
            | Action::ImportCancel => Vec::new(),
        }
    }

    fn handle_import(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::ImportInput(c) => {
                if let Some(buffer) = self.import_input.as_mut() {
                    buffer.push(c);
                }
                Vec::new()
            }
            Action::ImportBackspace => {
                if let Some(buffer) = self.import_input.as_mut() {
                    buffer.pop();
                }
                Vec::new()
            }
            Action::ImportSubmit => {
                let path = self.import_input.take().unwrap_or_default();
                if path.trim().is_empty() {
                    return Vec::new();
                }
                vec![Effect::ImportFile(PathBuf::from(path.trim()))]
            }
            Action::ImportCancel => {
                self.import_input = None;
                Vec::new()
            }
            Action::Quit => self.quit(),
            _ => Vec::new(),
        }
    }

    // ── user actions ───────────────────────────────────────────────

    fn convert(&mut self) -> Vec<Effect> {
        if self.converting() {
            return Vec::new();
        }

        let text = self.text.trim().to_string();
        if text.is_empty() {
            self.show_warning("Please enter text to convert");
            return Vec::new();
        }

        let mut effects = Vec::new();

        // A new conversion always stops prior playback and cancels any
        // in-flight request before starting.
        if self.in_playback() {
            effects.push(Effect::StopPlayback);
            self.set_phase(Phase::Idle);
        }
        self.cancel_active();

        let request = SynthesisRequest::new(
            text,
            self.voice().id,
            self.rate_pct,
            self.volume_pct,
            self.output_path.clone(),
        );
        let cancel = CancelToken::new();
        self.active = Some(ActiveConversion {
            id: request.id,
            cancel: cancel.clone(),
        });
        self.set_phase(Phase::Converting);
        self.log(format!(
            "Converting with {} (rate {:+}%, volume {:+}%)...",
            self.voice().name,
            self.rate_pct,
            self.volume_pct
        ));
        effects.push(Effect::StartSynthesis { request, cancel });
        effects
    }

    fn play(&mut self) -> Vec<Effect> {
        match self.phase() {
            Phase::Converting | Phase::Playing => Vec::new(),
            Phase::Paused => {
                self.set_phase(Phase::Playing);
                vec![Effect::ResumePlayback]
            }
            Phase::Idle => {
                if !self.output_path.exists() {
                    self.show_warning("Audio file does not exist");
                    return Vec::new();
                }
                self.set_phase(Phase::Playing);
                vec![
                    Effect::SetSinkVolume(sink_gain(self.volume_pct)),
                    Effect::LoadAndPlay(self.output_path.clone()),
                ]
            }
        }
    }

    fn pause(&mut self) -> Vec<Effect> {
        // Idempotent: pausing while paused (or stopped) changes nothing.
        if self.phase() == Phase::Playing {
            self.set_phase(Phase::Paused);
            vec![Effect::PausePlayback]
        } else {
            Vec::new()
        }
    }

    fn stop(&mut self) -> Vec<Effect> {
        if self.in_playback() {
            self.set_phase(Phase::Idle);
            vec![Effect::StopPlayback]
        } else {
            Vec::new()
        }
    }

    fn change_voice(&mut self, step: isize) -> Vec<Effect> {
        let mut effects = Vec::new();

        // Selecting a new voice invalidates whatever is in flight or audible.
        if self.converting() {
            self.cancel_active();
            self.set_phase(Phase::Idle);
        }
        if self.in_playback() {
            effects.push(Effect::StopPlayback);
            self.set_phase(Phase::Idle);
        }

        let count = voices::all().len() as isize;
        let index = self.voice_index as isize + step;
        self.voice_index = index.rem_euclid(count) as usize;
        self.log(format!("Voice: {}", self.voice().name));
        effects
    }

    fn quit(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.converting() {
            self.cancel_active();
            self.set_phase(Phase::Idle);
        }
        if self.in_playback() {
            effects.push(Effect::StopPlayback);
            self.set_phase(Phase::Idle);
        }
        self.should_quit = true;
        effects.push(Effect::Quit);
        effects
    }

    // ── worker completions ─────────────────────────────────────────

    pub fn on_event(&mut self, event: AppEvent) -> Vec<Effect> {
        match event {
            AppEvent::SynthesisFinished { id, result } => self.on_synthesis_finished(id, result),
            AppEvent::PlaybackFinished => {
                // Natural end of media resets the controls; a watcher that
                // exited because of a pause or stop changes nothing.
                if self.phase() == Phase::Playing {
                    self.set_phase(Phase::Idle);
                    self.log("Playback finished".to_string());
                }
                Vec::new()
            }
        }
    }

    fn on_synthesis_finished(
        &mut self,
        id: u64,
        result: Result<SynthesisOutcome, TtsError>,
    ) -> Vec<Effect> {
        // Only the latest request's output is ever played.
        let is_current = self.active.as_ref().is_some_and(|a| a.id == id);
        if !is_current {
            tracing::debug!(id, "Discarding stale synthesis result");
            return Vec::new();
        }
        self.active = None;
        self.set_phase(Phase::Idle);

        match result {
            Ok(outcome) => {
                self.log(format!(
                    "Conversion complete: {} bytes in {} attempt(s)",
                    outcome.bytes_written, outcome.attempts
                ));
                // Auto-play the fresh output.
                self.set_phase(Phase::Playing);
                vec![
                    Effect::SetSinkVolume(sink_gain(self.volume_pct)),
                    Effect::LoadAndPlay(self.output_path.clone()),
                ]
            }
            Err(TtsError::Cancelled) => {
                self.log("Conversion cancelled".to_string());
                Vec::new()
            }
            Err(e) => {
                tracing::error!("Conversion failed: {}", e);
                self.show_warning("Conversion failed, check your network connection and try again");
                Vec::new()
            }
        }
    }

    /// Called by the runtime when a playback effect fails (missing file was
    /// already handled; this covers decode and device errors).
    pub fn on_playback_error(&mut self, message: String) {
        if self.in_playback() {
            self.set_phase(Phase::Idle);
        }
        self.show_warning(format!("Playback failed: {}", message));
    }

    // ── helpers ────────────────────────────────────────────────────

    fn converting(&self) -> bool {
        self.phase() == Phase::Converting
    }

    fn in_playback(&self) -> bool {
        matches!(self.phase(), Phase::Playing | Phase::Paused)
    }

    fn cancel_active(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::info!(id = active.id, "Cancelling in-flight conversion");
            active.cancel.cancel();
        }
    }

    fn set_phase(&mut self, next: Phase) {
        if let Err(e) = self.phases.transition(next) {
            tracing::warn!("{}", e);
        }
    }
}

/// Map the signed service volume percentage onto a local sink gain:
/// -100% mutes, +0% is unity, +100% doubles.
pub fn sink_gain(volume_pct: i32) -> f32 {
    (100 + volume_pct.clamp(-100, 100)) as f32 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_gain_mapping() {
        assert_eq!(sink_gain(0), 1.0);
        assert_eq!(sink_gain(-100), 0.0);
        assert_eq!(sink_gain(100), 2.0);
        assert_eq!(sink_gain(250), 2.0);
    }
}
