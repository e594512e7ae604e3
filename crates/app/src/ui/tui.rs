//! Terminal surface for EchoVox
//!
//! Owns the terminal lifecycle and the event loop: crossterm key events are
//! translated into [`Action`]s, worker completions arrive over channels, and
//! the effects returned by the state machine are executed here (synthesis
//! tasks, playback commands, the completion watcher).

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::{read_text_file, AppConfig};
use crate::ui::state::{Action, AppEvent, Effect, UiState};
use echovox_foundation::{Phase, ShutdownGuard};
use echovox_playback::{CompletionWatcher, PlaybackEvent, PlaybackHandle};
use echovox_tts::SynthesisEngine;

/// Worker handles and channels the effect executor drives.
struct Runtime {
    engine: Arc<dyn SynthesisEngine>,
    playback: PlaybackHandle,
    synth_tx: mpsc::Sender<AppEvent>,
    playback_tx: mpsc::Sender<PlaybackEvent>,
    watcher: Option<CompletionWatcher>,
}

impl Runtime {
    fn shutdown(mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
        self.playback.shutdown();
    }
}

/// Run the interactive surface until the user quits or shutdown is requested.
pub async fn run_tui(
    config: AppConfig,
    engine: Arc<dyn SynthesisEngine>,
    playback: PlaybackHandle,
    shutdown: ShutdownGuard,
) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (synth_tx, synth_rx) = mpsc::channel::<AppEvent>(100);
    let (playback_tx, playback_rx) = mpsc::channel::<PlaybackEvent>(16);

    let mut state = UiState::new(&config);
    let mut runtime = Runtime {
        engine,
        playback,
        synth_tx,
        playback_tx,
        watcher: None,
    };

    let res = run_app(
        &mut terminal,
        &mut state,
        &mut runtime,
        synth_rx,
        playback_rx,
        shutdown,
    )
    .await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    runtime.shutdown();

    if let Err(err) = res {
        eprintln!("TUI Error: {}", err);
    }
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut UiState,
    runtime: &mut Runtime,
    mut synth_rx: mpsc::Receiver<AppEvent>,
    mut playback_rx: mpsc::Receiver<PlaybackEvent>,
    shutdown: ShutdownGuard,
) -> io::Result<()> {
    let mut ui_update_interval = tokio::time::interval(Duration::from_millis(50));

    loop {
        terminal.draw(|f| draw_ui(f, state))?;

        tokio::select! {
            Some(event) = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    event::read().ok()
                } else {
                    None
                }
            } => {
                if let Event::Key(key) = event {
                    if key.kind == KeyEventKind::Press {
                        if let Some(action) = translate_key(key, state) {
                            let effects = state.dispatch(action);
                            execute_effects(state, runtime, effects);
                        }
                    }
                }
            }

            Some(event) = synth_rx.recv() => {
                let effects = state.on_event(event);
                execute_effects(state, runtime, effects);
            }

            Some(PlaybackEvent::Finished) = playback_rx.recv() => {
                let effects = state.on_event(AppEvent::PlaybackFinished);
                execute_effects(state, runtime, effects);
            }

            _ = shutdown.wait() => {
                let effects = state.dispatch(Action::Quit);
                execute_effects(state, runtime, effects);
            }

            _ = ui_update_interval.tick() => {}
        }

        if state.should_quit() {
            return Ok(());
        }
    }
}

fn translate_key(key: KeyEvent, state: &UiState) -> Option<Action> {
    if state.modal().is_some() {
        return match key.code {
            KeyCode::Enter | KeyCode::Esc => Some(Action::DismissModal),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::Quit)
            }
            _ => None,
        };
    }

    if state.import_input().is_some() {
        return match key.code {
            KeyCode::Enter => Some(Action::ImportSubmit),
            KeyCode::Esc => Some(Action::ImportCancel),
            KeyCode::Backspace => Some(Action::ImportBackspace),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::ImportInput(c))
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::Quit)
            }
            _ => None,
        };
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => Some(Action::Quit),
        KeyCode::Char('p') if ctrl => Some(Action::Play),
        KeyCode::Char('a') if ctrl => Some(Action::Pause),
        KeyCode::Char('t') if ctrl => Some(Action::Stop),
        KeyCode::Char('l') if ctrl => Some(Action::ClearText),
        KeyCode::Char('o') if ctrl => Some(Action::BeginImport),
        KeyCode::Tab => Some(Action::VoiceNext),
        KeyCode::BackTab => Some(Action::VoicePrev),
        KeyCode::Right if ctrl => Some(Action::RateUp),
        KeyCode::Left if ctrl => Some(Action::RateDown),
        KeyCode::Up if ctrl => Some(Action::VolumeUp),
        KeyCode::Down if ctrl => Some(Action::VolumeDown),
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => Some(Action::NewLine),
        KeyCode::Enter => Some(Action::Convert),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Char(c) if !ctrl => Some(Action::InsertChar(c)),
        _ => None,
    }
}

fn execute_effects(state: &mut UiState, runtime: &mut Runtime, effects: Vec<Effect>) {
    for effect in effects {
        match effect {
            Effect::StartSynthesis { request, cancel } => {
                let engine = Arc::clone(&runtime.engine);
                let tx = runtime.synth_tx.clone();
                tokio::spawn(async move {
                    let id = request.id;
                    let result = engine.synthesize_to_file(&request, &cancel).await;
                    let _ = tx.send(AppEvent::SynthesisFinished { id, result }).await;
                });
            }
            Effect::LoadAndPlay(path) => {
                if let Some(watcher) = runtime.watcher.take() {
                    watcher.abort();
                }
                match runtime
                    .playback
                    .load(&path)
                    .and_then(|_| runtime.playback.play())
                {
                    Ok(()) => {
                        runtime.watcher = Some(CompletionWatcher::spawn(
                            runtime.playback.shared(),
                            runtime.playback_tx.clone(),
                        ));
                    }
                    Err(e) => state.on_playback_error(e.to_string()),
                }
            }
            Effect::ResumePlayback => match runtime.playback.play() {
                Ok(()) => {
                    // The previous watcher exited when playback left the
                    // playing state; resuming needs a fresh one.
                    if let Some(watcher) = runtime.watcher.take() {
                        watcher.abort();
                    }
                    runtime.watcher = Some(CompletionWatcher::spawn(
                        runtime.playback.shared(),
                        runtime.playback_tx.clone(),
                    ));
                }
                Err(e) => state.on_playback_error(e.to_string()),
            },
            Effect::PausePlayback => {
                if let Err(e) = runtime.playback.pause() {
                    state.on_playback_error(e.to_string());
                }
            }
            Effect::StopPlayback => {
                if let Some(watcher) = runtime.watcher.take() {
                    watcher.abort();
                }
                if let Err(e) = runtime.playback.stop() {
                    tracing::error!("Failed to stop playback: {}", e);
                }
            }
            Effect::SetSinkVolume(gain) => {
                if let Err(e) = runtime.playback.set_volume(gain) {
                    tracing::error!("Failed to set volume: {}", e);
                }
            }
            Effect::ImportFile(path) => match read_text_file(&path) {
                Ok(text) => {
                    state.set_text(text);
                    state.log(format!("Imported {}", path.display()));
                }
                Err(e) => state.show_warning(e.to_string()),
            },
            Effect::Quit => {}
        }
    }
}

// ── drawing ────────────────────────────────────────────────────────

fn draw_ui(f: &mut Frame, state: &UiState) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_text_area(f, main_chunks[0], state);
    draw_controls(f, main_chunks[1], state);
    draw_status(f, main_chunks[2], state);
    draw_footer(f, main_chunks[3]);

    if let Some(path) = state.import_input() {
        draw_import_prompt(f, path);
    }
    if let Some(message) = state.modal() {
        draw_modal(f, message);
    }
}

fn draw_text_area(f: &mut Frame, area: Rect, state: &UiState) {
    let editing_locked = state.phase() == Phase::Converting;
    let title = if editing_locked {
        "Text (locked while converting)"
    } else {
        "Text"
    };

    let body = if state.text().is_empty() {
        Paragraph::new("Enter the text to convert...")
            .style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(state.text()).style(if editing_locked {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        })
    };

    f.render_widget(
        body.block(Block::default().title(title).borders(Borders::ALL))
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_controls(f: &mut Frame, area: Rect, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(area);

    let voice = Paragraph::new(Line::from(vec![
        Span::styled("Voice ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(state.voice().name),
        Span::styled(
            format!("  [{}]", state.voice().id),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .block(Block::default().title("Tab to change").borders(Borders::ALL));
    f.render_widget(voice, chunks[0]);

    let rate = Gauge::default()
        .block(Block::default().title("Rate").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Cyan))
        .percent(signed_pct_ratio(state.rate_pct()))
        .label(format!("{:+}%", state.rate_pct()));
    f.render_widget(rate, chunks[1]);

    let volume = Gauge::default()
        .block(Block::default().title("Volume").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(signed_pct_ratio(state.volume_pct()))
        .label(format!("{:+}%", state.volume_pct()));
    f.render_widget(volume, chunks[2]);
}

fn draw_status(f: &mut Frame, area: Rect, state: &UiState) {
    let phase_span = match state.phase() {
        Phase::Idle => Span::styled("IDLE", Style::default().fg(Color::Gray)),
        Phase::Converting => Span::styled(
            "CONVERTING",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Phase::Playing => Span::styled(
            "PLAYING",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Phase::Paused => Span::styled("PAUSED", Style::default().fg(Color::Yellow)),
    };

    let mut lines = vec![Line::from(vec![Span::raw("State: "), phase_span])];
    // Most recent messages, newest last, as many as fit.
    let visible = area.height.saturating_sub(3) as usize;
    let recent: Vec<&str> = state.status_lines().collect();
    let start = recent.len().saturating_sub(visible);
    for message in &recent[start..] {
        lines.push(Line::from(Span::styled(
            *message,
            Style::default().fg(Color::DarkGray),
        )));
    }

    let status = Paragraph::new(lines)
        .block(Block::default().title("Status").borders(Borders::ALL));
    f.render_widget(status, area);
}

fn draw_footer(f: &mut Frame, area: Rect) {
    let footer = Paragraph::new(
        "Enter convert | ^P play | ^A pause | ^T stop | Tab voice | ^←/^→ rate | ^↑/^↓ volume | ^O import | ^L clear | ^Q quit",
    )
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_modal(f: &mut Frame, message: &str) {
    let area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, area);
    let popup = Paragraph::new(vec![
        Line::from(message),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to dismiss",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title("Warning")
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::Red)),
    );
    f.render_widget(popup, area);
}

fn draw_import_prompt(f: &mut Frame, path: &str) {
    let area = centered_rect(60, 15, f.area());
    f.render_widget(Clear, area);
    let popup = Paragraph::new(vec![
        Line::from("Path to a UTF-8 text file:"),
        Line::from(Span::styled(
            format!("{}_", path),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Enter to import, Esc to cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(Block::default().title("Import").borders(Borders::ALL));
    f.render_widget(popup, area);
}

/// Map a signed -100..100 percentage onto a 0..100 gauge.
fn signed_pct_ratio(pct: i32) -> u16 {
    ((pct.clamp(-100, 100) + 100) / 2) as u16
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
