use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use echovox_foundation::PlaybackError;
use rodio::{Decoder, OutputStream, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How long the playback thread waits for a command before checking whether
/// the sink has drained.
const COMMAND_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PlaybackState {
    Stopped = 0,
    Playing = 1,
    Paused = 2,
}

impl PlaybackState {
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => PlaybackState::Playing,
            2 => PlaybackState::Paused,
            _ => PlaybackState::Stopped,
        }
    }
}

/// State shared between the playback thread, the interaction surface, and
/// the completion watcher. Only the playback thread writes it.
pub struct PlaybackShared {
    state: AtomicU8,
}

impl PlaybackShared {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(PlaybackState::Stopped as u8),
        }
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn set_state(&self, state: PlaybackState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }
}

impl Default for PlaybackShared {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub enum PlaybackCommand {
    /// Bind a source file without starting playback
    Load(PathBuf),
    Play,
    Pause,
    Stop,
    SetVolume(f32),
    Shutdown,
}

/// Handle to the dedicated playback thread.
pub struct PlaybackHandle {
    cmd_tx: Sender<PlaybackCommand>,
    shared: Arc<PlaybackShared>,
    handle: Option<JoinHandle<()>>,
}

impl PlaybackHandle {
    /// Spawn the `playback-audio` thread and wait for the audio output to
    /// come up. Fails if no output device is available.
    pub fn spawn() -> Result<Self, PlaybackError> {
        let (cmd_tx, cmd_rx) = unbounded();
        let (ready_tx, ready_rx) = bounded::<Result<(), PlaybackError>>(1);
        let shared = Arc::new(PlaybackShared::new());
        let thread_shared = Arc::clone(&shared);

        let handle = thread::Builder::new()
            .name("playback-audio".to_string())
            .spawn(move || run_loop(cmd_rx, thread_shared, ready_tx))?;

        match ready_rx.recv_timeout(Duration::from_secs(5)) {
            Ok(Ok(())) => Ok(Self {
                cmd_tx,
                shared,
                handle: Some(handle),
            }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(PlaybackError::ThreadGone),
        }
    }

    /// Bind `path` as the playback source. The file must already exist;
    /// callers get the error before any command crosses the thread boundary.
    pub fn load(&self, path: &Path) -> Result<(), PlaybackError> {
        if !path.exists() {
            return Err(PlaybackError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        self.send(PlaybackCommand::Load(path.to_path_buf()))
    }

    pub fn play(&self) -> Result<(), PlaybackError> {
        self.send(PlaybackCommand::Play)
    }

    pub fn pause(&self) -> Result<(), PlaybackError> {
        self.send(PlaybackCommand::Pause)
    }

    pub fn stop(&self) -> Result<(), PlaybackError> {
        self.send(PlaybackCommand::Stop)
    }

    pub fn set_volume(&self, volume: f32) -> Result<(), PlaybackError> {
        self.send(PlaybackCommand::SetVolume(volume))
    }

    pub fn state(&self) -> PlaybackState {
        self.shared.state()
    }

    pub fn shared(&self) -> Arc<PlaybackShared> {
        Arc::clone(&self.shared)
    }

    /// Stop playback and join the thread.
    pub fn shutdown(mut self) {
        let _ = self.cmd_tx.send(PlaybackCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn send(&self, cmd: PlaybackCommand) -> Result<(), PlaybackError> {
        self.cmd_tx.send(cmd).map_err(|_| PlaybackError::ThreadGone)
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(PlaybackCommand::Shutdown);
    }
}

fn run_loop(
    cmd_rx: Receiver<PlaybackCommand>,
    shared: Arc<PlaybackShared>,
    ready_tx: Sender<Result<(), PlaybackError>>,
) {
    let (stream, stream_handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            let _ = ready_tx.send(Err(PlaybackError::Stream(e)));
            return;
        }
    };
    let sink = match Sink::try_new(&stream_handle) {
        Ok(sink) => sink,
        Err(e) => {
            let _ = ready_tx.send(Err(PlaybackError::Sink(e)));
            return;
        }
    };
    // The stream must outlive the sink or the device closes.
    let _stream = stream;
    let _ = ready_tx.send(Ok(()));

    loop {
        match cmd_rx.recv_timeout(COMMAND_POLL) {
            Ok(PlaybackCommand::Load(path)) => {
                if let Err(e) = load_source(&sink, &path) {
                    tracing::error!("Failed to load {:?}: {}", path, e);
                    sink.stop();
                }
                shared.set_state(PlaybackState::Stopped);
            }
            Ok(PlaybackCommand::Play) => {
                if sink.empty() {
                    tracing::warn!("Play requested with no loaded source");
                } else if shared.state() != PlaybackState::Playing {
                    sink.play();
                    shared.set_state(PlaybackState::Playing);
                }
            }
            Ok(PlaybackCommand::Pause) => {
                // Idempotent: pausing while paused or stopped is a no-op.
                if shared.state() == PlaybackState::Playing {
                    sink.pause();
                    shared.set_state(PlaybackState::Paused);
                }
            }
            Ok(PlaybackCommand::Stop) => {
                sink.stop();
                shared.set_state(PlaybackState::Stopped);
            }
            Ok(PlaybackCommand::SetVolume(volume)) => {
                sink.set_volume(volume.clamp(0.0, 2.0));
            }
            Ok(PlaybackCommand::Shutdown) => {
                sink.stop();
                shared.set_state(PlaybackState::Stopped);
                break;
            }
            Err(RecvTimeoutError::Timeout) => {
                // Natural end of media: the sink drained while playing.
                if shared.state() == PlaybackState::Playing && sink.empty() {
                    tracing::debug!("Playback reached end of media");
                    shared.set_state(PlaybackState::Stopped);
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn load_source(sink: &Sink, path: &Path) -> Result<(), PlaybackError> {
    let file = File::open(path)?;
    let source = Decoder::new(BufReader::new(file))?;
    sink.stop();
    sink.pause();
    sink.append(source);
    Ok(())
}
