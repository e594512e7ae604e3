use crate::error::AppError;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Interaction phase of the application surface.
///
/// The surface is always in exactly one phase; every user action is judged
/// against the current phase before any side effect runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Converting,
    Playing,
    Paused,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Converting => "converting",
            Phase::Playing => "playing",
            Phase::Paused => "paused",
        };
        f.write_str(name)
    }
}

pub struct PhaseManager {
    phase: Arc<RwLock<Phase>>,
    phase_tx: Sender<Phase>,
    phase_rx: Receiver<Phase>,
}

impl PhaseManager {
    pub fn new() -> Self {
        let (phase_tx, phase_rx) = crossbeam_channel::unbounded();
        Self {
            phase: Arc::new(RwLock::new(Phase::Idle)),
            phase_tx,
            phase_rx,
        }
    }

    pub fn transition(&self, next: Phase) -> Result<(), AppError> {
        let mut current = self.phase.write();

        let valid = matches!(
            (*current, next),
            (Phase::Idle, Phase::Converting)
                | (Phase::Converting, Phase::Idle)
                | (Phase::Idle, Phase::Playing)
                | (Phase::Playing, Phase::Paused)
                | (Phase::Paused, Phase::Playing)
                | (Phase::Playing, Phase::Idle)
                | (Phase::Paused, Phase::Idle)
        );

        if !valid {
            return Err(AppError::InvalidTransition {
                from: current.to_string(),
                to: next.to_string(),
            });
        }

        tracing::debug!("Phase transition: {} -> {}", *current, next);
        *current = next;
        let _ = self.phase_tx.send(next);
        Ok(())
    }

    pub fn current(&self) -> Phase {
        *self.phase.read()
    }

    pub fn subscribe(&self) -> Receiver<Phase> {
        self.phase_rx.clone()
    }
}

impl Default for PhaseManager {
    fn default() -> Self {
        Self::new()
    }
}
