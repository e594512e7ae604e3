pub mod state;
pub mod tui;

pub use state::{Action, AppEvent, Effect, UiState};
pub use tui::run_tui;
