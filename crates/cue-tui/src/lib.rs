//! cue-tui: terminal outline editor hosting the cue menu.

pub mod app;
pub mod event;
pub mod runner;

pub use app::{App, AppState, BlockEditor, InputMode, Row};
pub use runner::{run_tui, TuiOptions};
