use super::{page_title, read_outline};
use cue_core::Session;
use cue_provider::HttpTransport;
use cue_tui::TuiOptions;
use std::path::PathBuf;
use std::sync::Arc;

/// Run the interactive outline editor.
pub async fn run(session: Session, outline: Option<PathBuf>, title: &str) -> anyhow::Result<()> {
    let options = match outline {
        Some(path) => TuiOptions {
            title: page_title(&path),
            outline: read_outline(&path)?,
            save_to: Some(path),
        },
        None => TuiOptions {
            title: title.to_string(),
            outline: Vec::new(),
            save_to: None,
        },
    };

    cue_tui::run_tui(session, Arc::new(HttpTransport::new()), options)
        .await
        .map_err(|e| anyhow::anyhow!("TUI error: {e}"))?;

    Ok(())
}
