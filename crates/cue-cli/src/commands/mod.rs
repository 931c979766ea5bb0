//! Command implementations.

pub mod config;
pub mod edit;
pub mod options;
pub mod run;

use cue_core::{parse_outline, OutlineLine};
use std::path::Path;

/// Read an outline file; a missing file is an empty outline.
pub fn read_outline(path: &Path) -> anyhow::Result<Vec<OutlineLine>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(parse_outline(&text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(anyhow::anyhow!("Failed to read {}: {e}", path.display())),
    }
}

/// Page title for an outline file: its file stem.
pub fn page_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_string())
}
