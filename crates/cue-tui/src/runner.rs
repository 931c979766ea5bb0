//! TUI runner: sets up the terminal and runs the main loop.
//!
//! Backend requests run in background tokio tasks; their replies come back over a
//! channel and are applied to the document on this loop.

use crate::app::{App, AppState, InputMode};
use crate::event::{is_quit, poll_event, to_key_input, TermEvent};
use crossterm::event::KeyCode;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use cue_core::{CueError, OutlineLine, Prepared, Session};
use cue_provider::Transport;
use ratatui::prelude::*;
use serde_json::Value;
use tokio::sync::mpsc;

use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// A finished backend request.
struct ReplyEvent {
    prepared: Prepared,
    result: Result<Value, String>,
}

/// What the TUI opens on.
pub struct TuiOptions {
    pub title: String,
    pub outline: Vec<OutlineLine>,
    /// Where the page is written back on exit.
    pub save_to: Option<PathBuf>,
}

/// Run the TUI application.
pub async fn run_tui(
    session: Session,
    transport: Arc<dyn Transport>,
    options: TuiOptions,
) -> std::io::Result<()> {
    let mut app = App::new(session, &options.title);
    app.seed_outline(&options.outline)
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let (tx, mut rx) = mpsc::unbounded_channel::<ReplyEvent>();

    // Main loop
    while app.running {
        terminal.draw(|frame| app.render(frame))?;

        // Apply finished requests (non-blocking)
        while let Ok(event) = rx.try_recv() {
            app.apply_reply(&event.prepared, event.result);
        }

        if app.state == AppState::Waiting {
            app.tick();
        }

        match poll_event(Duration::from_millis(80))? {
            TermEvent::Key(key) => {
                if is_quit(&key) {
                    app.running = false;
                    continue;
                }

                let result = match app.input_mode {
                    InputMode::Insert => handle_insert(&mut app, &transport, &tx, to_key_input(&key)),
                    InputMode::Normal => handle_normal(&mut app, key.code),
                };
                if let Err(e) = result {
                    tracing::warn!(error = %e, "command failed");
                    app.state = AppState::Error;
                    app.set_status(format!("Error: {e}"));
                }
            }
            TermEvent::Resize(_, _) => {}
            TermEvent::Tick => {}
        }
    }

    // Cleanup
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    if let Some(path) = &options.save_to {
        std::fs::write(path, app.outline_text())?;
    }
    Ok(())
}

fn handle_normal(app: &mut App, code: KeyCode) -> Result<(), CueError> {
    match code {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Char('k') | KeyCode::Up => app.move_selection(-1),
        KeyCode::Char('j') | KeyCode::Down => app.move_selection(1),
        KeyCode::Char('i') | KeyCode::Enter => app.begin_edit()?,
        KeyCode::Char('o') => app.open_below()?,
        _ => {}
    }
    Ok(())
}

fn handle_insert(
    app: &mut App,
    transport: &Arc<dyn Transport>,
    tx: &mpsc::UnboundedSender<ReplyEvent>,
    input: cue_core::KeyInput,
) -> Result<(), CueError> {
    let Some(selection) = app.insert_key(input)? else {
        return Ok(());
    };
    let Some(prepared) = app.commit(&selection)? else {
        return Ok(());
    };
    let Some(request) = prepared.request.clone() else {
        return Ok(());
    };

    let transport = transport.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = transport.post(request).await.map_err(|e| e.to_string());
        let _ = tx.send(ReplyEvent { prepared, result });
    });
    Ok(())
}
