//! cue: a trigger-driven generation menu for outline notes.
//!
//! Type the trigger in a block to open the menu, pick an option and model, and the
//! reply is written back into the outline.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use cue_core::{Session, SettingsStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(
                "cue_core=debug,cue_provider=debug,cue_doc=debug,cue_tui=debug,cue=debug",
            ))
            .with_writer(std::io::stderr)
            .init();
    }

    let store = match &cli.config {
        Some(path) => SettingsStore::with_path(path),
        None => SettingsStore::new(),
    };

    match cli.command {
        Some(Commands::Config { action }) => commands::config::run(&store, action)?,
        None => {
            let session = open_session(&store, cli.trigger.as_deref())?;
            commands::edit::run(session, None, "Scratch").await?
        }
        Some(Commands::Edit { outline, title }) => {
            let session = open_session(&store, cli.trigger.as_deref())?;
            commands::edit::run(session, outline, &title).await?
        }
        Some(Commands::Run {
            outline,
            option,
            line,
            model,
            dry_run,
            write,
        }) => {
            let session = open_session(&store, cli.trigger.as_deref())?;
            let opts = commands::run::RunOptions {
                option,
                line,
                model,
                dry_run,
                write,
            };
            commands::run::run(session, &outline, opts).await?;
        }
        Some(Commands::Options) => {
            let session = open_session(&store, cli.trigger.as_deref())?;
            commands::options::run(&session);
        }
    }

    Ok(())
}

/// Load settings, falling back to `OPENAI_API_KEY` for the key.
fn open_session(store: &SettingsStore, trigger: Option<&str>) -> anyhow::Result<Session> {
    let mut settings = store.load().with_env_api_key();
    if let Some(trigger) = trigger {
        settings.set_trigger(trigger);
    }
    Ok(Session::new(settings)?)
}
