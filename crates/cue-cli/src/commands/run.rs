//! Single-shot `run` command.

use super::{page_title, read_outline};
use cue_core::{
    builtin_options, seed_outline, write_outline, Detection, FieldId, Selection, Session,
};
use cue_doc::{DocumentStore, MemoryDocument, NodeId};
use cue_provider::HttpTransport;
use std::path::Path;

/// `cue run` arguments.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub option: String,
    pub line: Option<usize>,
    pub model: Option<String>,
    pub dry_run: bool,
    pub write: bool,
}

/// Run one option against a block of `path` and print the resulting outline.
pub async fn run(mut session: Session, path: &Path, opts: RunOptions) -> anyhow::Result<()> {
    let lines = read_outline(path)?;
    if lines.is_empty() {
        anyhow::bail!("{} has no blocks", path.display());
    }

    let mut doc = MemoryDocument::new();
    let page = doc.add_page(page_title(path));
    let ids = seed_outline(&mut doc, &page, &lines)?;

    let index = opts.line.unwrap_or(ids.len());
    let target = index
        .checked_sub(1)
        .and_then(|i| ids.get(i))
        .ok_or_else(|| anyhow::anyhow!("Line {index} is out of range (1..={})", ids.len()))?
        .clone();
    let text = doc.node_text(&target).unwrap_or_default();

    let detection = detect(&session, target, text);
    session.record_detection(&detection);

    let selection = select(&session, &opts, detection.filter)?;

    if opts.dry_run {
        let prepared = session.prepare(&mut doc, &selection)?;
        match prepared.request {
            Some(request) => {
                println!("POST {}", request.url);
                println!("{}", serde_json::to_string_pretty(&request.body)?);
            }
            None => println!("{} makes no backend call", selection.option.id),
        }
        return Ok(());
    }

    let applied = session.run(&mut doc, &HttpTransport::new(), &selection).await?;
    tracing::debug!(applied, "run finished");

    let outline = write_outline(&doc.children(&page));
    if opts.write {
        std::fs::write(path, &outline)?;
        eprintln!("Wrote {applied} block(s) to {}", path.display());
    } else {
        print!("{outline}");
    }
    Ok(())
}

/// Locate a trigger left in `text`; without one the whole text is context.
fn detect(session: &Session, node: NodeId, text: String) -> Detection {
    let (trigger_start, filter) = match session.trigger().find(&text) {
        Some(found) => (found.start, found.filter),
        None => (text.chars().count(), String::new()),
    };
    Detection {
        field: FieldId::new("cli"),
        node,
        text_before_cursor: text,
        trigger_start,
        filter,
    }
}

fn select(session: &Session, opts: &RunOptions, filter: String) -> anyhow::Result<Selection> {
    let option = builtin_options()
        .into_iter()
        .find(|o| o.id == opts.option)
        .ok_or_else(|| anyhow::anyhow!("Unknown option: {}. See `cue options`", opts.option))?;

    let model = match option.output_kind() {
        None => None,
        Some(kind) => {
            let models = session.models().for_kind(kind);
            let found = match &opts.model {
                Some(name) => models.into_iter().find(|m| m.name == *name),
                None => models.into_iter().next(),
            };
            Some(found.cloned().ok_or_else(|| {
                anyhow::anyhow!(
                    "No {kind:?} model named {}",
                    opts.model.as_deref().unwrap_or("(default)")
                )
            })?)
        }
    };

    Ok(Selection {
        option,
        model,
        filter,
    })
}
