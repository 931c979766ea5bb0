//! Per-process session state and the commit pipeline.
//!
//! A [`Session`] replaces ambient globals: it owns the settings, the compiled trigger, the
//! model catalog, and the node the last detection happened on. Committing a selection is
//! split into [`Session::prepare`] (synchronous, mutates the trigger node) and
//! [`Prepared::finish`] (applies the reply) so a host can send the request elsewhere.

use crate::config::Settings;
use crate::context::ContextAssembler;
use crate::detector::{Detection, TriggerDetector};
use crate::dispatch::{self, DispatchTarget};
use crate::error::CueError;
use crate::menu::{MenuMachine, Selection};
use crate::options::{builtin_options, MenuOption};
use crate::prompt::PromptBuilder;
use crate::trigger::Trigger;
use cue_doc::{DocumentStore, NodeId};
use cue_provider::{parse_reply, BackendReply, HttpRequest, ModelCatalog, OutputKind, Transport};
use serde_json::Value;

pub struct Session {
    settings: Settings,
    assembler: ContextAssembler,
    models: ModelCatalog,
    last_edited: Option<NodeId>,
    text_before_cursor: String,
    /// Character offset of the trigger in the last edited node.
    trigger_start: usize,
}

impl Session {
    pub fn new(settings: Settings) -> Result<Self, CueError> {
        let trigger = Trigger::new(&settings.trigger)?;
        let assembler = ContextAssembler::new(trigger, settings.window_size)?;
        let models = ModelCatalog::with_custom(&settings.custom_models);
        Ok(Self {
            settings,
            assembler,
            models,
            last_edited: None,
            text_before_cursor: String::new(),
            trigger_start: 0,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn trigger(&self) -> &Trigger {
        self.assembler.trigger()
    }

    pub fn models(&self) -> &ModelCatalog {
        &self.models
    }

    pub fn assembler(&self) -> &ContextAssembler {
        &self.assembler
    }

    pub fn last_edited(&self) -> Option<&NodeId> {
        self.last_edited.as_ref()
    }

    /// A detector watching for this session's trigger.
    pub fn detector(&self) -> TriggerDetector {
        TriggerDetector::new(self.trigger().clone())
    }

    /// Update one setting from raw input; invalid input keeps the previous value.
    pub fn set(&mut self, key: &str, raw: &str) -> Result<bool, CueError> {
        let mut next = self.settings.clone();
        if !next.set(key, raw) {
            return Ok(false);
        }
        self.replace_settings(next)?;
        Ok(true)
    }

    /// Swap in new settings, recompiling the trigger and the model catalog.
    pub fn replace_settings(&mut self, settings: Settings) -> Result<(), CueError> {
        let trigger = Trigger::new(&settings.trigger)?;
        self.assembler = ContextAssembler::new(trigger, settings.window_size)?;
        self.models = ModelCatalog::with_custom(&settings.custom_models);
        self.settings = settings;
        Ok(())
    }

    /// Remember where the menu was opened.
    pub fn record_detection(&mut self, detection: &Detection) {
        self.last_edited = Some(detection.node.clone());
        self.text_before_cursor = detection.text_before_cursor.clone();
        self.trigger_start = detection.trigger_start;
    }

    /// Record `detection` and build the menu for it.
    pub fn open_menu(&mut self, detection: &Detection) -> MenuMachine {
        self.record_detection(detection);
        MenuMachine::open(
            builtin_options(),
            self.models.clone(),
            self.trigger().clone(),
            self.settings.fuzzy_filter,
            &detection.filter,
        )
    }

    /// Build the request for `selection` and consume the trigger on the target node.
    ///
    /// The trigger and the filter typed after it are removed from the node before the
    /// context is read, then replaced with the content tag once the request is built.
    pub fn prepare(
        &self,
        store: &mut dyn DocumentStore,
        selection: &Selection,
    ) -> Result<Prepared, CueError> {
        let target = self.last_edited.clone().ok_or(CueError::NoTarget)?;
        let trigger = self.trigger();
        let filter = selection.filter.as_str();

        let original = store.node_text(&target);
        if let Some(text) = &original {
            let cleaned = trigger.consume_at(text, self.trigger_start, filter, "");
            if cleaned != *text {
                store.update_node(&target, &cleaned)?;
            }
        }

        let text_before_cursor = trigger
            .cut(&self.text_before_cursor, self.trigger_start, filter)
            .map_or(self.text_before_cursor.as_str(), |(before, _)| before);
        let ctx = self.assembler.assemble(&*store, &target, text_before_cursor);
        let built = PromptBuilder::new(&self.assembler, self.settings.max_tokens).build(
            &selection.option,
            selection.model.as_ref(),
            &ctx,
            &*store,
        );
        let request = match built {
            Ok(request) => request,
            Err(e) => {
                if let Some(text) = &original {
                    store.update_node(&target, text)?;
                }
                return Err(e);
            }
        };

        if let Some(text) = &original {
            let tag = &self.settings.content_tag;
            let tagged = trigger.consume_at(text, self.trigger_start, filter, tag);
            if !tag.is_empty() && tagged != *text {
                store.update_node(&target, &tagged)?;
            }
        }

        if request.is_some() && self.settings.api_key.is_empty() {
            tracing::warn!("no API key configured; sending request without credentials");
        }
        let http = request
            .as_ref()
            .map(|r| r.to_http(&self.settings.api_key))
            .transpose()?;

        tracing::debug!(
            option = %selection.option.id,
            model = selection.model.as_ref().map(|m| m.name.as_str()),
            url = http.as_ref().map(|h| h.url.as_str()),
            "prepared menu command"
        );

        Ok(Prepared {
            option: selection.option.clone(),
            target: DispatchTarget {
                page: store.page_of(&target),
                parent: ctx.parent_id,
                target,
            },
            kind: request.as_ref().map(|r| r.kind()),
            request: http,
        })
    }

    /// Prepare, send, and apply a selection in one go.
    pub async fn run(
        &self,
        store: &mut dyn DocumentStore,
        transport: &dyn Transport,
        selection: &Selection,
    ) -> Result<usize, CueError> {
        let prepared = self.prepare(store, selection)?;
        let Some(request) = prepared.request.clone() else {
            return prepared.finish(store, None);
        };

        match transport.post(request).await {
            Ok(body) => prepared.finish(store, Some(&body)),
            Err(e) => {
                tracing::warn!(transport = transport.name(), error = %e, "backend request failed");
                Err(e.into())
            }
        }
    }
}

/// A committed selection whose request has not been answered yet.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub option: MenuOption,
    pub target: DispatchTarget,
    /// `None` when the option makes no backend call.
    pub request: Option<HttpRequest>,
    pub kind: Option<OutputKind>,
}

impl Prepared {
    /// Apply the backend response body and return the number of writes.
    ///
    /// Error payloads are logged and write nothing.
    pub fn finish(
        &self,
        store: &mut dyn DocumentStore,
        body: Option<&Value>,
    ) -> Result<usize, CueError> {
        let reply = match (self.kind, body) {
            (Some(kind), Some(body)) => Some(parse_reply(kind, body)),
            (Some(_), None) => {
                tracing::debug!(option = %self.option.id, "no response body to apply");
                return Ok(0);
            }
            (None, _) => None,
        };

        if let Some(BackendReply::Error(message)) = &reply {
            tracing::warn!(option = %self.option.id, %message, "backend returned an error");
            return Ok(0);
        }

        let mutations = dispatch::plan(&self.option, reply.as_ref(), &self.target);
        let applied = dispatch::apply(store, mutations)?;
        tracing::debug!(option = %self.option.id, applied, "applied reply");
        Ok(applied)
    }
}
