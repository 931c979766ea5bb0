//! Prompt and request construction for a committed menu option.

use crate::context::{AssemblyContext, ContextAssembler};
use crate::error::CueError;
use crate::options::{ContextSource, MenuOption, OptionKind, PromptSpec};
use cue_doc::{DocumentStore, NodeId};
use cue_provider::{
    default_endpoint, BackendRequest, ChatMessage, ChatPayload, ChatRole, CompletionPayload,
    ImagePayload, ModelDescriptor, OutputKind, Payload,
};

/// Prefix of chat reply nodes.
pub const ASSISTANT_MARKER: &str = "[assistant]:";

/// Sampling temperature of text completions.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Builds backend requests from an option, a model, and the document.
#[derive(Debug, Clone, Copy)]
pub struct PromptBuilder<'a> {
    assembler: &'a ContextAssembler,
    default_max_tokens: u32,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(assembler: &'a ContextAssembler, default_max_tokens: u32) -> Self {
        Self {
            assembler,
            default_max_tokens,
        }
    }

    /// Prompt string for a text or image option.
    pub fn prompt_text(
        &self,
        spec: &PromptSpec,
        ctx: &AssemblyContext,
        store: &dyn DocumentStore,
    ) -> String {
        let trigger = self.assembler.trigger();
        let mut prompt = spec.prefix.clone().unwrap_or_default();
        let suffix = spec.suffix.as_deref().unwrap_or("");

        match spec.source {
            ContextSource::Local => {
                prompt.push_str(trigger.strip(&ctx.text_before_cursor));
                prompt.push_str(suffix);
            }
            ContextSource::Siblings => self.push_siblings(&mut prompt, suffix, ctx),
            ContextSource::FullPage => {
                prompt.push_str("current page context: \n```\n");
                prompt.push_str(&self.assembler.full_page(store, &ctx.target_node_id));
                prompt.push_str("\n```\n");
                let target = store.node_text(&ctx.target_node_id).unwrap_or_default();
                prompt.push_str(trigger.strip(&target));
                prompt.push('\n');
                prompt.push_str(suffix);
            }
            ContextSource::References => {
                let raw: String = ctx
                    .siblings_before_target
                    .iter()
                    .map(|s| trigger.strip(&s.text))
                    .collect();
                prompt.push_str(&self.assembler.expand_references(store, &raw));
                self.push_siblings(&mut prompt, suffix, ctx);
            }
        }
        prompt
    }

    fn push_siblings(&self, prompt: &mut String, suffix: &str, ctx: &AssemblyContext) {
        let trigger = self.assembler.trigger();
        prompt.push_str(&ctx.parent_text);
        prompt.push('\n');
        for sibling in &ctx.siblings_before_target {
            prompt.push_str(trigger.strip(&sibling.text));
            prompt.push('\n');
        }
        prompt.push_str(suffix);
        // The tree may not yet hold the in-progress edit of a lone block.
        if ctx.sibling_count <= 1 {
            prompt.push_str(trigger.strip(&ctx.text_before_cursor));
        }
    }

    /// Role-tagged turns from the top-level blocks of `page`.
    ///
    /// Turns with empty content are dropped.
    pub fn chat_messages(&self, store: &dyn DocumentStore, page: &NodeId) -> Vec<ChatMessage> {
        let trigger = self.assembler.trigger();
        let mut messages = Vec::new();
        for block in store.children(page) {
            let (role, text) = match block.text.strip_prefix(ASSISTANT_MARKER) {
                Some(rest) => (ChatRole::Assistant, rest.trim_start()),
                None => (ChatRole::User, trigger.strip(&block.text)),
            };
            if !text.is_empty() {
                messages.push(ChatMessage::new(role, text));
            }
            let children = self.assembler.linearize(&block.children);
            if !children.is_empty() {
                messages.push(ChatMessage::new(role, children));
            }
        }
        messages
    }

    /// Build the backend call for `option`. Returns `None` for options without one.
    pub fn build(
        &self,
        option: &MenuOption,
        model: Option<&ModelDescriptor>,
        ctx: &AssemblyContext,
        store: &dyn DocumentStore,
    ) -> Result<Option<BackendRequest>, CueError> {
        let Some(kind) = option.output_kind() else {
            return Ok(None);
        };
        let model = model.ok_or_else(|| CueError::NoModel(option.id.clone()))?;

        let payload = match &option.kind {
            OptionKind::Text { prompt, .. } => Payload::Completion(CompletionPayload {
                model: model.wire_model().to_string(),
                prompt: self.prompt_text(prompt, ctx, store),
                temperature: DEFAULT_TEMPERATURE,
                max_tokens: option.max_tokens(self.default_max_tokens),
            }),
            OptionKind::Chat => {
                let page = store
                    .page_of(&ctx.target_node_id)
                    .ok_or(CueError::NoTarget)?;
                Payload::Chat(ChatPayload {
                    model: model.wire_model().to_string(),
                    messages: self.chat_messages(store, &page),
                })
            }
            OptionKind::Image { prompt } => Payload::Image(ImagePayload {
                model: model.wire_model().to_string(),
                prompt: self.prompt_text(prompt, ctx, store),
                n: 1,
            }),
            OptionKind::NewChatPage => return Ok(None),
        };

        Ok(Some(BackendRequest {
            endpoint: resolve_endpoint(option, model, kind),
            payload,
        }))
    }
}

/// Option hint, else model endpoint, else the default for `kind`.
fn resolve_endpoint(option: &MenuOption, model: &ModelDescriptor, kind: OutputKind) -> String {
    option
        .endpoint_hint
        .clone()
        .or_else(|| model.endpoint.clone())
        .unwrap_or_else(|| default_endpoint(kind))
}
