//! Menu option descriptors and the built-in catalog.

use cue_provider::OutputKind;

/// Where the prompt body comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContextSource {
    /// Parent text plus siblings up to and including the target.
    #[default]
    Siblings,
    /// Only the target's text before the cursor.
    Local,
    /// The whole page, bounded to the tail of the context window.
    FullPage,
    /// Expanded `[[page]]` / `((block))` references, then the sibling context.
    References,
}

/// Literal text around the assembled context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptSpec {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub source: ContextSource,
}

impl PromptSpec {
    pub fn new(source: ContextSource) -> Self {
        Self {
            prefix: None,
            suffix: None,
            source,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }
}

/// How a text completion is written back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteBack {
    /// Each completion line becomes a child of the target, in order.
    #[default]
    InsertChildren,
    /// The first completion line overwrites the parent's text.
    ReplaceParent,
}

/// What an option does, with only the fields that behaviour needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionKind {
    Text {
        prompt: PromptSpec,
        max_tokens: Option<u32>,
        write_back: WriteBack,
    },
    Chat,
    Image {
        prompt: PromptSpec,
    },
    /// No backend call: link a freshly named chat page under the target.
    NewChatPage,
}

/// One selectable menu command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    pub id: String,
    pub display_name: String,
    /// Endpoint override for the backend call.
    pub endpoint_hint: Option<String>,
    pub kind: OptionKind,
}

impl MenuOption {
    fn new(id: &str, display_name: &str, kind: OptionKind) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            endpoint_hint: None,
            kind,
        }
    }

    fn text(id: &str, display_name: &str, prompt: PromptSpec) -> Self {
        Self::new(
            id,
            display_name,
            OptionKind::Text {
                prompt,
                max_tokens: None,
                write_back: WriteBack::InsertChildren,
            },
        )
    }

    /// Output kind of the backend call, `None` for local-only options.
    pub fn output_kind(&self) -> Option<OutputKind> {
        match self.kind {
            OptionKind::Text { .. } => Some(OutputKind::Text),
            OptionKind::Chat => Some(OutputKind::Chat),
            OptionKind::Image { .. } => Some(OutputKind::Image),
            OptionKind::NewChatPage => None,
        }
    }

    /// Token cap for text options: the option's value, else `default`.
    pub fn max_tokens(&self, default: u32) -> u32 {
        match self.kind {
            OptionKind::Text {
                max_tokens: Some(n),
                ..
            } => n,
            _ => default,
        }
    }
}

/// The fixed option catalog, in menu order.
pub fn builtin_options() -> Vec<MenuOption> {
    let mut short = MenuOption::text("completion_120", "Completion (120 tokens)", PromptSpec::default());
    if let OptionKind::Text { max_tokens, .. } = &mut short.kind {
        *max_tokens = Some(120);
    }

    let summarize = MenuOption::new(
        "summarize_parent",
        "Summarize into parent",
        OptionKind::Text {
            prompt: PromptSpec::default().with_suffix("\nSummarize the notes above in one line:\n"),
            max_tokens: Some(64),
            write_back: WriteBack::ReplaceParent,
        },
    );

    vec![
        MenuOption::text("completion_default", "Completion", PromptSpec::default()),
        short,
        MenuOption::text("continue_page", "Continue page", PromptSpec::new(ContextSource::FullPage)),
        MenuOption::text("continue_line", "Continue line", PromptSpec::new(ContextSource::Local)),
        MenuOption::text(
            "bullet_ideas",
            "Brainstorm bullets",
            PromptSpec::new(ContextSource::Local)
                .with_prefix("Brainstorm a bulleted list of ideas about: ")
                .with_suffix("\n- "),
        ),
        summarize,
        MenuOption::text(
            "load_context",
            "Answer from references",
            PromptSpec::new(ContextSource::References),
        ),
        MenuOption::new("chat", "Chat", OptionKind::Chat),
        MenuOption::new(
            "image",
            "Image",
            OptionKind::Image {
                prompt: PromptSpec::new(ContextSource::Local),
            },
        ),
        MenuOption::new("open_chat_page", "New chat page", OptionKind::NewChatPage),
    ]
}
