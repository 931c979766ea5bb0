//! cue-core: trigger detection, the command menu, context assembly, prompt
//! building and response dispatch.

pub mod config;
pub mod context;
pub mod controller;
pub mod detector;
pub mod dispatch;
mod error;
pub mod menu;
pub mod options;
pub mod prompt;
pub mod session;
pub mod trigger;

pub use config::{Settings, SettingsStore, DEFAULT_MAX_TOKENS, SETTING_KEYS};
pub use context::{
    parse_outline, seed_outline, write_outline, AssemblyContext, ContextAssembler, OutlineLine,
    Reference, DEFAULT_WINDOW_SIZE,
};
pub use controller::{ControllerEvent, InputHost, MenuController};
pub use detector::{Detection, FieldId, InputEvent, TriggerDetector};
pub use dispatch::{DispatchTarget, Mutation};
pub use error::CueError;
pub use menu::{Key, KeyInput, KeyOutcome, MenuMachine, MenuRow, MenuState, MenuView, Selection};
pub use options::{builtin_options, ContextSource, MenuOption, OptionKind, PromptSpec, WriteBack};
pub use prompt::{PromptBuilder, ASSISTANT_MARKER};
pub use session::{Prepared, Session};
pub use trigger::{Trigger, TriggerMatch, DEFAULT_TRIGGER};
