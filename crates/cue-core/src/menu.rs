//! Menu state machine: option navigation, model cycling, and filtering.
//!
//! A `MenuMachine` exists only while the menu is open. `handle_key` returns
//! [`KeyOutcome::Commit`] or [`KeyOutcome::Closed`] when the menu should close; the
//! owner then drops the machine.

use crate::options::MenuOption;
use crate::trigger::Trigger;
use cue_provider::{ModelCatalog, ModelDescriptor};

/// Keys the menu reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Escape,
    Backspace,
    Char(char),
    /// A bare modifier press (Ctrl, Cmd, ...).
    Modifier,
    Other,
}

/// A key press with the model-cycling modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub ctrl: bool,
}

impl KeyInput {
    pub fn plain(key: Key) -> Self {
        Self { key, ctrl: false }
    }

    pub fn ctrl(key: Key) -> Self {
        Self { key, ctrl: true }
    }
}

/// Transient state of one open menu.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuState {
    pub filter_text: String,
    pub active_option_index: usize,
    pub active_model_index: usize,
    pub is_model_select_mode: bool,
}

/// A committed choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub option: MenuOption,
    /// `None` for options that make no backend call.
    pub model: Option<ModelDescriptor>,
    /// Text typed after the trigger when the selection was made.
    pub filter: String,
}

/// Result of feeding one key to the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Handled by the menu; must not reach the text field.
    Consumed,
    /// Observed by the menu; the text field still handles it.
    PassThrough,
    /// The menu closed without a selection.
    Closed,
    /// The menu closed with a selection.
    Commit(Selection),
}

impl KeyOutcome {
    pub fn is_consumed(&self) -> bool {
        matches!(self, KeyOutcome::Consumed | KeyOutcome::Commit(_))
    }

    pub fn closes_menu(&self) -> bool {
        matches!(self, KeyOutcome::Closed | KeyOutcome::Commit(_))
    }
}

/// One row of the rendered option list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuRow {
    pub label: String,
    pub active: bool,
}

/// Pure projection of the menu for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuView {
    pub rows: Vec<MenuRow>,
    /// Label of the selected model for the hovered option.
    pub model: Option<String>,
    /// Position of the selected model and size of its partition.
    pub model_position: Option<(usize, usize)>,
    pub model_select: bool,
    pub filter: String,
}

/// The open menu.
#[derive(Debug, Clone)]
pub struct MenuMachine {
    options: Vec<MenuOption>,
    models: ModelCatalog,
    trigger: Trigger,
    fuzzy_filter: bool,
    visible: Vec<usize>,
    state: MenuState,
}

impl MenuMachine {
    pub fn open(
        options: Vec<MenuOption>,
        models: ModelCatalog,
        trigger: Trigger,
        fuzzy_filter: bool,
        filter: &str,
    ) -> Self {
        let mut machine = Self {
            visible: (0..options.len()).collect(),
            options,
            models,
            trigger,
            fuzzy_filter,
            state: MenuState::default(),
        };
        machine.set_filter(filter);
        machine
    }

    pub fn state(&self) -> &MenuState {
        &self.state
    }

    /// Options currently listed, in menu order.
    pub fn visible_options(&self) -> Vec<&MenuOption> {
        self.visible.iter().map(|&i| &self.options[i]).collect()
    }

    /// Option under the highlight.
    pub fn hovered(&self) -> Option<&MenuOption> {
        self.visible
            .get(self.state.active_option_index)
            .map(|&i| &self.options[i])
    }

    /// Models that can serve the hovered option.
    pub fn hovered_models(&self) -> Vec<&ModelDescriptor> {
        self.hovered()
            .and_then(MenuOption::output_kind)
            .map(|kind| self.models.for_kind(kind))
            .unwrap_or_default()
    }

    /// Feed one key. `text_to_caret` is the live field text up to the caret.
    pub fn handle_key(&mut self, input: KeyInput, text_to_caret: Option<&str>) -> KeyOutcome {
        if input.key == Key::Modifier {
            return KeyOutcome::Consumed;
        }
        if !input.ctrl {
            self.state.is_model_select_mode = false;
        }

        match (input.key, input.ctrl) {
            (Key::Down, true) => {
                self.cycle_model(1);
                KeyOutcome::Consumed
            }
            (Key::Up, true) => {
                self.cycle_model(-1);
                KeyOutcome::Consumed
            }
            (Key::Down, false) => {
                self.step_option(1);
                KeyOutcome::Consumed
            }
            (Key::Up, false) => {
                self.step_option(-1);
                KeyOutcome::Consumed
            }
            (Key::Left | Key::Right, _) => KeyOutcome::Consumed,
            (Key::Enter, _) => match self.selection() {
                Some(selection) => KeyOutcome::Commit(selection),
                None => KeyOutcome::Closed,
            },
            (Key::Escape, _) => KeyOutcome::Closed,
            _ => {
                if self.refresh(text_to_caret) {
                    KeyOutcome::PassThrough
                } else {
                    KeyOutcome::Closed
                }
            }
        }
    }

    /// Re-run the trigger against the live field text. Returns `false` once the
    /// trigger no longer matches and the menu should close.
    pub fn refresh(&mut self, text_to_caret: Option<&str>) -> bool {
        match text_to_caret.and_then(|text| self.trigger.find(text)) {
            Some(found) => {
                self.set_filter(&found.filter);
                true
            }
            None => false,
        }
    }

    /// The hovered option with its selected model.
    pub fn selection(&self) -> Option<Selection> {
        let option = self.hovered()?.clone();
        let model = if option.output_kind().is_some() {
            let models = self.hovered_models();
            match models.len() {
                0 => None,
                n => Some(models[self.state.active_model_index % n].clone()),
            }
        } else {
            None
        };
        Some(Selection {
            option,
            model,
            filter: self.state.filter_text.clone(),
        })
    }

    pub fn view(&self) -> MenuView {
        let rows = self
            .visible_options()
            .into_iter()
            .enumerate()
            .map(|(i, option)| MenuRow {
                label: option.display_name.clone(),
                active: i == self.state.active_option_index,
            })
            .collect();

        let models = self.hovered_models();
        let (model, model_position) = match models.len() {
            0 => (None, None),
            n => {
                let index = self.state.active_model_index % n;
                (Some(models[index].label().to_string()), Some((index, n)))
            }
        };

        MenuView {
            rows,
            model,
            model_position,
            model_select: self.state.is_model_select_mode,
            filter: self.state.filter_text.clone(),
        }
    }

    fn step_option(&mut self, delta: isize) {
        let count = self.visible.len();
        if count == 0 {
            return;
        }
        self.state.active_option_index = wrap(self.state.active_option_index, delta, count);
    }

    fn cycle_model(&mut self, delta: isize) {
        if !self.state.is_model_select_mode {
            self.state.is_model_select_mode = true;
            self.state.active_model_index = 0;
        }
        let count = self.hovered_models().len();
        if count == 0 {
            return;
        }
        self.state.active_model_index = wrap(self.state.active_model_index, delta, count);
    }

    fn set_filter(&mut self, filter: &str) {
        self.state.filter_text = filter.to_string();
        if !self.fuzzy_filter {
            return;
        }

        let needle = filter.trim();
        self.visible = self
            .options
            .iter()
            .enumerate()
            .filter(|(_, option)| matches_filter(&option.display_name, needle))
            .map(|(i, _)| i)
            .collect();
        self.state.active_option_index = self
            .state
            .active_option_index
            .min(self.visible.len().saturating_sub(1));
    }
}

fn wrap(index: usize, delta: isize, count: usize) -> usize {
    let count = count as isize;
    ((index as isize + delta) % count + count) as usize % count as usize
}

/// Case-insensitive subsequence match.
fn matches_filter(label: &str, needle: &str) -> bool {
    let mut hay = label.chars().flat_map(char::to_lowercase);
    needle
        .chars()
        .flat_map(char::to_lowercase)
        .all(|c| hay.any(|h| h == c))
}
