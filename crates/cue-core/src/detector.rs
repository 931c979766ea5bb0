//! Trigger detection on text-input mutations.

use crate::trigger::Trigger;
use cue_doc::NodeId;
use std::fmt;

/// Host handle of an input element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldId(String);

impl FieldId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A text-input mutation reported by the host.
#[derive(Debug, Clone)]
pub struct InputEvent {
    /// Element that changed.
    pub field: FieldId,
    /// Node being edited in that element, if the host knows it.
    pub node: Option<NodeId>,
    /// Full field value after the mutation.
    pub value: String,
    /// Caret position in characters.
    pub caret: usize,
    /// Whether the element is a block editor the menu may open on.
    pub is_block_editor: bool,
}

impl InputEvent {
    /// Text from field start to caret.
    pub fn text_to_caret(&self) -> String {
        self.value.chars().take(self.caret).collect()
    }
}

/// A successful detection: the menu should open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub field: FieldId,
    pub node: NodeId,
    /// Snapshot taken at detection time; the content source for local options.
    pub text_before_cursor: String,
    /// Character offset of the trigger token.
    pub trigger_start: usize,
    pub filter: String,
}

/// Watches input events and opens the menu at most once at a time.
#[derive(Debug, Clone)]
pub struct TriggerDetector {
    trigger: Trigger,
    menu_loaded: bool,
}

impl TriggerDetector {
    pub fn new(trigger: Trigger) -> Self {
        Self {
            trigger,
            menu_loaded: false,
        }
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    /// Whether a menu is currently loaded.
    pub fn menu_loaded(&self) -> bool {
        self.menu_loaded
    }

    /// Inspect an input event. Returns a detection when the menu should open.
    pub fn on_input(&mut self, event: &InputEvent) -> Option<Detection> {
        if self.menu_loaded || !event.is_block_editor {
            return None;
        }

        let text_before_cursor = event.text_to_caret();
        let found = self.trigger.find(&text_before_cursor)?;

        let Some(node) = event.node.clone() else {
            tracing::debug!(field = %event.field, "trigger matched outside a known node");
            return None;
        };

        self.menu_loaded = true;
        Some(Detection {
            field: event.field.clone(),
            node,
            text_before_cursor,
            trigger_start: found.start,
            filter: found.filter,
        })
    }

    /// The menu closed; detection may open a new one.
    pub fn on_menu_closed(&mut self) {
        self.menu_loaded = false;
    }

    /// Escape was pressed somewhere on the host surface.
    pub fn on_escape(&mut self) {
        if self.menu_loaded {
            tracing::debug!("escape reset the menu guard");
        }
        self.menu_loaded = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::DEFAULT_TRIGGER;

    fn detector() -> TriggerDetector {
        TriggerDetector::new(Trigger::new(DEFAULT_TRIGGER).unwrap())
    }

    fn event(value: &str) -> InputEvent {
        InputEvent {
            field: FieldId::new("block-input-1"),
            node: Some(NodeId::from("n1")),
            value: value.to_string(),
            caret: value.chars().count(),
            is_block_editor: true,
        }
    }

    #[test]
    fn test_detects_and_snapshots() {
        let mut d = detector();
        let det = d.on_input(&event("abc qq")).unwrap();
        assert_eq!(det.trigger_start, 4);
        assert_eq!(det.text_before_cursor, "abc qq");
        assert_eq!(det.node, NodeId::from("n1"));
        assert!(d.menu_loaded());
    }

    #[test]
    fn test_snapshot_stops_at_caret() {
        let mut d = detector();
        let mut ev = event("abc qq tail");
        ev.caret = 6;
        let det = d.on_input(&ev).unwrap();
        assert_eq!(det.text_before_cursor, "abc qq");
    }

    #[test]
    fn test_no_match_is_noop() {
        let mut d = detector();
        assert!(d.on_input(&event("abc")).is_none());
        assert!(!d.menu_loaded());
    }

    #[test]
    fn test_reentrancy_guard() {
        let mut d = detector();
        assert!(d.on_input(&event("abc qq")).is_some());
        assert!(d.on_input(&event("abc qqx")).is_none());
        d.on_menu_closed();
        assert!(d.on_input(&event("abc qqx")).is_some());
    }

    #[test]
    fn test_escape_resets_guard() {
        let mut d = detector();
        d.on_input(&event("abc qq"));
        d.on_escape();
        assert!(!d.menu_loaded());
        assert!(d.on_input(&event("abc qq")).is_some());
    }

    #[test]
    fn test_ignores_non_block_fields() {
        let mut d = detector();
        let mut ev = event("search qq");
        ev.is_block_editor = false;
        assert!(d.on_input(&ev).is_none());
    }

    #[test]
    fn test_requires_node() {
        let mut d = detector();
        let mut ev = event("abc qq");
        ev.node = None;
        assert!(d.on_input(&ev).is_none());
        assert!(!d.menu_loaded());
    }
}
