//! Glue between host input events, the detector, and the open menu.

use crate::detector::{Detection, FieldId, InputEvent, TriggerDetector};
use crate::menu::{KeyInput, KeyOutcome, MenuMachine, MenuView, Selection};
use crate::session::Session;

/// Input surface provided by the host.
///
/// Hosts may recreate input elements between events, so the controller resolves the
/// element it listens on once per menu and addresses it only through this trait.
pub trait InputHost {
    /// Stable element to listen on for the field that opened the menu.
    fn listening_target(&self, field: &FieldId) -> FieldId;

    /// Start routing key presses on `field` to the controller.
    fn attach_keys(&mut self, field: &FieldId);

    /// Stop routing key presses on `field`.
    fn detach_keys(&mut self, field: &FieldId);

    /// Current text from field start to caret, or `None` if the field is gone.
    fn text_to_caret(&self, field: &FieldId) -> Option<String>;
}

// Compile-time check: InputHost must be object-safe
const _: () = {
    fn _assert_object_safe(_: &dyn InputHost) {}
};

/// What the controller did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    Ignored,
    Opened,
    Consumed,
    PassThrough,
    Closed,
    Commit(Selection),
}

impl ControllerEvent {
    /// Whether the host must suppress its own handling of the key.
    pub fn suppresses_key(&self) -> bool {
        matches!(self, ControllerEvent::Consumed | ControllerEvent::Commit(_))
    }
}

struct OpenMenu {
    listening: FieldId,
    detection: Detection,
    machine: MenuMachine,
}

/// Owns the detector and at most one open menu.
pub struct MenuController {
    detector: TriggerDetector,
    open: Option<OpenMenu>,
}

impl MenuController {
    pub fn new(session: &Session) -> Self {
        Self {
            detector: session.detector(),
            open: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Detection that opened the current menu.
    pub fn detection(&self) -> Option<&Detection> {
        self.open.as_ref().map(|o| &o.detection)
    }

    pub fn view(&self) -> Option<MenuView> {
        self.open.as_ref().map(|o| o.machine.view())
    }

    /// Handle a text-input mutation.
    pub fn on_input(
        &mut self,
        session: &mut Session,
        host: &mut dyn InputHost,
        event: &InputEvent,
    ) -> ControllerEvent {
        if let Some(open) = &mut self.open {
            if event.field != open.detection.field && event.field != open.listening {
                return ControllerEvent::Ignored;
            }
            if open.machine.refresh(Some(&event.text_to_caret())) {
                return ControllerEvent::PassThrough;
            }
            self.close_menu(host);
            return ControllerEvent::Closed;
        }

        let Some(detection) = self.detector.on_input(event) else {
            return ControllerEvent::Ignored;
        };

        let listening = host.listening_target(&detection.field);
        host.attach_keys(&listening);
        let machine = session.open_menu(&detection);
        tracing::debug!(field = %listening, node = %detection.node, "menu opened");
        self.open = Some(OpenMenu {
            listening,
            detection,
            machine,
        });
        ControllerEvent::Opened
    }

    /// Handle a key press on the listening element.
    pub fn on_key(&mut self, host: &mut dyn InputHost, input: KeyInput) -> ControllerEvent {
        let Some(open) = &mut self.open else {
            return ControllerEvent::Ignored;
        };

        let text = host.text_to_caret(&open.listening);
        match open.machine.handle_key(input, text.as_deref()) {
            KeyOutcome::Consumed => ControllerEvent::Consumed,
            KeyOutcome::PassThrough => ControllerEvent::PassThrough,
            KeyOutcome::Closed => {
                self.close_menu(host);
                ControllerEvent::Closed
            }
            KeyOutcome::Commit(selection) => {
                self.close_menu(host);
                ControllerEvent::Commit(selection)
            }
        }
    }

    /// Escape observed anywhere on the host surface.
    pub fn on_host_escape(&mut self, host: &mut dyn InputHost) -> ControllerEvent {
        self.detector.on_escape();
        if self.is_open() {
            self.close_menu(host);
            ControllerEvent::Closed
        } else {
            ControllerEvent::Ignored
        }
    }

    /// Close the menu, detaching its key listener. No-op when nothing is open.
    pub fn close_menu(&mut self, host: &mut dyn InputHost) {
        if let Some(open) = self.open.take() {
            host.detach_keys(&open.listening);
            tracing::debug!(field = %open.listening, "menu closed");
        }
        self.detector.on_menu_closed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::menu::Key;
    use cue_doc::NodeId;
    use std::collections::HashMap;

    #[derive(Default)]
    struct RecordingHost {
        values: HashMap<FieldId, String>,
        attached: Vec<FieldId>,
        detached: Vec<FieldId>,
        reroute: Option<FieldId>,
    }

    impl InputHost for RecordingHost {
        fn listening_target(&self, field: &FieldId) -> FieldId {
            self.reroute.clone().unwrap_or_else(|| field.clone())
        }

        fn attach_keys(&mut self, field: &FieldId) {
            self.attached.push(field.clone());
        }

        fn detach_keys(&mut self, field: &FieldId) {
            self.detached.push(field.clone());
        }

        fn text_to_caret(&self, field: &FieldId) -> Option<String> {
            self.values.get(field).cloned()
        }
    }

    fn field() -> FieldId {
        FieldId::new("block-input-7")
    }

    fn typed(host: &mut RecordingHost, value: &str) -> InputEvent {
        host.values.insert(field(), value.to_string());
        InputEvent {
            field: field(),
            node: Some(NodeId::from("n7")),
            value: value.to_string(),
            caret: value.chars().count(),
            is_block_editor: true,
        }
    }

    fn setup() -> (Session, MenuController, RecordingHost) {
        let session = Session::new(Settings::default()).unwrap();
        let controller = MenuController::new(&session);
        (session, controller, RecordingHost::default())
    }

    #[test]
    fn test_single_menu_guarantee() {
        let (mut session, mut ctl, mut host) = setup();
        let first = typed(&mut host, "abc qq");
        let second = typed(&mut host, "abc qq");
        assert_eq!(ctl.on_input(&mut session, &mut host, &first), ControllerEvent::Opened);
        assert_ne!(ctl.on_input(&mut session, &mut host, &second), ControllerEvent::Opened);
        assert_eq!(host.attached.len(), 1);
        assert!(ctl.is_open());
    }

    #[test]
    fn test_detach_once_on_commit() {
        let (mut session, mut ctl, mut host) = setup();
        let ev = typed(&mut host, "abc qq");
        ctl.on_input(&mut session, &mut host, &ev);

        let outcome = ctl.on_key(&mut host, KeyInput::plain(Key::Enter));
        assert!(matches!(outcome, ControllerEvent::Commit(_)));
        assert!(outcome.suppresses_key());
        ctl.close_menu(&mut host);
        ctl.on_host_escape(&mut host);
        assert_eq!(host.detached, vec![field()]);
        assert!(!ctl.is_open());
    }

    #[test]
    fn test_detach_once_on_escape() {
        let (mut session, mut ctl, mut host) = setup();
        let ev = typed(&mut host, "abc qq");
        ctl.on_input(&mut session, &mut host, &ev);
        assert_eq!(ctl.on_key(&mut host, KeyInput::plain(Key::Escape)), ControllerEvent::Closed);
        assert_eq!(ctl.on_key(&mut host, KeyInput::plain(Key::Escape)), ControllerEvent::Ignored);
        assert_eq!(host.detached.len(), 1);
    }

    #[test]
    fn test_typing_past_trigger_closes_and_detaches() {
        let (mut session, mut ctl, mut host) = setup();
        let ev = typed(&mut host, "abc qq");
        ctl.on_input(&mut session, &mut host, &ev);

        let ev = typed(&mut host, "abc qqcon");
        assert_eq!(ctl.on_input(&mut session, &mut host, &ev), ControllerEvent::PassThrough);
        assert_eq!(ctl.view().unwrap().filter, "con");

        let ev = typed(&mut host, "abc q");
        assert_eq!(ctl.on_input(&mut session, &mut host, &ev), ControllerEvent::Closed);
        assert_eq!(host.detached.len(), 1);

        // The guard is released, so the trigger opens a fresh menu.
        let ev = typed(&mut host, "abc qq");
        assert_eq!(ctl.on_input(&mut session, &mut host, &ev), ControllerEvent::Opened);
    }

    #[test]
    fn test_listening_target_resolved_once() {
        let (mut session, mut ctl, mut host) = setup();
        host.reroute = Some(FieldId::new("reference-item-parent"));
        host.values
            .insert(FieldId::new("reference-item-parent"), "abc qq".to_string());
        let ev = typed(&mut host, "abc qq");
        ctl.on_input(&mut session, &mut host, &ev);
        assert_eq!(host.attached, vec![FieldId::new("reference-item-parent")]);

        assert_eq!(ctl.on_key(&mut host, KeyInput::plain(Key::Down)), ControllerEvent::Consumed);
        ctl.on_host_escape(&mut host);
        assert_eq!(host.detached, vec![FieldId::new("reference-item-parent")]);
    }

    #[test]
    fn test_stale_field_closes_menu() {
        let (mut session, mut ctl, mut host) = setup();
        let ev = typed(&mut host, "abc qq");
        ctl.on_input(&mut session, &mut host, &ev);
        host.values.clear();
        assert_eq!(ctl.on_key(&mut host, KeyInput::plain(Key::Char('x'))), ControllerEvent::Closed);
    }

    #[test]
    fn test_open_records_session_target() {
        let (mut session, mut ctl, mut host) = setup();
        let ev = typed(&mut host, "abc qq");
        ctl.on_input(&mut session, &mut host, &ev);
        assert_eq!(session.last_edited(), Some(&NodeId::from("n7")));
        assert_eq!(ctl.detection().unwrap().trigger_start, 4);
    }
}
