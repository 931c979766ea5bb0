//! TUI application state and rendering.
//!
//! The screen is a single outline page. Normal mode moves between blocks; insert
//! mode edits the focused block, and typing the trigger there opens the command
//! menu as an overlay anchored under the block.

use cue_core::{
    seed_outline, write_outline, ControllerEvent, CueError, FieldId, InputEvent, InputHost,
    KeyInput, MenuController, MenuView, OutlineLine, Prepared, Selection, Session,
    ASSISTANT_MARKER,
};
use cue_doc::{DocumentStore, MemoryDocument, NewNode, NodeId};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

// ── Theme ──────────────────────────────────────────────────────────────

const COLOR_ACCENT: Color = Color::Rgb(166, 227, 161); // Green
const COLOR_LINK: Color = Color::Rgb(137, 180, 250); // Blue
const COLOR_ASSISTANT: Color = Color::Rgb(203, 166, 247); // Mauve
const COLOR_ERROR: Color = Color::Rgb(243, 139, 168); // Red
const COLOR_WAITING: Color = Color::Rgb(108, 112, 134); // Overlay0
const COLOR_HEADER_BG: Color = Color::Rgb(24, 24, 37); // Mantle
const COLOR_BAR_FG: Color = Color::Rgb(147, 153, 178); // Overlay1
const COLOR_SELECTED_BG: Color = Color::Rgb(49, 50, 68); // Surface0
const COLOR_DIM: Color = Color::Rgb(88, 91, 112); // Overlay0

const MENU_WIDTH: u16 = 34;

// ── State ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Idle,
    /// Requests are in flight.
    Waiting,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Insert,
}

/// One visible outline row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: NodeId,
    pub depth: usize,
    pub text: String,
}

/// The block editor the menu listens on.
#[derive(Debug, Default)]
pub struct BlockEditor {
    pub node: Option<NodeId>,
    pub buffer: String,
    /// Caret position in characters.
    pub caret: usize,
    attached: Option<FieldId>,
}

impl BlockEditor {
    pub fn field(&self) -> FieldId {
        FieldId::new(match &self.node {
            Some(id) => format!("block-input-{id}"),
            None => "block-input".to_string(),
        })
    }

    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    fn byte_at(&self, caret: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(caret)
            .map_or(self.buffer.len(), |(i, _)| i)
    }

    fn insert(&mut self, c: char) {
        let at = self.byte_at(self.caret);
        self.buffer.insert(at, c);
        self.caret += 1;
    }

    fn backspace(&mut self) -> bool {
        if self.caret == 0 {
            return false;
        }
        let at = self.byte_at(self.caret - 1);
        self.buffer.remove(at);
        self.caret -= 1;
        true
    }

    fn move_caret(&mut self, delta: isize) {
        let len = self.buffer.chars().count() as isize;
        self.caret = (self.caret as isize + delta).clamp(0, len) as usize;
    }

    fn input_event(&self) -> InputEvent {
        InputEvent {
            field: self.field(),
            node: self.node.clone(),
            value: self.buffer.clone(),
            caret: self.caret,
            is_block_editor: true,
        }
    }
}

impl InputHost for BlockEditor {
    fn listening_target(&self, field: &FieldId) -> FieldId {
        field.clone()
    }

    fn attach_keys(&mut self, field: &FieldId) {
        self.attached = Some(field.clone());
    }

    fn detach_keys(&mut self, field: &FieldId) {
        if self.attached.as_ref() == Some(field) {
            self.attached = None;
        }
    }

    fn text_to_caret(&self, field: &FieldId) -> Option<String> {
        if *field != self.field() {
            return None;
        }
        Some(self.buffer.chars().take(self.caret).collect())
    }
}

pub struct App {
    pub state: AppState,
    pub input_mode: InputMode,
    pub running: bool,
    pub status: String,
    pub doc: MemoryDocument,
    pub page: NodeId,
    pub rows: Vec<Row>,
    pub selected: usize,
    pub editor: BlockEditor,
    pub session: Session,
    pub controller: MenuController,
    pub pending: usize,
    pub tick: u16,
}

// ── App Implementation ─────────────────────────────────────────────────

impl App {
    pub fn new(session: Session, title: &str) -> Self {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page(title);
        let controller = MenuController::new(&session);
        let mut app = Self {
            state: AppState::Idle,
            input_mode: InputMode::Normal,
            running: true,
            status: "Ready".to_string(),
            doc,
            page,
            rows: Vec::new(),
            selected: 0,
            editor: BlockEditor::default(),
            session,
            controller,
            pending: 0,
            tick: 0,
        };
        app.refresh_rows();
        app
    }

    /// Build the page from parsed outline lines.
    pub fn seed_outline(&mut self, lines: &[OutlineLine]) -> Result<(), CueError> {
        seed_outline(&mut self.doc, &self.page, lines)?;
        self.refresh_rows();
        Ok(())
    }

    /// Flatten the page into display rows.
    pub fn refresh_rows(&mut self) {
        fn walk(nodes: &[cue_doc::ContentNode], depth: usize, out: &mut Vec<Row>) {
            for node in nodes {
                out.push(Row {
                    id: node.id.clone(),
                    depth,
                    text: node.text.clone(),
                });
                walk(&node.children, depth + 1, out);
            }
        }

        let mut rows = Vec::new();
        walk(&self.doc.children(&self.page), 0, &mut rows);
        self.rows = rows;
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
    }

    pub fn selected_row(&self) -> Option<&Row> {
        self.rows.get(self.selected)
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    // ── Normal mode ────────────────────────────────────────────────────

    pub fn move_selection(&mut self, delta: isize) {
        if self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() as isize - 1;
        self.selected = (self.selected as isize + delta).clamp(0, last) as usize;
    }

    /// Start editing the selected block, creating one on an empty page.
    pub fn begin_edit(&mut self) -> Result<(), CueError> {
        if self.rows.is_empty() {
            self.doc.push_child(&self.page, "")?;
            self.refresh_rows();
        }
        let Some(row) = self.selected_row().cloned() else {
            return Ok(());
        };
        self.editor.node = Some(row.id);
        self.editor.caret = row.text.chars().count();
        self.editor.buffer = row.text;
        self.input_mode = InputMode::Insert;
        Ok(())
    }

    /// Insert an empty sibling below the selected block and edit it.
    pub fn open_below(&mut self) -> Result<(), CueError> {
        let parent_and_order = self.selected_row().and_then(|row| {
            let parent = self.doc.parent_id(&row.id)?;
            let order = self.doc.order_of(&row.id)?;
            Some((parent, order + 1))
        });
        let (parent, order) = parent_and_order.unwrap_or_else(|| (self.page.clone(), 0));
        let id = self.doc.create_node(NewNode::at(parent, order, ""))?;
        self.refresh_rows();
        if let Some(pos) = self.rows.iter().position(|r| r.id == id) {
            self.selected = pos;
        }
        self.begin_edit()
    }

    // ── Insert mode ────────────────────────────────────────────────────

    /// Feed a key to the open menu first, then to the block editor.
    ///
    /// Returns the selection when the key committed a menu option.
    pub fn insert_key(&mut self, input: KeyInput) -> Result<Option<Selection>, CueError> {
        use cue_core::Key;

        if self.controller.is_open() {
            match self.controller.on_key(&mut self.editor, input) {
                ControllerEvent::Commit(selection) => return Ok(Some(selection)),
                ControllerEvent::Consumed => return Ok(None),
                // Enter with nothing to select only closes the menu.
                ControllerEvent::Closed if matches!(input.key, Key::Escape | Key::Enter) => {
                    return Ok(None)
                }
                _ => {}
            }
        }

        let changed = match input.key {
            Key::Char(c) if !input.ctrl => {
                self.editor.insert(c);
                true
            }
            Key::Backspace => self.editor.backspace(),
            Key::Left => {
                self.editor.move_caret(-1);
                false
            }
            Key::Right => {
                self.editor.move_caret(1);
                false
            }
            Key::Enter => {
                self.finish_edit()?;
                self.open_below()?;
                false
            }
            Key::Escape => {
                self.finish_edit()?;
                self.controller.on_host_escape(&mut self.editor);
                self.input_mode = InputMode::Normal;
                false
            }
            _ => false,
        };

        if changed {
            self.write_buffer()?;
            let event = self.editor.input_event();
            self.controller
                .on_input(&mut self.session, &mut self.editor, &event);
        }
        Ok(None)
    }

    fn write_buffer(&mut self) -> Result<(), CueError> {
        if let Some(id) = self.editor.node.clone() {
            self.doc.update_node(&id, &self.editor.buffer)?;
            if let Some(row) = self.rows.iter_mut().find(|r| r.id == id) {
                row.text = self.editor.buffer.clone();
            }
        }
        Ok(())
    }

    fn finish_edit(&mut self) -> Result<(), CueError> {
        self.write_buffer()?;
        self.controller.close_menu(&mut self.editor);
        self.editor.node = None;
        self.refresh_rows();
        Ok(())
    }

    /// Run the synchronous half of a committed selection.
    ///
    /// Returns the prepared command when a backend request still has to be sent.
    pub fn commit(&mut self, selection: &Selection) -> Result<Option<Prepared>, CueError> {
        self.write_buffer()?;
        let prepared = self.session.prepare(&mut self.doc, selection)?;

        // The trigger was consumed in the document; reload the editor from it.
        if let Some(id) = self.editor.node.clone() {
            if let Some(text) = self.doc.node_text(&id) {
                self.editor.caret = text.chars().count();
                self.editor.buffer = text;
            }
        }

        let label = selection
            .model
            .as_ref()
            .map(|m| format!("{} · {}", selection.option.display_name, m.label()))
            .unwrap_or_else(|| selection.option.display_name.clone());

        if prepared.request.is_none() {
            prepared.finish(&mut self.doc, None)?;
            self.refresh_rows();
            self.set_status(label);
            return Ok(None);
        }

        self.pending += 1;
        self.state = AppState::Waiting;
        self.set_status(format!("{label}…"));
        Ok(Some(prepared))
    }

    /// Apply a finished request.
    pub fn apply_reply(&mut self, prepared: &Prepared, result: Result<serde_json::Value, String>) {
        self.pending = self.pending.saturating_sub(1);
        let outcome = match result {
            Ok(body) => prepared
                .finish(&mut self.doc, Some(&body))
                .map_err(|e| e.to_string()),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(0) => {
                self.state = self.idle_or_waiting();
                self.set_status(format!("{}: nothing inserted", prepared.option.display_name));
            }
            Ok(n) => {
                self.state = self.idle_or_waiting();
                self.set_status(format!("{}: {n} block(s) written", prepared.option.display_name));
            }
            Err(e) => {
                tracing::warn!(option = %prepared.option.id, error = %e, "request failed");
                self.state = AppState::Error;
                self.set_status(format!("Error: {e}"));
            }
        }
        self.refresh_rows();
    }

    fn idle_or_waiting(&self) -> AppState {
        if self.pending > 0 {
            AppState::Waiting
        } else {
            AppState::Idle
        }
    }

    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Page text for writing back to an outline file.
    pub fn outline_text(&self) -> String {
        write_outline(&self.doc.children(&self.page))
    }

    // ── Rendering ──────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(3),    // Outline
                Constraint::Length(1), // Footer
            ])
            .split(area);

        self.render_header(frame, chunks[0]);
        let anchor = self.render_outline(frame, chunks[1]);
        self.render_footer(frame, chunks[2]);

        if let Some(view) = self.controller.view() {
            Self::render_menu(frame, chunks[1], anchor, &view);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let (indicator, color) = match self.state {
            AppState::Idle => ("●", COLOR_ACCENT),
            AppState::Waiting => (
                match (self.tick / 3) % 4 {
                    0 => "⠋",
                    1 => "⠙",
                    2 => "⠸",
                    _ => "⠴",
                },
                COLOR_WAITING,
            ),
            AppState::Error => ("✖", COLOR_ERROR),
        };

        let title = self.doc.node_text(&self.page).unwrap_or_default();
        let line = Line::from(vec![
            Span::styled(format!(" {indicator} "), Style::default().fg(color)),
            Span::styled(title, Style::default().fg(COLOR_ACCENT).bold()),
            Span::styled(format!("  {}", self.status), Style::default().fg(COLOR_BAR_FG)),
        ]);
        frame.render_widget(
            Paragraph::new(line).style(Style::default().bg(COLOR_HEADER_BG)),
            area,
        );
    }

    /// Draw the rows and return the screen position under the edited block.
    fn render_outline(&self, frame: &mut Frame, area: Rect) -> Position {
        let height = area.height as usize;
        let skip = self.selected.saturating_sub(height.saturating_sub(1));

        let mut lines = Vec::new();
        let mut anchor = Position::new(area.x, area.y);
        for (i, row) in self.rows.iter().enumerate().skip(skip).take(height) {
            let indent = "  ".repeat(row.depth);
            let editing = self.input_mode == InputMode::Insert
                && self.editor.node.as_ref() == Some(&row.id);
            let text = if editing { &self.editor.buffer } else { &row.text };

            let mut spans = vec![Span::raw(format!(" {indent}• "))];
            spans.extend(block_spans(text));
            let mut line = Line::from(spans);
            if i == self.selected {
                line = line.style(Style::default().bg(COLOR_SELECTED_BG));
            }
            lines.push(line);

            if editing {
                let prefix = indent.chars().count() + 3;
                let x = area.x + (prefix + self.editor.caret) as u16;
                let y = area.y + (i - skip) as u16;
                frame.set_cursor_position(Position::new(x, y));
                anchor = Position::new(area.x + prefix as u16, y + 1);
            }
        }

        if lines.is_empty() {
            lines.push(Line::from(Span::styled(
                "  empty page: press i to start writing",
                Style::default().fg(COLOR_DIM),
            )));
        }
        frame.render_widget(Paragraph::new(lines), area);
        anchor
    }

    fn render_menu(frame: &mut Frame, bounds: Rect, anchor: Position, view: &MenuView) {
        let height = (view.rows.len() as u16 + 3).min(bounds.height);
        let width = MENU_WIDTH.min(bounds.width);
        let x = anchor.x.min(bounds.right().saturating_sub(width));
        let y = if anchor.y + height <= bounds.bottom() {
            anchor.y
        } else {
            bounds.bottom().saturating_sub(height)
        };
        let area = Rect::new(x, y, width, height);

        let mut lines: Vec<Line> = view
            .rows
            .iter()
            .map(|row| {
                let style = if row.active {
                    Style::default().fg(Color::Black).bg(COLOR_ACCENT).bold()
                } else {
                    Style::default()
                };
                Line::from(Span::styled(format!(" {} ", row.label), style))
            })
            .collect();

        let model_line = match (&view.model, view.model_position) {
            (Some(name), Some((i, n))) => {
                let style = if view.model_select {
                    Style::default().fg(COLOR_ACCENT).bold()
                } else {
                    Style::default().fg(COLOR_BAR_FG)
                };
                Span::styled(format!(" {name} ({}/{n})", i + 1), style)
            }
            _ => Span::styled(" no model", Style::default().fg(COLOR_DIM)),
        };
        lines.push(Line::from(model_line));

        let title = if view.filter.is_empty() {
            " cue ".to_string()
        } else {
            format!(" cue: {} ", view.filter)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(ratatui::widgets::BorderType::Rounded)
            .border_style(Style::default().fg(COLOR_ACCENT))
            .title(title);

        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let (mode, color, hint) = match self.input_mode {
            InputMode::Insert => ("INSERT", COLOR_ACCENT, "type the trigger to open the menu · Esc leaves "),
            InputMode::Normal => ("NORMAL", COLOR_DIM, "j/k move · i edit · o new block · q quit "),
        };
        let trigger = format!("  trigger {}", self.session.trigger().token());

        let mut spans = vec![
            Span::styled(format!(" {mode} "), Style::default().fg(Color::Black).bg(color).bold()),
            Span::styled(trigger, Style::default().fg(COLOR_BAR_FG)),
        ];
        let used: usize = spans.iter().map(|s| s.width()).sum::<usize>() + hint.len();
        spans.push(Span::raw(" ".repeat((area.width as usize).saturating_sub(used))));
        spans.push(Span::styled(hint, Style::default().fg(COLOR_DIM)));

        frame.render_widget(
            Paragraph::new(Line::from(spans)).style(Style::default().bg(COLOR_HEADER_BG)),
            area,
        );
    }
}

/// Style page links and the assistant marker inside a block.
fn block_spans(text: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    let mut rest = text;

    if let Some(after) = rest.strip_prefix(ASSISTANT_MARKER) {
        spans.push(Span::styled(ASSISTANT_MARKER, Style::default().fg(COLOR_ASSISTANT).bold()));
        rest = after;
    }

    while let Some(start) = rest.find("[[") {
        let Some(len) = rest[start..].find("]]") else {
            break;
        };
        if start > 0 {
            spans.push(Span::raw(&rest[..start]));
        }
        let end = start + len + 2;
        spans.push(Span::styled(&rest[start..end], Style::default().fg(COLOR_LINK)));
        rest = &rest[end..];
    }

    if !rest.is_empty() || spans.is_empty() {
        spans.push(Span::raw(rest));
    }
    spans
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use cue_core::{parse_outline, Key, Settings};

    fn app() -> App {
        App::new(Session::new(Settings::default()).unwrap(), "Notes")
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.insert_key(KeyInput::plain(Key::Char(c))).unwrap();
        }
    }

    #[test]
    fn test_app_creation() {
        let app = app();
        assert_eq!(app.state, AppState::Idle);
        assert!(app.running);
        assert!(app.rows.is_empty());
        assert!(!app.controller.is_open());
    }

    #[test]
    fn test_seed_outline_depths() {
        let mut app = app();
        let lines = parse_outline("- Geography facts\n\t- Water\n\t- Paris\n- Other\n");
        app.seed_outline(&lines).unwrap();
        let depths: Vec<_> = app.rows.iter().map(|r| (r.depth, r.text.as_str())).collect();
        assert_eq!(
            depths,
            vec![(0, "Geography facts"), (1, "Water"), (1, "Paris"), (0, "Other")]
        );
        assert_eq!(app.outline_text(), "- Geography facts\n\t- Water\n\t- Paris\n- Other\n");
    }

    #[test]
    fn test_editing_writes_through() {
        let mut app = app();
        app.begin_edit().unwrap();
        type_str(&mut app, "hi");
        app.insert_key(KeyInput::plain(Key::Backspace)).unwrap();
        let id = app.editor.node.clone().unwrap();
        assert_eq!(app.doc.node_text(&id).as_deref(), Some("h"));
        assert_eq!(app.editor.caret, 1);
    }

    #[test]
    fn test_trigger_opens_menu_and_keys_are_consumed() {
        let mut app = app();
        app.begin_edit().unwrap();
        type_str(&mut app, "Paris qq");
        assert!(app.controller.is_open());
        assert!(app.editor.is_attached());

        app.insert_key(KeyInput::plain(Key::Down)).unwrap();
        assert!(app.controller.view().unwrap().rows[1].active);
        assert_eq!(app.editor.buffer, "Paris qq");

        app.insert_key(KeyInput::plain(Key::Escape)).unwrap();
        assert!(!app.controller.is_open());
        assert!(!app.editor.is_attached());
        assert_eq!(app.input_mode, InputMode::Insert);
    }

    #[test]
    fn test_backspace_past_trigger_closes() {
        let mut app = app();
        app.begin_edit().unwrap();
        type_str(&mut app, "ab qq");
        app.insert_key(KeyInput::plain(Key::Backspace)).unwrap();
        assert!(!app.controller.is_open());
        assert_eq!(app.editor.buffer, "ab q");
    }

    #[test]
    fn test_commit_local_option() {
        let mut app = app();
        app.begin_edit().unwrap();
        type_str(&mut app, "Plan qq");
        let opened = app
            .controller
            .view()
            .unwrap()
            .rows
            .iter()
            .position(|r| r.label == "New chat page")
            .unwrap();
        for _ in 0..opened {
            app.insert_key(KeyInput::plain(Key::Down)).unwrap();
        }
        let selection = app.insert_key(KeyInput::plain(Key::Enter)).unwrap().unwrap();
        assert!(app.commit(&selection).unwrap().is_none());

        assert_eq!(app.editor.buffer, "Plan ");
        assert!(app.rows.iter().any(|r| r.depth == 1 && r.text.starts_with("[[ChatRoom ")));
        assert_eq!(app.pending, 0);
    }

    #[test]
    fn test_commit_and_apply_completion() {
        let mut app = app();
        app.begin_edit().unwrap();
        type_str(&mut app, "Fruits qq");
        let selection = app.insert_key(KeyInput::plain(Key::Enter)).unwrap().unwrap();
        let prepared = app.commit(&selection).unwrap().unwrap();
        assert_eq!(app.state, AppState::Waiting);
        assert!(prepared.request.is_some());

        let body = serde_json::json!({"choices": [{"text": "apple\npear"}]});
        app.apply_reply(&prepared, Ok(body));
        assert_eq!(app.state, AppState::Idle);
        let children: Vec<_> = app.rows.iter().filter(|r| r.depth == 1).map(|r| r.text.as_str()).collect();
        assert_eq!(children, vec!["apple", "pear"]);
    }

    #[test]
    fn test_apply_transport_error() {
        let mut app = app();
        app.begin_edit().unwrap();
        type_str(&mut app, "x qq");
        let selection = app.insert_key(KeyInput::plain(Key::Enter)).unwrap().unwrap();
        let prepared = app.commit(&selection).unwrap().unwrap();
        app.apply_reply(&prepared, Err("connection refused".to_string()));
        assert_eq!(app.state, AppState::Error);
        assert!(app.status.contains("connection refused"));
        assert_eq!(app.rows.len(), 1);
    }

    fn fuzzy_app() -> App {
        let mut settings = Settings::default();
        settings.set_fuzzy_filter("true");
        App::new(Session::new(settings).unwrap(), "Notes")
    }

    #[test]
    fn test_enter_with_no_match_only_closes_menu() {
        let mut app = fuzzy_app();
        app.begin_edit().unwrap();
        type_str(&mut app, "Notes qqzzz");
        assert!(app.controller.view().unwrap().rows.is_empty());

        assert!(app.insert_key(KeyInput::plain(Key::Enter)).unwrap().is_none());
        assert!(!app.controller.is_open());
        assert_eq!(app.rows.len(), 1);
        assert_eq!(app.input_mode, InputMode::Insert);
        assert_eq!(app.editor.buffer, "Notes qqzzz");
    }

    #[test]
    fn test_commit_removes_typed_filter() {
        let mut app = fuzzy_app();
        app.begin_edit().unwrap();
        type_str(&mut app, "Draw a cat qqimg");
        let selection = app.insert_key(KeyInput::plain(Key::Enter)).unwrap().unwrap();
        assert_eq!(selection.option.id, "image");

        let prepared = app.commit(&selection).unwrap().unwrap();
        assert_eq!(prepared.request.unwrap().body["prompt"], "Draw a cat ");
        assert_eq!(app.editor.buffer, "Draw a cat ");
    }

    #[test]
    fn test_outline_text_is_lossless() {
        let mut app = app();
        let source = "- a\n- \n\t- child\n- I really like qq\n";
        app.seed_outline(&parse_outline(source)).unwrap();
        assert_eq!(app.outline_text(), source);
    }

    #[test]
    fn test_open_below_inserts_sibling() {
        let mut app = app();
        app.seed_outline(&parse_outline("- a\n- c\n")).unwrap();
        app.open_below().unwrap();
        let texts: Vec<_> = app.rows.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "", "c"]);
        assert_eq!(app.selected, 1);
        assert_eq!(app.input_mode, InputMode::Insert);
    }

    #[test]
    fn test_move_selection_clamps() {
        let mut app = app();
        app.seed_outline(&parse_outline("- a\n- b\n")).unwrap();
        app.move_selection(-1);
        assert_eq!(app.selected, 0);
        app.move_selection(5);
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn test_block_spans() {
        assert_eq!(block_spans("plain").len(), 1);
        assert_eq!(block_spans("see [[Paris]] now").len(), 3);
        assert_eq!(block_spans("[assistant]: hi").len(), 2);
        assert_eq!(block_spans("").len(), 1);
    }
}
