//! The editing session: one document, its history, and the controller
//! driving it.
//!
//! Hosts forward raw input to [`EditSession::handle_event`] and paint with
//! [`EditSession::paint`]. Programmatic edits go through the same command
//! path as interactive ones, so everything a user can do is undoable.

use crate::background::{BackgroundImage, ImageHandle};
use crate::commands::{Command, UndoManager};
use crate::config::EditorConfig;
use crate::controller::{InteractionController, Mode};
use crate::input::InputEvent;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use lw_core::{Document, LineId, LoadReport, Point, Renderer, paint_document};
use std::path::Path;

pub struct EditSession {
    doc: Document,
    history: UndoManager,
    controller: InteractionController,
    config: EditorConfig,
    background: Option<Box<dyn BackgroundImage>>,
    /// Last message for the user (e.g. a failed background load).
    status: Option<String>,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditSession {
    pub fn new(config: EditorConfig) -> Self {
        let config = config.validated();
        Self {
            doc: Document::new(),
            history: UndoManager::new(config.max_undo_depth),
            controller: InteractionController::new(),
            config,
            background: None,
            status: None,
        }
    }

    /// Attach the host's background image loader.
    pub fn with_background(mut self, background: Box<dyn BackgroundImage>) -> Self {
        self.background = Some(background);
        self
    }

    // ─── Accessors ────────────────────────────────────────────────────────

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.controller.mode()
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn background_visible(&self) -> bool {
        self.background.as_ref().is_some_and(|b| b.is_visible())
    }

    /// Consume the pending redraw request.
    pub fn take_redraw(&mut self) -> bool {
        self.doc.take_redraw()
    }

    // ─── Input ────────────────────────────────────────────────────────────

    /// Route one host event. Returns `true` if the document or the view
    /// changed in a way that was committed (a command, a mode switch, a
    /// background toggle).
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        if let InputEvent::Key { key, modifiers } = event {
            return match ShortcutMap::resolve(key, *modifiers) {
                Some(action) => self.perform(action),
                None => false,
            };
        }
        self.controller
            .handle(event, &mut self.doc, &mut self.history, &self.config)
    }

    pub fn perform(&mut self, action: ShortcutAction) -> bool {
        log::debug!("shortcut: {action:?}");
        match action {
            ShortcutAction::ToggleMode => {
                self.controller.toggle_mode(&mut self.doc);
                true
            }
            ShortcutAction::Undo => self.undo().is_some(),
            ShortcutAction::Redo => self.redo().is_some(),
            ShortcutAction::DeleteLine => self
                .doc
                .selection()
                .is_some_and(|id| self.delete_line(id)),
            ShortcutAction::Deselect => self.set_selection(None),
            ShortcutAction::ToggleBackground => self.toggle_background(),
        }
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.controller.set_mode(mode, &mut self.doc);
    }

    // ─── Document operations ──────────────────────────────────────────────

    /// Add a line through `points` and select it. `None` if fewer than two
    /// points are given.
    pub fn add_line(&mut self, points: &[Point], smoothed: bool) -> Option<LineId> {
        let cmd = Command::line_add(&mut self.doc, points, smoothed)?;
        let line = match &cmd {
            Command::LineAdd { line, .. } => *line,
            _ => return None,
        };
        self.execute(cmd).then_some(line)
    }

    /// Soft-delete a line, clearing the selection if it was selected.
    pub fn delete_line(&mut self, line: LineId) -> bool {
        Command::line_delete(&self.doc, line).is_some_and(|cmd| self.execute(cmd))
    }

    /// Select `line` (or nothing). Unchanged selections record nothing.
    pub fn set_selection(&mut self, line: Option<LineId>) -> bool {
        Command::selection_change(&self.doc, line).is_some_and(|cmd| self.execute(cmd))
    }

    pub fn insert_handle(&mut self, line: LineId, index: usize, position: Point) -> bool {
        Command::handle_add(&mut self.doc, line, index, position)
            .is_some_and(|cmd| self.execute(cmd))
    }

    pub fn remove_handle(&mut self, line: LineId, index: usize) -> bool {
        Command::handle_delete(&self.doc, line, index).is_some_and(|cmd| self.execute(cmd))
    }

    /// Move a handle to an absolute position as one undoable step.
    pub fn move_handle_to(&mut self, line: LineId, index: usize, to: Point) -> bool {
        let Some(from) = self.doc.handle(line, index).map(|h| h.position) else {
            return false;
        };
        Command::handle_move(&self.doc, line, index, from, to)
            .is_some_and(|cmd| self.execute(cmd))
    }

    fn execute(&mut self, cmd: Command) -> bool {
        self.controller.cancel(&mut self.doc);
        self.history.execute(&mut self.doc, cmd)
    }

    /// Undo the last command; `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<String> {
        self.controller.cancel(&mut self.doc);
        self.history.undo(&mut self.doc)
    }

    /// Redo the last undone command; `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<String> {
        self.controller.cancel(&mut self.doc);
        self.history.redo(&mut self.doc)
    }

    // ─── Persistence ──────────────────────────────────────────────────────

    /// Replace the document with the lines in `text`. Malformed records are
    /// skipped and listed in the report. History is cleared.
    pub fn load(&mut self, text: &str) -> LoadReport {
        self.controller.cancel(&mut self.doc);
        let mut doc = Document::new();
        let report = doc.load(text, self.config.smooth_new_lines);
        doc.request_redraw();
        self.doc = doc;
        self.history.clear();
        self.status = (!report.is_clean())
            .then(|| format!("skipped {} malformed record(s)", report.skipped.len()));
        report
    }

    pub fn save(&self) -> String {
        self.doc.to_text()
    }

    // ─── Painting ─────────────────────────────────────────────────────────

    pub fn paint(&self, renderer: &mut dyn Renderer) {
        paint_document(&self.doc, renderer, &self.controller.overlay());
    }

    /// Take the hit tolerance from the renderer, so handles are hit exactly
    /// where they are drawn. Hosts call this once after creating their
    /// renderer.
    pub fn adopt_hit_radius(&mut self, renderer: &dyn Renderer) {
        let config = EditorConfig {
            hit_radius: renderer.hit_radius(),
            ..self.config.clone()
        };
        self.config = config.validated();
        log::debug!("hit radius: {}", self.config.hit_radius);
    }

    // ─── Background ───────────────────────────────────────────────────────

    /// Load a background reference image. Failures are kept as the session
    /// status; the document and history are untouched.
    pub fn load_background(&mut self, path: &Path) -> Result<ImageHandle, String> {
        let result = match self.background.as_mut() {
            Some(bg) => bg.load_image(path),
            None => Err("no background image support".to_string()),
        };
        match &result {
            Ok(_) => {
                self.status = None;
                self.doc.request_redraw();
            }
            Err(e) => {
                log::warn!("{e}");
                self.status = Some(e.clone());
            }
        }
        result
    }

    pub fn toggle_background(&mut self) -> bool {
        let Some(bg) = self.background.as_mut() else {
            return false;
        };
        let before = bg.is_visible();
        bg.toggle_visible();
        let changed = bg.is_visible() != before;
        if changed {
            self.doc.request_redraw();
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::FileBackground;
    use crate::input::Modifiers;
    use lw_core::render::RecordingRenderer;
    use pretty_assertions::assert_eq;

    fn pts(raw: &[(f64, f64)]) -> Vec<Point> {
        raw.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn add_line_selects_and_undoes() {
        let mut s = EditSession::default();
        let id = s.add_line(&pts(&[(0.0, 0.0), (9.0, 9.0)]), false).unwrap();
        assert_eq!(s.document().selection(), Some(id));
        assert_eq!(s.undo().as_deref(), Some("Add line"));
        assert_eq!(s.document().len_visible(), 0);
        assert_eq!(s.document().selection(), None);
        assert_eq!(s.undo(), None);
    }

    #[test]
    fn delete_key_removes_selected_line() {
        let mut s = EditSession::default();
        let id = s.add_line(&pts(&[(0.0, 0.0), (9.0, 9.0)]), false).unwrap();
        assert!(s.handle_event(&InputEvent::key("Delete", Modifiers::NONE)));
        assert!(!s.document().line(id).unwrap().is_visible());
        assert_eq!(s.save(), "");

        assert!(s.handle_event(&InputEvent::key("z", Modifiers::CMD)));
        assert!(s.document().line(id).unwrap().is_visible());
        assert_eq!(s.document().selection(), Some(id));
    }

    #[test]
    fn delete_without_selection_is_a_no_op() {
        let mut s = EditSession::default();
        assert!(!s.perform(ShortcutAction::DeleteLine));
        assert!(!s.can_undo());
    }

    #[test]
    fn tab_toggles_mode() {
        let mut s = EditSession::default();
        assert_eq!(s.mode(), Mode::Create);
        s.handle_event(&InputEvent::key("Tab", Modifiers::NONE));
        assert_eq!(s.mode(), Mode::Edit);
    }

    #[test]
    fn load_replaces_document_and_history() {
        let mut s = EditSession::default();
        s.add_line(&pts(&[(0.0, 0.0), (9.0, 9.0)]), false);
        let report = s.load("1,2,3,4\nbad\n");
        assert_eq!(report.records.len(), 1);
        assert_eq!(s.document().len_visible(), 1);
        assert!(!s.can_undo());
        assert_eq!(s.status(), Some("skipped 1 malformed record(s)"));
        assert_eq!(s.save(), "1,2,3,4\n");
    }

    #[test]
    fn missing_background_reports_status() {
        let mut s = EditSession::default().with_background(Box::new(FileBackground::new()));
        s.add_line(&pts(&[(0.0, 0.0), (9.0, 9.0)]), false);
        let before = s.save();
        let err = s
            .load_background(Path::new("/no/such/image.png"))
            .unwrap_err();
        assert_eq!(s.status(), Some(err.as_str()));
        assert_eq!(s.save(), before);
        assert_eq!(s.history.undo_len(), 1);
        assert!(!s.toggle_background());
    }

    #[test]
    fn programmatic_handle_edits_are_undoable() {
        let mut s = EditSession::default();
        let id = s.add_line(&pts(&[(0.0, 0.0), (100.0, 0.0)]), false).unwrap();
        assert!(s.insert_handle(id, 1, Point::new(50.0, 10.0)));
        assert!(s.move_handle_to(id, 1, Point::new(50.0, 30.0)));
        assert!(s.remove_handle(id, 0));
        assert!(!s.remove_handle(id, 0));
        assert_eq!(s.save(), "50,30,100,0\n");

        s.undo();
        s.undo();
        assert_eq!(s.save(), "0,0,50,10,100,0\n");
    }

    /// Draws nothing, but with wider handles than the default.
    struct WideHandles;

    impl Renderer for WideHandles {
        fn draw_polyline(&mut self, _: &[Point], _: bool, _: bool) {}

        fn draw_handle(&mut self, _: Point, _: bool) {}

        fn hit_radius(&self) -> f64 {
            8.0
        }
    }

    #[test]
    fn hit_radius_follows_renderer() {
        let mut s = EditSession::default();
        let id = s.add_line(&pts(&[(0.0, 0.0), (100.0, 0.0)]), false).unwrap();
        s.set_mode(Mode::Edit);

        s.handle_event(&InputEvent::pointer_move(7.0, 7.0));
        assert_eq!(s.controller().hovered(), None);

        s.adopt_hit_radius(&WideHandles);
        assert_eq!(s.config().hit_radius, 8.0);
        s.handle_event(&InputEvent::pointer_move(7.0, 6.0));
        let hovered = s.controller().hovered().unwrap();
        assert_eq!((hovered.line, hovered.index), (id, 0));
    }

    #[test]
    fn paint_shows_handles_in_edit_mode() {
        let mut s = EditSession::default();
        s.add_line(&pts(&[(0.0, 0.0), (9.0, 9.0)]), false);
        s.set_mode(Mode::Edit);
        let mut r = RecordingRenderer::new();
        s.paint(&mut r);
        assert_eq!(r.polylines().count(), 1);
        assert_eq!(r.calls.len(), 3);
    }
}
