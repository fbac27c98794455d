//! Pointer interaction state machine.
//!
//! Two modes, Create and Edit. Each turns pointer gestures into document
//! mutations: transient ones (rubber-band preview, in-drag handle moves)
//! go straight to the document, committed ones are wrapped in a
//! [`Command`] and executed through the [`UndoManager`].
//!
//! ## Gestures
//!
//! | Mode   | Gesture                  | Result                  |
//! |--------|--------------------------|-------------------------|
//! | Create | press, drag, release     | `LineAdd` anchor→release|
//! | Edit   | drag a handle            | one `HandleMove`        |
//! | Edit   | ⌘-click a handle         | `HandleDelete`          |
//! | Edit   | ⌘-click a line           | `HandleAdd`             |
//! | Edit   | click anything / nothing | `SelectionChange`       |

use crate::commands::{Command, UndoManager};
use crate::config::EditorConfig;
use crate::input::{InputEvent, Modifiers};
use lw_core::{Document, HandleRef, LineHit, LineId, Overlay, Point};

/// Interaction mode. Applies to every line at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Create,
    Edit,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Create => Self::Edit,
            Self::Edit => Self::Create,
        }
    }
}

/// What an Edit-mode press landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Target {
    Handle(HandleRef),
    Line(LineHit),
    Empty,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum Gesture {
    #[default]
    Idle,
    /// Create mode: rubber band from `anchor` to `current`.
    Drawing { anchor: Point, current: Point },
    /// Edit mode: moving a handle. `from` is its pre-drag position.
    Dragging {
        target: HandleRef,
        press: Point,
        from: Point,
        last: Point,
    },
    /// Edit mode: a press that only means something if released as a click.
    Pressed {
        target: Target,
        press: Point,
        modifiers: Modifiers,
    },
}

/// Turns pointer events into document edits.
#[derive(Debug, Default)]
pub struct InteractionController {
    mode: Mode,
    gesture: Gesture,
    hovered: Option<HandleRef>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch mode immediately. A gesture in progress is abandoned: an
    /// unfinished drag snaps its handle back and records nothing.
    pub fn set_mode(&mut self, mode: Mode, doc: &mut Document) {
        if mode == self.mode {
            return;
        }
        self.cancel(doc);
        self.hovered = None;
        self.mode = mode;
        log::debug!("mode: {mode:?}");
        doc.request_redraw();
    }

    pub fn toggle_mode(&mut self, doc: &mut Document) {
        self.set_mode(self.mode.toggled(), doc);
    }

    /// Abandon the current gesture without committing anything. Hover is
    /// dropped too; the next pointer move re-derives it.
    pub fn cancel(&mut self, doc: &mut Document) {
        if self.hovered.take().is_some() {
            doc.request_redraw();
        }
        match std::mem::take(&mut self.gesture) {
            Gesture::Dragging { target, from, .. } => {
                doc.set_handle_position(target.line, target.index, from);
            }
            Gesture::Drawing { .. } => doc.request_redraw(),
            Gesture::Pressed { .. } | Gesture::Idle => {}
        }
    }

    pub fn hovered(&self) -> Option<HandleRef> {
        self.hovered
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging { .. })
    }

    /// Presentational state for the painter.
    pub fn overlay(&self) -> Overlay {
        Overlay {
            handles_visible: self.mode == Mode::Edit,
            hovered: self.hovered,
            preview: match self.gesture {
                Gesture::Drawing { anchor, current } => Some((anchor, current)),
                _ => None,
            },
        }
    }

    /// Feed one event. Returns `true` if a command was committed.
    /// Key events are ignored here; see [`crate::shortcuts`].
    pub fn handle(
        &mut self,
        event: &InputEvent,
        doc: &mut Document,
        history: &mut UndoManager,
        config: &EditorConfig,
    ) -> bool {
        match (self.mode, event) {
            (_, InputEvent::Key { .. }) => false,
            (Mode::Create, InputEvent::PointerDown { x, y, .. }) => {
                let p = Point::new(*x, *y);
                self.gesture = Gesture::Drawing {
                    anchor: p,
                    current: p,
                };
                false
            }
            (Mode::Create, InputEvent::PointerMove { x, y, .. }) => {
                if let Gesture::Drawing { current, .. } = &mut self.gesture {
                    *current = Point::new(*x, *y);
                    doc.request_redraw();
                }
                false
            }
            (Mode::Create, InputEvent::PointerUp { x, y, .. }) => {
                let Gesture::Drawing { anchor, .. } = std::mem::take(&mut self.gesture) else {
                    return false;
                };
                doc.request_redraw();
                let release = Point::new(*x, *y);
                if anchor.distance(release) <= config.click_tolerance {
                    return false;
                }
                Command::line_add(doc, &[anchor, release], config.smooth_new_lines)
                    .is_some_and(|cmd| history.execute(doc, cmd))
            }
            (Mode::Edit, InputEvent::PointerDown { x, y, modifiers }) => {
                self.press(Point::new(*x, *y), *modifiers, doc, config);
                false
            }
            (Mode::Edit, InputEvent::PointerMove { x, y, .. }) => {
                self.motion(Point::new(*x, *y), doc, config);
                false
            }
            (Mode::Edit, InputEvent::PointerUp { x, y, .. }) => {
                let p = Point::new(*x, *y);
                let committed = self.release(p, doc, history, config);
                if committed {
                    self.refresh_hover(p, doc, config);
                }
                committed
            }
        }
    }

    // ─── Edit mode ────────────────────────────────────────────────────────

    fn press(&mut self, p: Point, modifiers: Modifiers, doc: &Document, config: &EditorConfig) {
        let target = if let Some(handle) = doc.handle_at(p, config.hit_radius) {
            Target::Handle(handle)
        } else if let Some(hit) = doc.hit_line(p, config.hit_radius) {
            Target::Line(hit)
        } else {
            Target::Empty
        };

        self.gesture = match target {
            Target::Handle(handle) if !modifiers.cmd() => {
                let Some(from) = doc.handle(handle.line, handle.index).map(|h| h.position) else {
                    return;
                };
                Gesture::Dragging {
                    target: handle,
                    press: p,
                    from,
                    last: p,
                }
            }
            _ => Gesture::Pressed {
                target,
                press: p,
                modifiers,
            },
        };
    }

    fn motion(&mut self, p: Point, doc: &mut Document, config: &EditorConfig) {
        match &mut self.gesture {
            Gesture::Dragging { target, last, .. } => {
                let delta = p - *last;
                doc.move_handle(target.line, target.index, delta.x, delta.y);
                *last = p;
            }
            Gesture::Idle => self.refresh_hover(p, doc, config),
            Gesture::Drawing { .. } | Gesture::Pressed { .. } => {}
        }
    }

    /// Re-derive the hovered handle from the pointer position.
    fn refresh_hover(&mut self, p: Point, doc: &mut Document, config: &EditorConfig) {
        let hovered = doc.handle_at(p, config.hit_radius);
        if hovered != self.hovered {
            self.hovered = hovered;
            doc.request_redraw();
        }
    }

    fn release(
        &mut self,
        p: Point,
        doc: &mut Document,
        history: &mut UndoManager,
        config: &EditorConfig,
    ) -> bool {
        match std::mem::take(&mut self.gesture) {
            Gesture::Dragging {
                target,
                press,
                from,
                last,
            } => {
                let delta = p - last;
                doc.move_handle(target.line, target.index, delta.x, delta.y);

                if press.distance(p) <= config.click_tolerance {
                    // A click on a handle selects its line.
                    doc.set_handle_position(target.line, target.index, from);
                    return Self::select(Some(target.line), doc, history);
                }
                let Some(to) = doc.handle(target.line, target.index).map(|h| h.position) else {
                    return false;
                };
                Command::handle_move(doc, target.line, target.index, from, to)
                    .is_some_and(|cmd| history.execute(doc, cmd))
            }
            Gesture::Pressed {
                target,
                press,
                modifiers,
            } => {
                if press.distance(p) > config.click_tolerance {
                    return false;
                }
                match target {
                    Target::Handle(handle) if modifiers.cmd() => {
                        Command::handle_delete(doc, handle.line, handle.index)
                            .is_some_and(|cmd| history.execute(doc, cmd))
                    }
                    Target::Line(hit) if modifiers.cmd() => Command::handle_add(
                        doc,
                        hit.line,
                        hit.nearest.segment + 1,
                        hit.nearest.point,
                    )
                    .is_some_and(|cmd| history.execute(doc, cmd)),
                    Target::Handle(handle) => Self::select(Some(handle.line), doc, history),
                    Target::Line(hit) => Self::select(Some(hit.line), doc, history),
                    Target::Empty => Self::select(None, doc, history),
                }
            }
            Gesture::Drawing { .. } | Gesture::Idle => false,
        }
    }

    fn select(line: Option<LineId>, doc: &mut Document, history: &mut UndoManager) -> bool {
        Command::selection_change(doc, line).is_some_and(|cmd| history.execute(doc, cmd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Rig {
        doc: Document,
        history: UndoManager,
        config: EditorConfig,
        ctl: InteractionController,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                doc: Document::new(),
                history: UndoManager::new(50),
                config: EditorConfig {
                    smooth_new_lines: false,
                    ..EditorConfig::default()
                },
                ctl: InteractionController::new(),
            }
        }

        fn send(&mut self, event: InputEvent) -> bool {
            self.ctl
                .handle(&event, &mut self.doc, &mut self.history, &self.config)
        }

        fn edit(&mut self) {
            self.ctl.set_mode(Mode::Edit, &mut self.doc);
        }
    }

    fn cmd_down(x: f64, y: f64) -> InputEvent {
        InputEvent::PointerDown {
            x,
            y,
            modifiers: Modifiers::CMD,
        }
    }

    fn cmd_up(x: f64, y: f64) -> InputEvent {
        InputEvent::PointerUp {
            x,
            y,
            modifiers: Modifiers::CMD,
        }
    }

    #[test]
    fn create_drag_commits_one_line() {
        let mut rig = Rig::new();
        rig.send(InputEvent::pointer_down(50.0, 50.0));
        rig.send(InputEvent::pointer_move(100.0, 60.0));
        assert_eq!(
            rig.ctl.overlay().preview,
            Some((Point::new(50.0, 50.0), Point::new(100.0, 60.0)))
        );
        assert_eq!(rig.doc.len_visible(), 0);

        assert!(rig.send(InputEvent::pointer_up(160.0, 70.0)));
        assert_eq!(rig.doc.len_visible(), 1);
        assert_eq!(rig.history.undo_len(), 1);
        assert_eq!(rig.ctl.overlay().preview, None);
        let line = rig.doc.visible_lines().next().unwrap();
        assert_eq!(
            line.points(),
            vec![Point::new(50.0, 50.0), Point::new(160.0, 70.0)]
        );
        assert_eq!(rig.doc.selection(), Some(line.id));
    }

    #[test]
    fn create_click_without_travel_adds_nothing() {
        let mut rig = Rig::new();
        rig.send(InputEvent::pointer_down(10.0, 10.0));
        assert!(!rig.send(InputEvent::pointer_up(10.0, 10.0)));
        assert_eq!(rig.doc.lines().len(), 0);
        assert!(!rig.history.can_undo());
    }

    #[test]
    fn drag_records_one_move() {
        let mut rig = Rig::new();
        let id = rig
            .doc
            .create_line(&[Point::new(0.0, 0.0), Point::new(100.0, 0.0)], false)
            .unwrap();
        rig.edit();

        rig.send(InputEvent::pointer_down(100.0, 0.0));
        assert!(rig.ctl.is_dragging());
        for step in 1..=5 {
            rig.send(InputEvent::pointer_move(100.0, step as f64 * 4.0));
        }
        assert_eq!(rig.history.undo_len(), 0);
        assert!(rig.send(InputEvent::pointer_up(100.0, 20.0)));
        assert_eq!(rig.history.undo_len(), 1);
        assert_eq!(rig.doc.handle(id, 1).unwrap().position, Point::new(100.0, 20.0));

        rig.history.undo(&mut rig.doc);
        assert_eq!(rig.doc.handle(id, 1).unwrap().position, Point::new(100.0, 0.0));
    }

    #[test]
    fn handle_click_selects_without_moving() {
        let mut rig = Rig::new();
        let id = rig
            .doc
            .create_line(&[Point::new(0.0, 0.0), Point::new(100.0, 0.0)], false)
            .unwrap();
        rig.edit();
        rig.send(InputEvent::pointer_down(1.0, 1.0));
        assert!(rig.send(InputEvent::pointer_up(1.0, 1.0)));
        assert_eq!(rig.doc.selection(), Some(id));
        assert_eq!(rig.doc.handle(id, 0).unwrap().position, Point::ZERO);
        assert_eq!(
            rig.history.undo(&mut rig.doc).as_deref(),
            Some("Change selection")
        );
    }

    #[test]
    fn cmd_click_handle_deletes_it() {
        let mut rig = Rig::new();
        let id = rig
            .doc
            .create_line(
                &[Point::new(0.0, 0.0), Point::new(50.0, 30.0), Point::new(100.0, 0.0)],
                false,
            )
            .unwrap();
        rig.edit();
        rig.send(cmd_down(50.0, 30.0));
        assert!(!rig.ctl.is_dragging());
        assert!(rig.send(cmd_up(50.0, 30.0)));
        assert_eq!(rig.doc.line(id).unwrap().len(), 2);

        // At the minimum a second delete is refused.
        rig.send(cmd_down(0.0, 0.0));
        assert!(!rig.send(cmd_up(0.0, 0.0)));
        assert_eq!(rig.doc.line(id).unwrap().len(), 2);
    }

    #[test]
    fn cmd_click_interior_inserts_between_neighbours() {
        let mut rig = Rig::new();
        let id = rig
            .doc
            .create_line(
                &[Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(200.0, 0.0)],
                false,
            )
            .unwrap();
        rig.edit();
        rig.send(cmd_down(150.0, 2.0));
        assert!(rig.send(cmd_up(150.0, 2.0)));
        let line = rig.doc.line(id).unwrap();
        assert_eq!(line.len(), 4);
        assert_eq!(line.handle(2).unwrap().position, Point::new(150.0, 0.0));
    }

    #[test]
    fn hover_tracks_handles_in_edit_mode_only() {
        let mut rig = Rig::new();
        let id = rig
            .doc
            .create_line(&[Point::new(0.0, 0.0), Point::new(100.0, 0.0)], false)
            .unwrap();
        rig.send(InputEvent::pointer_move(99.0, 1.0));
        assert_eq!(rig.ctl.hovered(), None);

        rig.edit();
        rig.doc.take_redraw();
        rig.send(InputEvent::pointer_move(99.0, 1.0));
        let hovered = rig.ctl.hovered().unwrap();
        assert_eq!((hovered.line, hovered.index), (id, 1));
        assert!(rig.doc.take_redraw());
        assert!(rig.ctl.overlay().handles_visible);
        assert!(!rig.history.can_undo());
    }

    #[test]
    fn mode_switch_mid_drag_restores_handle() {
        let mut rig = Rig::new();
        let id = rig
            .doc
            .create_line(&[Point::new(0.0, 0.0), Point::new(100.0, 0.0)], false)
            .unwrap();
        rig.edit();
        rig.send(InputEvent::pointer_down(0.0, 0.0));
        rig.send(InputEvent::pointer_move(30.0, 30.0));
        rig.ctl.toggle_mode(&mut rig.doc);
        assert_eq!(rig.ctl.mode(), Mode::Create);
        assert_eq!(rig.doc.handle(id, 0).unwrap().position, Point::ZERO);
        assert!(!rig.send(InputEvent::pointer_up(30.0, 30.0)));
        assert!(!rig.history.can_undo());
    }

    #[test]
    fn click_tolerance_absorbs_jitter() {
        let mut rig = Rig::new();
        rig.config.click_tolerance = 3.0;
        let id = rig
            .doc
            .create_line(&[Point::new(0.0, 0.0), Point::new(100.0, 0.0)], false)
            .unwrap();
        rig.edit();
        rig.send(InputEvent::pointer_down(50.0, 0.0));
        assert!(rig.send(InputEvent::pointer_up(51.0, 1.0)));
        assert_eq!(rig.doc.selection(), Some(id));
    }
}
