//! Undo/Redo command stack.
//!
//! Every committed mutation is wrapped in a reversible `Command` holding
//! exactly the before/after state needed to invert itself: entity ids and
//! positions, never references into the document. Commands are built by
//! constructors that read the pre-mutation state and return `None` when the
//! mutation would be a no-op or violate an invariant, so an invalid request
//! never reaches the history.
//!
//! A command on the undo stack is applied; a command on the redo stack is
//! pending. `undo` and `redo` move it between the two.

use lw_core::{Document, HandleId, Line, LineId, MIN_HANDLES, Point};
use smallvec::SmallVec;

/// A reversible record of one committed mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// A new line, which also becomes the selection.
    LineAdd {
        line: LineId,
        handles: SmallVec<[(HandleId, Point); 4]>,
        smoothed: bool,
        previous_selection: Option<LineId>,
    },
    /// Soft-delete of a line.
    LineDelete { line: LineId, was_selected: bool },
    /// Net result of a completed drag.
    HandleMove {
        line: LineId,
        index: usize,
        from: Point,
        to: Point,
    },
    HandleAdd {
        line: LineId,
        index: usize,
        handle: HandleId,
        position: Point,
    },
    HandleDelete {
        line: LineId,
        index: usize,
        handle: HandleId,
        position: Point,
    },
    SelectionChange {
        from: Option<LineId>,
        to: Option<LineId>,
    },
}

impl Command {
    // ─── Constructors ─────────────────────────────────────────────────────

    /// Record a new line through `points`. Allocates the line and handle ids
    /// up front so redo recreates the same entities.
    pub fn line_add(doc: &mut Document, points: &[Point], smoothed: bool) -> Option<Self> {
        if points.len() < MIN_HANDLES {
            return None;
        }
        let line = doc.next_line_id();
        let handles = points.iter().map(|p| (doc.next_handle_id(), *p)).collect();
        Some(Self::LineAdd {
            line,
            handles,
            smoothed,
            previous_selection: doc.selection(),
        })
    }

    /// Soft-delete a visible line.
    pub fn line_delete(doc: &Document, line: LineId) -> Option<Self> {
        let target = doc.line(line).filter(|l| l.is_visible())?;
        Some(Self::LineDelete {
            line,
            was_selected: doc.selection() == Some(target.id),
        })
    }

    /// Record a handle's net move. `from` is the pre-drag position; the
    /// handle may already sit at `to` after transient drag updates.
    pub fn handle_move(
        doc: &Document,
        line: LineId,
        index: usize,
        from: Point,
        to: Point,
    ) -> Option<Self> {
        doc.handle(line, index)?;
        if from == to {
            return None;
        }
        Some(Self::HandleMove {
            line,
            index,
            from,
            to,
        })
    }

    /// Insert a new handle at `index` (`0 <= index <= len`).
    pub fn handle_add(
        doc: &mut Document,
        line: LineId,
        index: usize,
        position: Point,
    ) -> Option<Self> {
        let len = doc.line(line).filter(|l| l.is_visible())?.len();
        if index > len {
            return None;
        }
        Some(Self::HandleAdd {
            line,
            index,
            handle: doc.next_handle_id(),
            position,
        })
    }

    /// Remove the handle at `index`, unless the line would drop below
    /// [`MIN_HANDLES`].
    pub fn handle_delete(doc: &Document, line: LineId, index: usize) -> Option<Self> {
        let target = doc.line(line).filter(|l| l.is_visible())?;
        if target.len() <= MIN_HANDLES {
            log::debug!("not deleting handle {index} of {line}: minimum reached");
            return None;
        }
        let handle = target.handle(index)?;
        Some(Self::HandleDelete {
            line,
            index,
            handle: handle.id,
            position: handle.position,
        })
    }

    /// Change the selection. `None` when the selection would not change.
    pub fn selection_change(doc: &Document, to: Option<LineId>) -> Option<Self> {
        let from = doc.selection();
        if from == to {
            return None;
        }
        if let Some(id) = to
            && !doc.line(id).is_some_and(|l| l.is_visible())
        {
            return None;
        }
        Some(Self::SelectionChange { from, to })
    }

    // ─── Replay ───────────────────────────────────────────────────────────

    pub fn description(&self) -> &'static str {
        match self {
            Self::LineAdd { .. } => "Add line",
            Self::LineDelete { .. } => "Delete line",
            Self::HandleMove { .. } => "Move point",
            Self::HandleAdd { .. } => "Add point",
            Self::HandleDelete { .. } => "Delete point",
            Self::SelectionChange { .. } => "Change selection",
        }
    }

    /// Apply the forward mutation. Returns `false`, leaving the document
    /// untouched, if the entities it names no longer fit.
    pub fn apply(&self, doc: &mut Document) -> bool {
        match self {
            Self::LineAdd {
                line,
                handles,
                smoothed,
                ..
            } => {
                if !doc.contains(*line) {
                    let points: Vec<Point> = handles.iter().map(|(_, p)| *p).collect();
                    let ids: Vec<HandleId> = handles.iter().map(|(id, _)| *id).collect();
                    let built = Line::with_handle_ids(*line, &points, &ids, *smoothed)
                        .and_then(|l| doc.insert_line(l));
                    if let Err(e) = built {
                        log::warn!("cannot add {line}: {e}");
                        return false;
                    }
                } else {
                    doc.set_line_visible(*line, true);
                }
                doc.select(Some(*line));
                true
            }
            Self::LineDelete { line, .. } => doc.set_line_visible(*line, false),
            Self::HandleMove {
                line, index, to, ..
            } => doc.set_handle_position(*line, *index, *to),
            Self::HandleAdd {
                line,
                index,
                handle,
                position,
            } => doc.insert_handle(*line, *index, *handle, *position),
            Self::HandleDelete { line, index, .. } => doc.remove_handle(*line, *index).is_some(),
            Self::SelectionChange { to, .. } => {
                doc.select(*to);
                true
            }
        }
    }

    /// Restore the state captured before [`Command::apply`].
    pub fn undo(&self, doc: &mut Document) -> bool {
        match self {
            Self::LineAdd {
                line,
                previous_selection,
                ..
            } => {
                if !doc.set_line_visible(*line, false) {
                    return false;
                }
                doc.select(*previous_selection);
                true
            }
            Self::LineDelete { line, was_selected } => {
                if !doc.set_line_visible(*line, true) {
                    return false;
                }
                if *was_selected {
                    doc.select(Some(*line));
                }
                true
            }
            Self::HandleMove {
                line, index, from, ..
            } => doc.set_handle_position(*line, *index, *from),
            Self::HandleAdd { line, index, .. } => doc.remove_handle(*line, *index).is_some(),
            Self::HandleDelete {
                line,
                index,
                handle,
                position,
            } => doc.insert_handle(*line, *index, *handle, *position),
            Self::SelectionChange { from, .. } => {
                doc.select(*from);
                true
            }
        }
    }
}

/// Manages undo/redo stacks with a bounded history.
#[derive(Debug)]
pub struct UndoManager {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    /// Maximum undo depth.
    max_depth: usize,
}

impl UndoManager {
    pub fn new(max_depth: usize) -> Self {
        let max_depth = max_depth.max(1);
        Self {
            undo_stack: Vec::with_capacity(max_depth.min(256)),
            redo_stack: Vec::new(),
            max_depth,
        }
    }

    /// Apply a command and push it to the undo stack. Clears the redo
    /// stack: a fresh action diverges history. Returns `false` if the
    /// command could not be applied, in which case nothing is recorded.
    pub fn execute(&mut self, doc: &mut Document, command: Command) -> bool {
        if !command.apply(doc) {
            log::warn!("{} could not be applied", command.description());
            return false;
        }
        log::debug!("execute: {}", command.description());

        self.undo_stack.push(command);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }

        // Clear redo stack on new action
        self.redo_stack.clear();
        true
    }

    /// Undo the last command. `None` (a no-op) when there is nothing to undo.
    pub fn undo(&mut self, doc: &mut Document) -> Option<String> {
        let cmd = self.undo_stack.pop()?;
        if !cmd.undo(doc) {
            log::warn!("undo of {} found the document out of step", cmd.description());
        }
        log::debug!("undo: {}", cmd.description());
        let desc = cmd.description().to_string();
        self.redo_stack.push(cmd);
        Some(desc)
    }

    /// Redo the last undone command. `None` (a no-op) when there is nothing
    /// to redo.
    pub fn redo(&mut self, doc: &mut Document) -> Option<String> {
        let cmd = self.redo_stack.pop()?;
        if !cmd.apply(doc) {
            log::warn!("redo of {} found the document out of step", cmd.description());
        }
        log::debug!("redo: {}", cmd.description());
        let desc = cmd.description().to_string();
        self.undo_stack.push(cmd);
        Some(desc)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Forget all history (e.g. after loading a new document).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(200)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pts(raw: &[(f64, f64)]) -> Vec<Point> {
        raw.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    fn doc_with_line(raw: &[(f64, f64)]) -> (Document, LineId) {
        let mut doc = Document::new();
        let id = doc.create_line(&pts(raw), false).unwrap();
        (doc, id)
    }

    #[test]
    fn undo_redo_move() {
        let (mut doc, id) = doc_with_line(&[(50.0, 50.0), (160.0, 70.0)]);
        let mut stack = UndoManager::new(100);

        let cmd = Command::handle_move(&doc, id, 0, Point::new(50.0, 50.0), Point::new(60.0, 45.0))
            .unwrap();
        assert!(stack.execute(&mut doc, cmd));
        assert_eq!(doc.handle(id, 0).unwrap().position, Point::new(60.0, 45.0));

        let desc = stack.undo(&mut doc);
        assert_eq!(desc.as_deref(), Some("Move point"));
        assert_eq!(doc.handle(id, 0).unwrap().position, Point::new(50.0, 50.0));

        let desc = stack.redo(&mut doc);
        assert_eq!(desc.as_deref(), Some("Move point"));
        assert_eq!(doc.handle(id, 0).unwrap().position, Point::new(60.0, 45.0));
    }

    #[test]
    fn zero_move_is_not_a_command() {
        let (doc, id) = doc_with_line(&[(0.0, 0.0), (1.0, 1.0)]);
        let p = Point::new(0.0, 0.0);
        assert_eq!(Command::handle_move(&doc, id, 0, p, p), None);
    }

    #[test]
    fn redo_clears_on_new_action() {
        let (mut doc, id) = doc_with_line(&[(0.0, 0.0), (10.0, 0.0)]);
        let mut stack = UndoManager::new(100);

        let a = Command::handle_move(&doc, id, 1, Point::new(10.0, 0.0), Point::new(20.0, 0.0))
            .unwrap();
        stack.execute(&mut doc, a);
        stack.undo(&mut doc);
        assert!(stack.can_redo());

        let b = Command::handle_move(&doc, id, 1, Point::new(10.0, 0.0), Point::new(10.0, 9.0))
            .unwrap();
        stack.execute(&mut doc, b);
        assert!(!stack.can_redo());
        assert_eq!(stack.redo(&mut doc), None);
        assert_eq!(doc.handle(id, 1).unwrap().position, Point::new(10.0, 9.0));
    }

    #[test]
    fn max_depth_trims_oldest() {
        let (mut doc, id) = doc_with_line(&[(0.0, 0.0), (10.0, 0.0)]);
        let mut stack = UndoManager::new(3);

        for i in 0..5 {
            let from = doc.handle(id, 1).unwrap().position;
            let to = Point::new(from.x + (i + 1) as f64, 0.0);
            let cmd = Command::handle_move(&doc, id, 1, from, to).unwrap();
            stack.execute(&mut doc, cmd);
        }
        let mut undo_count = 0;
        while stack.undo(&mut doc).is_some() {
            undo_count += 1;
        }
        assert_eq!(undo_count, 3);
    }

    #[test]
    fn empty_stacks_are_no_ops() {
        let mut doc = Document::new();
        let mut stack = UndoManager::default();
        assert_eq!(stack.undo(&mut doc), None);
        assert_eq!(stack.redo(&mut doc), None);
    }

    #[test]
    fn line_add_selects_and_undo_restores_selection() {
        let (mut doc, first) = doc_with_line(&[(0.0, 0.0), (5.0, 5.0)]);
        doc.select(Some(first));
        let mut stack = UndoManager::new(100);

        let cmd = Command::line_add(&mut doc, &pts(&[(1.0, 1.0), (2.0, 2.0)]), false).unwrap();
        let Command::LineAdd { line, .. } = cmd.clone() else {
            panic!("expected LineAdd");
        };
        stack.execute(&mut doc, cmd);
        assert_eq!(doc.selection(), Some(line));
        assert_eq!(doc.len_visible(), 2);

        stack.undo(&mut doc);
        assert_eq!(doc.selection(), Some(first));
        assert_eq!(doc.len_visible(), 1);

        stack.redo(&mut doc);
        assert_eq!(doc.selection(), Some(line));
        assert_eq!(doc.len_visible(), 2);
    }

    #[test]
    fn line_add_needs_two_points() {
        let mut doc = Document::new();
        assert_eq!(Command::line_add(&mut doc, &pts(&[(1.0, 1.0)]), false), None);
    }

    #[test]
    fn line_delete_roundtrip_restores_selection() {
        let (mut doc, id) = doc_with_line(&[(0.0, 0.0), (5.0, 5.0)]);
        doc.select(Some(id));
        let mut stack = UndoManager::new(100);

        let cmd = Command::line_delete(&doc, id).unwrap();
        stack.execute(&mut doc, cmd);
        assert_eq!(doc.selection(), None);
        assert!(!doc.line(id).unwrap().is_visible());
        assert_eq!(Command::line_delete(&doc, id), None);

        stack.undo(&mut doc);
        assert_eq!(doc.selection(), Some(id));
        assert!(doc.line(id).unwrap().is_visible());
    }

    #[test]
    fn handle_add_and_delete_roundtrip_keep_ids() {
        let (mut doc, id) = doc_with_line(&[(0.0, 0.0), (100.0, 0.0)]);
        let mut stack = UndoManager::new(100);

        let add = Command::handle_add(&mut doc, id, 1, Point::new(50.0, 0.0)).unwrap();
        stack.execute(&mut doc, add);
        let added = doc.handle(id, 1).unwrap().id;
        assert_eq!(doc.line(id).unwrap().len(), 3);

        let del = Command::handle_delete(&doc, id, 1).unwrap();
        stack.execute(&mut doc, del);
        assert_eq!(doc.line(id).unwrap().len(), 2);

        stack.undo(&mut doc);
        assert_eq!(doc.handle(id, 1).unwrap().id, added);
        assert_eq!(doc.handle(id, 1).unwrap().index, 1);
    }

    #[test]
    fn handle_delete_refused_at_minimum() {
        let (doc, id) = doc_with_line(&[(0.0, 0.0), (100.0, 0.0)]);
        assert_eq!(Command::handle_delete(&doc, id, 0), None);
    }

    #[test]
    fn handle_add_rejects_index_past_end() {
        let (mut doc, id) = doc_with_line(&[(0.0, 0.0), (100.0, 0.0)]);
        assert_eq!(Command::handle_add(&mut doc, id, 3, Point::ZERO), None);
        assert!(Command::handle_add(&mut doc, id, 2, Point::ZERO).is_some());
    }

    #[test]
    fn selection_change_skips_unchanged_and_hidden() {
        let (mut doc, id) = doc_with_line(&[(0.0, 0.0), (100.0, 0.0)]);
        assert_eq!(Command::selection_change(&doc, None), None);
        doc.set_line_visible(id, false);
        assert_eq!(Command::selection_change(&doc, Some(id)), None);
    }
}
