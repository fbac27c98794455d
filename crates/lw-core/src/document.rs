//! The document: every line, the selection, and the hit-test index.
//!
//! The document owns all lines. Lines are never removed, only soft-deleted
//! (hidden), so ids handed out to undo history stay resolvable for the
//! lifetime of the document. The methods here are raw mutations; recording
//! them as undoable commands is the editor's job.

use crate::hit::{self, HandleRef, LineHit};
use crate::id::{HandleId, IdGen, LineId};
use crate::model::{Handle, Line};
use crate::persist::{self, LoadReport};
use kurbo::Point;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Document {
    lines: Vec<Line>,
    /// Line id → position in `lines`. Positions never change.
    index: HashMap<LineId, usize>,
    selection: Option<LineId>,
    ids: IdGen,
    redraw: bool,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse persisted text into a fresh document. See [`Document::load`].
    pub fn from_text(text: &str) -> (Self, LoadReport) {
        let mut doc = Self::new();
        let report = doc.load(text, false);
        (doc, report)
    }

    /// Append every well-formed record as a line. Bulk load is not undoable
    /// and does not touch the selection.
    pub fn load(&mut self, text: &str, smoothed: bool) -> LoadReport {
        let report = persist::parse_document(text);
        for points in &report.records {
            // Records are validated by the parser; a failure here is a bug.
            if let Err(e) = self.create_line(points, smoothed) {
                log::warn!("dropping loaded record: {e}");
            }
        }
        log::debug!(
            "loaded {} lines, skipped {}",
            report.records.len(),
            report.skipped.len()
        );
        report
    }

    /// Serialize visible lines.
    pub fn to_text(&self) -> String {
        persist::emit_document(self)
    }

    // ─── Ids ──────────────────────────────────────────────────────────────

    pub fn next_line_id(&mut self) -> LineId {
        self.ids.line()
    }

    pub fn next_handle_id(&mut self) -> HandleId {
        self.ids.handle()
    }

    // ─── Lines ────────────────────────────────────────────────────────────

    /// Build and append a visible line with fresh ids.
    ///
    /// # Errors
    /// Returns an error if fewer than two points are given.
    pub fn create_line(&mut self, points: &[Point], smoothed: bool) -> Result<LineId, String> {
        let id = self.ids.line();
        let line = Line::create(id, points, smoothed, &mut self.ids)?;
        self.insert_line(line)
    }

    /// Append a line and index it for hit testing.
    ///
    /// # Errors
    /// Returns an error if a line with the same id already exists.
    pub fn insert_line(&mut self, line: Line) -> Result<LineId, String> {
        let id = line.id;
        if self.index.contains_key(&id) {
            return Err(format!("{id} already exists"));
        }
        self.index.insert(id, self.lines.len());
        self.lines.push(line);
        self.redraw = true;
        Ok(id)
    }

    pub fn contains(&self, id: LineId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.index.get(&id).map(|&i| &self.lines[i])
    }

    fn line_mut(&mut self, id: LineId) -> Option<&mut Line> {
        self.index.get(&id).map(|&i| &mut self.lines[i])
    }

    /// All lines in insertion order, including soft-deleted ones.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn visible_lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(|l| l.is_visible())
    }

    pub fn len_visible(&self) -> usize {
        self.visible_lines().count()
    }

    /// Show or soft-delete a line. Hiding the selected line clears the
    /// selection. Returns `false` if the line does not exist.
    pub fn set_line_visible(&mut self, id: LineId, visible: bool) -> bool {
        let Some(line) = self.line_mut(id) else {
            return false;
        };
        line.set_visible(visible);
        if !visible && self.selection == Some(id) {
            self.select(None);
        }
        self.redraw = true;
        true
    }

    // ─── Selection ────────────────────────────────────────────────────────

    pub fn selection(&self) -> Option<LineId> {
        self.selection
    }

    /// Deselect the current line and select `id`. Returns the previous
    /// selection. Unknown ids select nothing.
    pub fn select(&mut self, id: Option<LineId>) -> Option<LineId> {
        let previous = self.selection.take();
        if let Some(prev) = previous
            && let Some(line) = self.line_mut(prev)
        {
            line.deselect();
        }
        if let Some(next) = id
            && let Some(line) = self.line_mut(next)
        {
            line.select();
            self.selection = Some(next);
        }
        self.redraw = true;
        previous
    }

    // ─── Handles ──────────────────────────────────────────────────────────

    /// Resolve a handle's owning line and current index.
    pub fn locate_handle(&self, handle: HandleId) -> Option<HandleRef> {
        self.lines.iter().find_map(|l| {
            l.index_of(handle).map(|index| HandleRef {
                line: l.id,
                handle,
                index,
            })
        })
    }

    pub fn handle(&self, line: LineId, index: usize) -> Option<&Handle> {
        self.line(line).and_then(|l| l.handle(index))
    }

    /// Translate a handle and refresh its line's geometry.
    pub fn move_handle(&mut self, line: LineId, index: usize, dx: f64, dy: f64) -> bool {
        let moved = self
            .line_mut(line)
            .is_some_and(|l| l.move_handle(index, dx, dy));
        self.redraw |= moved;
        moved
    }

    pub fn set_handle_position(&mut self, line: LineId, index: usize, position: Point) -> bool {
        let moved = self
            .line_mut(line)
            .is_some_and(|l| l.set_handle_position(index, position));
        self.redraw |= moved;
        moved
    }

    pub fn insert_handle(
        &mut self,
        line: LineId,
        index: usize,
        id: HandleId,
        position: Point,
    ) -> bool {
        let inserted = self
            .line_mut(line)
            .is_some_and(|l| l.insert_handle(index, id, position));
        self.redraw |= inserted;
        inserted
    }

    /// Remove a handle unless that would leave its line below two handles.
    pub fn remove_handle(&mut self, line: LineId, index: usize) -> Option<Handle> {
        let removed = self.line_mut(line).and_then(|l| l.remove_handle(index));
        self.redraw |= removed.is_some();
        removed
    }

    // ─── Hit testing ──────────────────────────────────────────────────────

    /// Topmost visible line within `radius` of `p`.
    pub fn hit_test(&self, p: Point, radius: f64) -> Option<LineId> {
        self.hit_line(p, radius).map(|h| h.line)
    }

    /// Like [`Document::hit_test`] but also reports the nearest path point.
    pub fn hit_line(&self, p: Point, radius: f64) -> Option<LineHit> {
        hit::hit_line(&self.lines, p, radius)
    }

    /// Topmost visible handle whose hit box contains `p`.
    pub fn handle_at(&self, p: Point, radius: f64) -> Option<HandleRef> {
        hit::hit_handle(&self.lines, p, radius)
    }

    // ─── Redraw requests ──────────────────────────────────────────────────

    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    /// Consume the pending redraw request.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }
}
