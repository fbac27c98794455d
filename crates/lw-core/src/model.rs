//! Editable geometry: handles and the lines that own them.
//!
//! A `Line` owns its `Handle`s by value in an ordered list. Each handle
//! records its owning line by id (resolved through the `Document` when
//! needed) and its position in the list. The position is re-numbered on
//! every insert and remove, so `handles[i].index == i` always holds.
//!
//! Lines cache their rendered segments. Moving a handle rebuilds only the
//! segments that depend on it; structural edits rebuild the whole cache.

use crate::geometry::{self, SegmentHit};
use crate::id::{HandleId, IdGen, LineId};
use kurbo::{BezPath, PathSeg, Point};
use smallvec::SmallVec;

/// A line never drops below this many handles.
pub const MIN_HANDLES: usize = 2;

/// Inline storage covers the common straight and once-bent lines.
pub type HandleList = SmallVec<[Handle; 4]>;

// ─── Handle ──────────────────────────────────────────────────────────────

/// A movable control point belonging to exactly one line.
#[derive(Debug, Clone, PartialEq)]
pub struct Handle {
    pub id: HandleId,
    pub position: Point,
    /// Owning line. Non-owning back-reference, resolved via the document.
    pub line: LineId,
    /// Position within the owning line's handle list.
    pub index: usize,
}

impl Handle {
    pub fn new(id: HandleId, line: LineId, index: usize, position: Point) -> Self {
        Self {
            id,
            position,
            line,
            index,
        }
    }

    /// Translate without bounds checking; off-canvas positions are allowed.
    pub fn move_by(&mut self, dx: f64, dy: f64) {
        self.position.x += dx;
        self.position.y += dy;
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.position = Point::new(x, y);
    }
}

// ─── Line ────────────────────────────────────────────────────────────────

/// An ordered, optionally smoothed poly-line defined by its handles.
#[derive(Debug, Clone)]
pub struct Line {
    pub id: LineId,
    handles: HandleList,
    visible: bool,
    smoothed: bool,
    selected: bool,
    segments: Vec<PathSeg>,
}

impl Line {
    /// Build a line with one handle per point, indexed `0..n`.
    ///
    /// # Errors
    /// Returns an error if fewer than two points are given.
    pub fn create(
        id: LineId,
        points: &[Point],
        smoothed: bool,
        ids: &mut IdGen,
    ) -> Result<Self, String> {
        let handle_ids: Vec<HandleId> = points.iter().map(|_| ids.handle()).collect();
        Self::with_handle_ids(id, points, &handle_ids, smoothed)
    }

    /// Build a line whose handle ids are already known (undo/redo replay).
    ///
    /// # Errors
    /// Returns an error if fewer than two points are given or the id list
    /// does not match the point list.
    pub fn with_handle_ids(
        id: LineId,
        points: &[Point],
        handle_ids: &[HandleId],
        smoothed: bool,
    ) -> Result<Self, String> {
        if points.len() < MIN_HANDLES {
            return Err(format!(
                "a line needs at least {MIN_HANDLES} points, got {}",
                points.len()
            ));
        }
        if points.len() != handle_ids.len() {
            return Err(format!(
                "{} points but {} handle ids",
                points.len(),
                handle_ids.len()
            ));
        }

        let handles = points
            .iter()
            .zip(handle_ids)
            .enumerate()
            .map(|(index, (p, hid))| Handle::new(*hid, id, index, *p))
            .collect();

        let mut line = Self {
            id,
            handles,
            visible: true,
            smoothed,
            selected: false,
            segments: Vec::new(),
        };
        line.rebuild_geometry();
        Ok(line)
    }

    // ── Queries ──

    pub fn handles(&self) -> &[Handle] {
        &self.handles
    }

    pub fn handle(&self, index: usize) -> Option<&Handle> {
        self.handles.get(index)
    }

    pub fn index_of(&self, handle: HandleId) -> Option<usize> {
        self.handles.iter().position(|h| h.id == handle)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn points(&self) -> Vec<Point> {
        self.handles.iter().map(|h| h.position).collect()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_smoothed(&self) -> bool {
        self.smoothed
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Cached rendered segments, one per neighbouring handle pair.
    pub fn segments(&self) -> &[PathSeg] {
        &self.segments
    }

    pub fn path(&self) -> BezPath {
        geometry::to_bez_path(&self.segments)
    }

    /// Nearest point on the rendered path.
    pub fn nearest(&self, p: Point) -> Option<SegmentHit> {
        geometry::nearest_segment(&self.segments, p)
    }

    // ── Handle edits ──

    /// Translate the handle at `index` and refresh the geometry around it.
    /// Returns `false` if the index is out of range.
    pub fn move_handle(&mut self, index: usize, dx: f64, dy: f64) -> bool {
        let Some(handle) = self.handles.get_mut(index) else {
            return false;
        };
        handle.move_by(dx, dy);
        self.refresh_geometry_at(index);
        true
    }

    /// Place the handle at `index` absolutely (undo/redo replay).
    pub fn set_handle_position(&mut self, index: usize, position: Point) -> bool {
        let Some(handle) = self.handles.get_mut(index) else {
            return false;
        };
        handle.set_position(position.x, position.y);
        self.refresh_geometry_at(index);
        true
    }

    /// Insert a handle at `index`, shifting later handles up by one.
    /// Valid for `0 <= index <= len`; returns `false` otherwise.
    pub fn insert_handle(&mut self, index: usize, id: HandleId, position: Point) -> bool {
        if index > self.handles.len() {
            return false;
        }
        self.handles
            .insert(index, Handle::new(id, self.id, index, position));
        self.renumber_from(index + 1);
        self.rebuild_geometry();
        true
    }

    /// Remove the handle at `index`, shifting later handles down by one.
    ///
    /// Refuses (returns `None`) when the line would drop below
    /// [`MIN_HANDLES`] or the index is out of range.
    pub fn remove_handle(&mut self, index: usize) -> Option<Handle> {
        if self.handles.len() <= MIN_HANDLES || index >= self.handles.len() {
            log::debug!(
                "refusing to remove handle {index} from {} ({} handles)",
                self.id,
                self.handles.len()
            );
            return None;
        }
        let removed = self.handles.remove(index);
        self.renumber_from(index);
        self.rebuild_geometry();
        Some(removed)
    }

    // ── State flags ──

    /// Soft-delete toggle. Handles share their line's visibility.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_smoothed(&mut self, smoothed: bool) {
        if self.smoothed != smoothed {
            self.smoothed = smoothed;
            self.rebuild_geometry();
        }
    }

    pub fn select(&mut self) {
        self.selected = true;
    }

    pub fn deselect(&mut self) {
        self.selected = false;
    }

    // ── Internals ──

    fn renumber_from(&mut self, start: usize) {
        for (i, h) in self.handles.iter_mut().enumerate().skip(start) {
            h.index = i;
        }
    }

    fn rebuild_geometry(&mut self) {
        self.segments = geometry::segments(&self.points(), self.smoothed);
    }

    fn refresh_geometry_at(&mut self, index: usize) {
        let points = self.points();
        for seg in geometry::affected_segments(points.len(), self.smoothed, index) {
            self.segments[seg] = geometry::segment(&points, self.smoothed, seg);
        }
    }
}
