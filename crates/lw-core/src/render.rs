//! The drawing capability the core relies on, and the painter that drives it.
//!
//! The core never issues raw drawing primitives. It walks the document and
//! hands ordered point sequences and handle positions to a `Renderer`,
//! which the host implements on top of its canvas of choice.

use crate::document::Document;
use crate::hit::{HIT_RADIUS, HandleRef};
use kurbo::Point;

/// Host-provided drawing surface.
pub trait Renderer {
    /// Stroke a poly-line through `points`, smoothed or straight.
    fn draw_polyline(&mut self, points: &[Point], smoothed: bool, selected: bool);

    /// Draw a handle marker. `visible` is `false` outside edit mode.
    fn draw_handle(&mut self, position: Point, visible: bool);

    /// Draw the marker of the handle under the pointer.
    fn draw_hovered_handle(&mut self, position: Point) {
        self.draw_handle(position, true);
    }

    /// Rubber-band preview of a line being drawn.
    fn draw_preview(&mut self, points: &[Point]) {
        self.draw_polyline(points, false, false);
    }

    /// Pixel tolerance for hit testing against what this renderer draws.
    fn hit_radius(&self) -> f64 {
        HIT_RADIUS
    }
}

/// Transient, presentational state passed to the painter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overlay {
    /// Whether handles are shown (edit mode).
    pub handles_visible: bool,
    pub hovered: Option<HandleRef>,
    /// Anchor and current pointer of a line being drawn.
    pub preview: Option<(Point, Point)>,
}

/// Paint every visible line, its handles, then the overlay.
///
/// Lines are painted oldest-first so the newest ends up on top, matching
/// the hit-test order.
pub fn paint_document(doc: &Document, renderer: &mut dyn Renderer, overlay: &Overlay) {
    for line in doc.visible_lines() {
        log::trace!(
            "PAINT {} ({} handles, smoothed={})",
            line.id,
            line.len(),
            line.is_smoothed()
        );
        renderer.draw_polyline(&line.points(), line.is_smoothed(), line.is_selected());
        for handle in line.handles() {
            renderer.draw_handle(handle.position, overlay.handles_visible);
        }
    }

    if overlay.handles_visible
        && let Some(hovered) = overlay.hovered
        && let Some(handle) = doc.handle(hovered.line, hovered.index)
        && handle.id == hovered.handle
        && doc.line(hovered.line).is_some_and(|l| l.is_visible())
    {
        renderer.draw_hovered_handle(handle.position);
    }

    if let Some((anchor, current)) = overlay.preview {
        renderer.draw_preview(&[anchor, current]);
    }
}

/// One recorded `Renderer` call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Polyline {
        points: Vec<Point>,
        smoothed: bool,
        selected: bool,
    },
    Handle {
        position: Point,
        visible: bool,
    },
    Hovered(Point),
    Preview(Vec<Point>),
}

/// A renderer that records calls instead of drawing. Used by tests and
/// headless tooling.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    pub calls: Vec<DrawCall>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn polylines(&self) -> impl Iterator<Item = &DrawCall> {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Polyline { .. }))
    }
}

impl Renderer for RecordingRenderer {
    fn draw_polyline(&mut self, points: &[Point], smoothed: bool, selected: bool) {
        self.calls.push(DrawCall::Polyline {
            points: points.to_vec(),
            smoothed,
            selected,
        });
    }

    fn draw_handle(&mut self, position: Point, visible: bool) {
        self.calls.push(DrawCall::Handle { position, visible });
    }

    fn draw_hovered_handle(&mut self, position: Point) {
        self.calls.push(DrawCall::Hovered(position));
    }

    fn draw_preview(&mut self, points: &[Point]) {
        self.calls.push(DrawCall::Preview(points.to_vec()));
    }
}
