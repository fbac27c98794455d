//! Document → Vello drawing commands.
//!
//! `VelloRenderer` implements the core `Renderer` capability on a Vello
//! `Scene`: lines become stroked kurbo paths, handles become small squares.
//! The caller presents the scene via wgpu.

use kurbo::{Affine, Cap, Join, Point, Rect, Stroke as KurboStroke};
use lw_core::geometry::polyline_path;
use lw_core::{Document, HIT_RADIUS, Overlay, Renderer, paint_document};
use peniko::{Color, Fill};
use vello::Scene;

/// Colors and sizes used when painting.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub line: Color,
    pub selected_line: Color,
    pub preview: Color,
    pub handle: Color,
    pub hovered_handle: Color,
    pub line_width: f64,
    pub selected_line_width: f64,
    /// Half the side of a handle square. Reported as the renderer's hit
    /// radius; `EditSession::adopt_hit_radius` makes hits match it.
    pub handle_radius: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            line: Color::from_rgb8(0x22, 0x22, 0x22),
            selected_line: Color::from_rgb8(0x1e, 0x88, 0xe5),
            preview: Color::from_rgba8(0x22, 0x22, 0x22, 0x99),
            handle: Color::from_rgb8(0xff, 0xff, 0xff),
            hovered_handle: Color::from_rgb8(0xff, 0x98, 0x00),
            line_width: 1.5,
            selected_line_width: 2.5,
            handle_radius: HIT_RADIUS,
        }
    }
}

/// Paint a whole document with its overlay into `scene`.
///
/// Call once per frame with a freshly-cleared `Scene`.
pub fn paint_scene(scene: &mut Scene, doc: &Document, overlay: &Overlay, theme: &Theme) {
    log::trace!(
        "SCENE {} lines, handles={}, preview={}",
        doc.len_visible(),
        overlay.handles_visible,
        overlay.preview.is_some()
    );
    let mut renderer = VelloRenderer::new(scene, theme);
    paint_document(doc, &mut renderer, overlay);
}

/// A `Renderer` writing into a Vello scene.
pub struct VelloRenderer<'a> {
    scene: &'a mut Scene,
    theme: &'a Theme,
}

impl<'a> VelloRenderer<'a> {
    pub fn new(scene: &'a mut Scene, theme: &'a Theme) -> Self {
        Self { scene, theme }
    }
}

impl Renderer for VelloRenderer<'_> {
    fn draw_polyline(&mut self, points: &[Point], smoothed: bool, selected: bool) {
        if points.len() < 2 {
            return;
        }
        let path = polyline_path(points, smoothed);
        let (color, width) = if selected {
            (self.theme.selected_line, self.theme.selected_line_width)
        } else {
            (self.theme.line, self.theme.line_width)
        };
        self.scene
            .stroke(&line_stroke(width), Affine::IDENTITY, color, None, &path);
    }

    fn draw_handle(&mut self, position: Point, visible: bool) {
        if !visible {
            return;
        }
        let rect = handle_rect(position, self.theme.handle_radius);
        self.scene
            .fill(Fill::NonZero, Affine::IDENTITY, self.theme.handle, None, &rect);
        self.scene.stroke(
            &KurboStroke::new(1.0),
            Affine::IDENTITY,
            self.theme.line,
            None,
            &rect,
        );
    }

    fn draw_hovered_handle(&mut self, position: Point) {
        let rect = handle_rect(position, self.theme.handle_radius);
        self.scene.fill(
            Fill::NonZero,
            Affine::IDENTITY,
            self.theme.hovered_handle,
            None,
            &rect,
        );
    }

    fn draw_preview(&mut self, points: &[Point]) {
        if points.len() < 2 {
            return;
        }
        let path = polyline_path(points, false);
        let stroke = line_stroke(self.theme.line_width).with_dashes(0.0, [4.0, 4.0]);
        self.scene
            .stroke(&stroke, Affine::IDENTITY, self.theme.preview, None, &path);
    }

    fn hit_radius(&self) -> f64 {
        self.theme.handle_radius
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn line_stroke(width: f64) -> KurboStroke {
    KurboStroke {
        width,
        join: Join::Round,
        start_cap: Cap::Round,
        end_cap: Cap::Round,
        ..Default::default()
    }
}

/// The square drawn for a handle, same as its hit box.
pub fn handle_rect(center: Point, radius: f64) -> Rect {
    Rect::new(
        center.x - radius,
        center.y - radius,
        center.x + radius,
        center.y + radius,
    )
}
