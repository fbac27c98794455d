//! Hit testing: point → line or handle lookup.
//!
//! Lines are walked newest-first (last painted = topmost), so overlapping
//! targets resolve to the most recently added line. Soft-deleted lines are
//! never hit.

use crate::geometry::{SegmentHit, in_handle_box};
use crate::id::{HandleId, LineId};
use crate::model::Line;
use kurbo::Point;

/// Pixel tolerance used when the host does not configure one.
pub const HIT_RADIUS: f64 = 5.0;

/// A handle found under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleRef {
    pub line: LineId,
    pub handle: HandleId,
    pub index: usize,
}

/// A line found under the pointer, with the nearest point on its path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineHit {
    pub line: LineId,
    pub nearest: SegmentHit,
}

/// Find the topmost visible line whose path passes within `radius` of `p`.
pub fn hit_line(lines: &[Line], p: Point, radius: f64) -> Option<LineHit> {
    lines.iter().rev().filter(|l| l.is_visible()).find_map(|l| {
        l.nearest(p)
            .filter(|n| n.distance <= radius)
            .map(|nearest| LineHit {
                line: l.id,
                nearest,
            })
    })
}

/// Find the topmost visible handle whose hit box contains `p`.
///
/// Within one line the handle closest to `p` wins.
pub fn hit_handle(lines: &[Line], p: Point, radius: f64) -> Option<HandleRef> {
    for line in lines.iter().rev().filter(|l| l.is_visible()) {
        let best = line
            .handles()
            .iter()
            .filter(|h| in_handle_box(h.position, p, radius))
            .min_by(|a, b| {
                a.position
                    .distance_squared(p)
                    .total_cmp(&b.position.distance_squared(p))
            });
        if let Some(h) = best {
            return Some(HandleRef {
                line: line.id,
                handle: h.id,
                index: h.index,
            });
        }
    }
    None
}
