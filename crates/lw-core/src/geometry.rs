//! Poly-line geometry: straight and smoothed segments, nearest-point queries.
//!
//! A smoothed line is a Catmull-Rom spline through its handles, expressed as
//! one cubic Bézier per pair of neighbouring handles. The first and last
//! segments use reflected phantom points so the curve leaves and enters the
//! end handles along the adjacent chord.

use kurbo::{BezPath, CubicBez, Line as Chord, ParamCurve, ParamCurveNearest, PathSeg, Point};
use std::ops::RangeInclusive;

/// Accuracy passed to kurbo's nearest-point solver, in canvas pixels.
pub const NEAREST_ACCURACY: f64 = 1e-3;

/// Result of projecting a point onto a poly-line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Index of the segment, i.e. the segment runs from handle `segment`
    /// to handle `segment + 1`.
    pub segment: usize,
    /// Curve parameter of the nearest point on that segment.
    pub t: f64,
    /// The nearest point itself.
    pub point: Point,
    pub distance: f64,
}

/// Build segment `index` of the poly-line through `points`.
///
/// Panics if `index + 1 >= points.len()`; callers iterate `0..points.len() - 1`.
pub fn segment(points: &[Point], smoothed: bool, index: usize) -> PathSeg {
    let p1 = points[index];
    let p2 = points[index + 1];
    if !smoothed || points.len() < 3 {
        return PathSeg::Line(Chord::new(p1, p2));
    }

    let n = points.len();
    let p0 = if index == 0 {
        p1 + (p1 - p2)
    } else {
        points[index - 1]
    };
    let p3 = if index + 2 < n {
        points[index + 2]
    } else {
        p2 + (p2 - p1)
    };

    let c1 = p1 + (p2 - p0) / 6.0;
    let c2 = p2 - (p3 - p1) / 6.0;
    PathSeg::Cubic(CubicBez::new(p1, c1, c2, p2))
}

/// Build every segment of the poly-line through `points`.
pub fn segments(points: &[Point], smoothed: bool) -> Vec<PathSeg> {
    if points.len() < 2 {
        return Vec::new();
    }
    (0..points.len() - 1)
        .map(|i| segment(points, smoothed, i))
        .collect()
}

/// Segments whose shape depends on the handle at `index`.
///
/// A straight segment depends on its two end handles; a Catmull-Rom
/// segment additionally depends on the handle before and after it.
pub fn affected_segments(len: usize, smoothed: bool, index: usize) -> RangeInclusive<usize> {
    if len < 2 {
        return 1..=0;
    }
    let last = len - 2;
    let (back, ahead) = if smoothed && len >= 3 { (2, 1) } else { (1, 0) };
    let start = index.saturating_sub(back);
    let end = (index + ahead).min(last);
    start.min(last)..=end
}

/// Assemble a drawable path from segments.
pub fn to_bez_path(segments: &[PathSeg]) -> BezPath {
    let mut path = BezPath::new();
    let Some(first) = segments.first() else {
        return path;
    };
    path.move_to(first.start());
    for seg in segments {
        match seg {
            PathSeg::Line(l) => path.line_to(l.p1),
            PathSeg::Quad(q) => path.quad_to(q.p1, q.p2),
            PathSeg::Cubic(c) => path.curve_to(c.p1, c.p2, c.p3),
        }
    }
    path
}

/// Drawable path for a poly-line through `points`.
pub fn polyline_path(points: &[Point], smoothed: bool) -> BezPath {
    to_bez_path(&segments(points, smoothed))
}

/// Project `p` onto the nearest segment. Ties go to the lower segment index.
pub fn nearest_segment(segments: &[PathSeg], p: Point) -> Option<SegmentHit> {
    let mut best: Option<SegmentHit> = None;
    for (i, seg) in segments.iter().enumerate() {
        let nearest = seg.nearest(p, NEAREST_ACCURACY);
        let distance = nearest.distance_sq.sqrt();
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(SegmentHit {
                segment: i,
                t: nearest.t,
                point: seg.eval(nearest.t),
                distance,
            });
        }
    }
    best
}

/// Whether `p` lies inside the square of half-size `radius` centred on `center`.
pub fn in_handle_box(center: Point, p: Point, radius: f64) -> bool {
    (p.x - center.x).abs() <= radius && (p.y - center.y).abs() <= radius
}
