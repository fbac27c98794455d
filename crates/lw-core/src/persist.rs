//! Plain-text persistence: one line per text line, flat `x,y,x,y,...` lists.
//!
//! ```text
//! 50,50,90,60,160,70
//! 10.5,20,30,40
//! ```
//!
//! Blank lines are ignored. A malformed record is skipped and reported,
//! never fatal: one corrupt record must not lose the rest of the document.
//! Soft-deleted lines are not written.

use crate::document::Document;
use crate::model::MIN_HANDLES;
use kurbo::Point;
use std::fmt;
use winnow::ascii::{float, space0};
use winnow::combinator::{delimited, separated};
use winnow::prelude::*;

/// A record that could not be turned into a line.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    /// 1-based line number in the source text.
    pub line_no: usize,
    pub reason: String,
}

impl fmt::Display for SkippedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line_no, self.reason)
    }
}

/// Outcome of parsing a document: the good records plus what was skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub records: Vec<Vec<Point>>,
    pub skipped: Vec<SkippedLine>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Parse persisted text into point lists, skipping malformed records.
pub fn parse_document(text: &str) -> LoadReport {
    let mut report = LoadReport::default();

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let record = raw.trim();
        if record.is_empty() {
            continue;
        }
        match parse_record(record) {
            Ok(points) => report.records.push(points),
            Err(reason) => {
                log::warn!("skipping record on line {line_no}: {reason}");
                report.skipped.push(SkippedLine { line_no, reason });
            }
        }
    }

    report
}

/// Parse one non-blank record into points.
///
/// # Errors
/// Returns the reason the record is unusable: a non-numeric or non-finite
/// coordinate, an odd coordinate count, or fewer than two points.
pub fn parse_record(record: &str) -> Result<Vec<Point>, String> {
    let coords = coordinate_list
        .parse(record)
        .map_err(|e| format!("malformed coordinate list: {e}"))?;

    if let Some(bad) = coords.iter().find(|c| !c.is_finite()) {
        return Err(format!("non-finite coordinate {bad}"));
    }
    if coords.len() % 2 != 0 {
        return Err(format!("odd number of coordinates ({})", coords.len()));
    }
    let points: Vec<Point> = coords
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect();
    if points.len() < MIN_HANDLES {
        return Err(format!(
            "a line needs at least {MIN_HANDLES} points, got {}",
            points.len()
        ));
    }
    Ok(points)
}

/// Serialize every visible line, one per output line, in document order.
pub fn emit_document(doc: &Document) -> String {
    let mut out = String::new();
    for line in doc.visible_lines() {
        emit_points(&mut out, &line.points());
        out.push('\n');
    }
    out
}

fn emit_points(out: &mut String, points: &[Point]) {
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&format!("{},{}", p.x, p.y));
    }
}

// ─── Low-level parsers ──────────────────────────────────────────────────

fn coordinate(input: &mut &str) -> ModalResult<f64> {
    delimited(space0, float, space0).parse_next(input)
}

fn coordinate_list(input: &mut &str) -> ModalResult<Vec<f64>> {
    separated(1.., coordinate, ',').parse_next(input)
}
