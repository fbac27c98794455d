//! Editor tuning knobs.
//!
//! Loaded from JSON by hosts that persist preferences; every field is
//! optional and falls back to its default.

use lw_core::HIT_RADIUS;
use serde::{Deserialize, Serialize};

/// Interaction settings shared by the controller and the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Pixel tolerance for line and handle hit tests.
    pub hit_radius: f64,
    /// Maximum pointer travel for a press/release pair to count as a click.
    /// `0.0` means the pointer must not move at all.
    pub click_tolerance: f64,
    /// Maximum number of undoable commands kept.
    pub max_undo_depth: usize,
    /// Whether newly drawn lines are Catmull-Rom smoothed.
    pub smooth_new_lines: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            hit_radius: HIT_RADIUS,
            click_tolerance: 0.0,
            max_undo_depth: 200,
            smooth_new_lines: true,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON object; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, String> {
        serde_json::from_str::<Self>(text)
            .map(Self::validated)
            .map_err(|e| format!("invalid editor config: {e}"))
    }

    /// Clamp values the editor cannot honour.
    pub fn validated(mut self) -> Self {
        if self.hit_radius.is_nan() || self.hit_radius < 0.0 {
            self.hit_radius = 0.0;
        }
        if self.click_tolerance.is_nan() || self.click_tolerance < 0.0 {
            self.click_tolerance = 0.0;
        }
        self.max_undo_depth = self.max_undo_depth.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(EditorConfig::from_json("{}").unwrap(), EditorConfig::default());
    }

    #[test]
    fn partial_override() {
        let cfg = EditorConfig::from_json(r#"{"hit_radius": 8.0, "smooth_new_lines": false}"#)
            .unwrap();
        assert_eq!(cfg.hit_radius, 8.0);
        assert!(!cfg.smooth_new_lines);
        assert_eq!(cfg.max_undo_depth, 200);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let cfg = EditorConfig::from_json(r#"{"click_tolerance": -2.0, "max_undo_depth": 0}"#)
            .unwrap();
        assert_eq!(cfg.click_tolerance, 0.0);
        assert_eq!(cfg.max_undo_depth, 1);
    }

    #[test]
    fn nan_tolerances_are_clamped() {
        let cfg = EditorConfig {
            hit_radius: f64::NAN,
            click_tolerance: f64::NAN,
            ..EditorConfig::default()
        }
        .validated();
        assert_eq!(cfg.hit_radius, 0.0);
        assert_eq!(cfg.click_tolerance, 0.0);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = EditorConfig::from_json("{hit_radius").unwrap_err();
        assert!(err.starts_with("invalid editor config"));
    }
}
