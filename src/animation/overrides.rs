//! Per-frame property overrides.
//!
//! The evaluator emits two maps keyed by object id: numeric overrides
//! (`transform.x`, `style.opacity`, …) and string overrides (`style.fill`,
//! `style.stroke`). An override takes precedence over the object's stored
//! field for exactly one evaluated frame.

use rustc_hash::FxHashMap;

use crate::document::{Style, Transform};

/// Property overrides for one evaluated frame.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub numeric: FxHashMap<String, FxHashMap<String, f64>>,
    pub text: FxHashMap<String, FxHashMap<String, String>>,
}

impl Overrides {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.text.is_empty()
    }

    pub fn set_numeric(&mut self, object_id: &str, property: &str, value: f64) {
        self.numeric
            .entry(object_id.to_string())
            .or_default()
            .insert(property.to_string(), value);
    }

    pub fn set_text(&mut self, object_id: &str, property: &str, value: String) {
        self.text
            .entry(object_id.to_string())
            .or_default()
            .insert(property.to_string(), value);
    }

    /// Writes every override recorded for `object_id` into the node's
    /// effective transform and style. Unknown property paths are ignored.
    pub fn apply_to(&self, object_id: &str, transform: &mut Transform, style: &mut Style) {
        if let Some(props) = self.numeric.get(object_id) {
            for (property, value) in props {
                apply_numeric(property, *value, transform, style);
            }
        }
        if let Some(props) = self.text.get(object_id) {
            for (property, value) in props {
                apply_text(property, value, style);
            }
        }
    }
}

fn apply_numeric(property: &str, value: f64, transform: &mut Transform, style: &mut Style) {
    match property {
        "transform.x" => transform.x = value,
        "transform.y" => transform.y = value,
        "transform.sx" => transform.sx = value,
        "transform.sy" => transform.sy = value,
        "transform.r" => transform.rotation = value,
        "transform.ax" => transform.anchor_x = value,
        "transform.ay" => transform.anchor_y = value,
        "transform.skewX" => transform.skew_x = value,
        "transform.skewY" => transform.skew_y = value,
        "style.opacity" => style.opacity = value.clamp(0.0, 1.0),
        "style.strokeWidth" => style.stroke_width = value,
        _ => {}
    }
}

fn apply_text(property: &str, value: &str, style: &mut Style) {
    match property {
        "style.fill" => style.fill = value.to_string(),
        "style.stroke" => style.stroke = value.to_string(),
        _ => {}
    }
}
