//! Drawable tree nodes.
//!
//! An [`ObjectNode`] is one entry in the per-scene object tree: hierarchy
//! links, an embedded [`Transform`] and [`Style`], visibility/lock flags and
//! a tagged per-kind payload ([`NodeData`]). The kind-specific payload is
//! modeled as an enum rather than inheritance; geometry synthesis downstream
//! is a match on the tag.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::path::PathCommand;
use crate::errors::OpError;

/// Local transform of a node relative to its parent.
///
/// `rotation`, `skew_x` and `skew_y` are degrees. The anchor point is the
/// pivot of rotation/scale/skew and maps to `(x, y)` in parent space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub sx: f64,
    pub sy: f64,
    pub rotation: f64,
    pub anchor_x: f64,
    pub anchor_y: f64,
    pub skew_x: f64,
    pub skew_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            sx: 1.0,
            sy: 1.0,
            rotation: 0.0,
            anchor_x: 0.0,
            anchor_y: 0.0,
            skew_x: 0.0,
            skew_y: 0.0,
        }
    }
}

/// Partial transform: only supplied fields are written on apply. Shared by
/// the `object.transform` operation and the engine's drag overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sx: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skew_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skew_y: Option<f64>,
}

impl TransformPatch {
    /// Overwrites only the supplied fields.
    pub fn apply_to(&self, target: &mut Transform) {
        if let Some(x) = self.x {
            target.x = x;
        }
        if let Some(y) = self.y {
            target.y = y;
        }
        if let Some(sx) = self.sx {
            target.sx = sx;
        }
        if let Some(sy) = self.sy {
            target.sy = sy;
        }
        if let Some(rotation) = self.rotation {
            target.rotation = rotation;
        }
        if let Some(ax) = self.anchor_x {
            target.anchor_x = ax;
        }
        if let Some(ay) = self.anchor_y {
            target.anchor_y = ay;
        }
        if let Some(skew_x) = self.skew_x {
            target.skew_x = skew_x;
        }
        if let Some(skew_y) = self.skew_y {
            target.skew_y = skew_y;
        }
    }
}

/// Paint attributes of a node. Empty color strings mean "no fill" /
/// "no stroke".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: String::new(),
            stroke: String::new(),
            stroke_width: 1.0,
            opacity: 1.0,
        }
    }
}

/// Partial style for the `object.style` operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StylePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl StylePatch {
    /// Overwrites only the supplied fields. Opacity is clamped into [0, 1].
    pub fn apply_to(&self, target: &mut Style) {
        if let Some(fill) = &self.fill {
            target.fill = fill.clone();
        }
        if let Some(stroke) = &self.stroke {
            target.stroke = stroke.clone();
        }
        if let Some(width) = self.stroke_width {
            target.stroke_width = width;
        }
        if let Some(opacity) = self.opacity {
            target.opacity = opacity.clamp(0.0, 1.0);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Kind-specific payload of a node, tagged with the node kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum NodeData {
    Group {},
    #[serde(rename_all = "camelCase")]
    ShapeRect { width: f64, height: f64 },
    #[serde(rename_all = "camelCase")]
    ShapeEllipse { rx: f64, ry: f64 },
    #[serde(rename_all = "camelCase")]
    VectorPath { commands: Vec<PathCommand> },
    #[serde(rename_all = "camelCase")]
    RasterImage {
        asset_id: String,
        width: f64,
        height: f64,
    },
    #[serde(rename_all = "camelCase")]
    Symbol {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeline_id: Option<String>,
        #[serde(
            rename = "loop",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        looping: Option<bool>,
    },
    #[serde(rename_all = "camelCase")]
    Text {
        content: String,
        font_size: f64,
        #[serde(default)]
        font_family: String,
        #[serde(default)]
        font_weight: FontWeight,
        #[serde(default)]
        text_align: TextAlign,
    },
}

impl NodeData {
    /// Kind tag as it appears on the wire.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Group {} => "Group",
            Self::ShapeRect { .. } => "ShapeRect",
            Self::ShapeEllipse { .. } => "ShapeEllipse",
            Self::VectorPath { .. } => "VectorPath",
            Self::RasterImage { .. } => "RasterImage",
            Self::Symbol { .. } => "Symbol",
            Self::Text { .. } => "Text",
        }
    }

    /// True for the kinds allowed to root a scene.
    #[must_use]
    pub fn can_root_scene(&self) -> bool {
        matches!(self, Self::Group {} | Self::Symbol { .. })
    }

    /// Merges JSON keys into the kind-specific payload, keeping the kind.
    /// Fails if the merged payload no longer decodes for this kind.
    pub fn merged(&self, patch: &Map<String, Value>) -> Result<Self, OpError> {
        let mut tagged = serde_json::to_value(self).map_err(|_| OpError::InvalidField("data"))?;
        let obj = tagged
            .as_object_mut()
            .ok_or(OpError::InvalidField("data"))?;
        let data = obj
            .entry("data")
            .or_insert_with(|| Value::Object(Map::new()));
        let data_obj = data.as_object_mut().ok_or(OpError::InvalidField("data"))?;
        for (key, value) in patch {
            data_obj.insert(key.clone(), value.clone());
        }
        serde_json::from_value(tagged).map_err(|_| OpError::InvalidField("data"))
    }
}

impl Default for NodeData {
    fn default() -> Self {
        Self::Group {}
    }
}

/// One node in a scene's object tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectNode {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub style: Style,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    /// Optional clip mask: another object whose geometry clips this node's
    /// subtree during paint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_id: Option<String>,
    #[serde(flatten)]
    pub data: NodeData,
}

fn default_visible() -> bool {
    true
}

impl ObjectNode {
    /// A fresh node of the given kind with default transform and style.
    #[must_use]
    pub fn new(id: impl Into<String>, data: NodeData) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            children: Vec::new(),
            transform: Transform::default(),
            style: Style::default(),
            visible: true,
            locked: false,
            mask_id: None,
            data,
        }
    }
}
