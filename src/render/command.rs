//! Renderer-agnostic draw commands.
//!
//! The serialized form is the wire contract consumed by the canvas
//! renderer and the export player: `transform` is always a 6-float array,
//! `path` an array of `[opcode, coords…]` rows, and absent `fill`/`stroke`
//! mean "do not paint that channel".

use serde::{Deserialize, Serialize};

use crate::document::PathCommand;
use crate::math::Mat2D;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DrawCommand {
    /// Fill and/or stroke a path under an absolute world transform.
    #[serde(rename_all = "camelCase")]
    Path {
        object_id: String,
        transform: Mat2D,
        path: Vec<PathCommand>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stroke: Option<String>,
        stroke_width: f64,
        opacity: f64,
    },
    /// Blit an asset at its natural size under an absolute world transform.
    #[serde(rename_all = "camelCase")]
    Image {
        object_id: String,
        transform: Mat2D,
        asset_id: String,
        width: f64,
        height: f64,
        opacity: f64,
    },
    /// Push renderer state.
    Save,
    /// Pop renderer state.
    Restore,
    /// Intersect the current clip region with a path.
    Clip {
        transform: Mat2D,
        path: Vec<PathCommand>,
    },
}
