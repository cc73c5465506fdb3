//! Geometry synthesis.
//!
//! Turns a node's kind-specific payload into renderable geometry. Shapes
//! become path commands in local coordinates; raster images stay a
//! reference plus natural size; groups, symbols and text carry no geometry
//! of their own.

use crate::document::{NodeData, PathCommand};

/// Circle-from-beziers constant `4(√2−1)/3`.
pub const ELLIPSE_KAPPA: f64 = 0.552_284_749_830_793_6;

/// Renderable content of one scene node.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    None,
    Path(Vec<PathCommand>),
    Image {
        asset_id: String,
        width: f64,
        height: f64,
    },
}

impl Geometry {
    #[must_use]
    pub fn is_some(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Rectangle outline with the local origin at the top-left corner.
#[must_use]
pub fn rect_path(width: f64, height: f64) -> Vec<PathCommand> {
    vec![
        PathCommand::move_to(0.0, 0.0),
        PathCommand::line_to(width, 0.0),
        PathCommand::line_to(width, height),
        PathCommand::line_to(0.0, height),
        PathCommand::close(),
    ]
}

/// Ellipse centered on the local origin, approximated by four cubic bezier
/// segments. All control points stay inside the `[-rx, rx] × [-ry, ry]`
/// box, so control-point bounds equal the true extents.
#[must_use]
pub fn ellipse_path(rx: f64, ry: f64) -> Vec<PathCommand> {
    let kx = rx * ELLIPSE_KAPPA;
    let ky = ry * ELLIPSE_KAPPA;
    vec![
        PathCommand::move_to(rx, 0.0),
        PathCommand::cubic_to(rx, ky, kx, ry, 0.0, ry),
        PathCommand::cubic_to(-kx, ry, -rx, ky, -rx, 0.0),
        PathCommand::cubic_to(-rx, -ky, -kx, -ry, 0.0, -ry),
        PathCommand::cubic_to(kx, -ry, rx, -ky, rx, 0.0),
        PathCommand::close(),
    ]
}

/// Synthesizes geometry for a node payload.
#[must_use]
pub fn synthesize_geometry(data: &NodeData) -> Geometry {
    match data {
        NodeData::ShapeRect { width, height } => Geometry::Path(rect_path(*width, *height)),
        NodeData::ShapeEllipse { rx, ry } => Geometry::Path(ellipse_path(*rx, *ry)),
        NodeData::VectorPath { commands } => Geometry::Path(commands.clone()),
        NodeData::RasterImage {
            asset_id,
            width,
            height,
        } => Geometry::Image {
            asset_id: asset_id.clone(),
            width: *width,
            height: *height,
        },
        NodeData::Group {} | NodeData::Symbol { .. } | NodeData::Text { .. } => Geometry::None,
    }
}
