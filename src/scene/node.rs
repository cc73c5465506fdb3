//! Retained scene graph nodes.
//!
//! Nodes live in a flat arena inside [`SceneGraph`] and link to their
//! children by index; the graph carries an `objectId → index` lookup for
//! the query surface. Only hot evaluated data lives here; the document
//! stays the single source of truth for everything else.

use rustc_hash::FxHashMap;

use crate::document::{PathCommand, Style};
use crate::math::{Mat2D, Rect};
use crate::scene::geometry::Geometry;

/// A resolved clip mask: the mask object's geometry and the world matrix
/// it is clipped under.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRef {
    pub transform: Mat2D,
    pub path: Vec<PathCommand>,
}

/// One evaluated node: world transform, inherited opacity, resolved style,
/// synthesized geometry and world-space bounds.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub id: String,
    /// Wire kind tag of the source object (`"Group"`, `"ShapeRect"`, …).
    pub kind: &'static str,
    pub world: Mat2D,
    pub opacity: f64,
    pub style: Style,
    pub geometry: Geometry,
    /// World AABB of own geometry unioned with all visible children;
    /// `None` when the subtree renders nothing measurable.
    pub bounds: Option<Rect>,
    pub clip: Option<ClipRef>,
    /// Child indices into the owning graph's arena, in stored order.
    pub children: Vec<usize>,
}

/// The evaluated scene: an arena of nodes plus the root index and lookup.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    pub scene_id: String,
    pub width: f64,
    pub height: f64,
    pub background_color: String,
    pub nodes: Vec<SceneNode>,
    pub root: Option<usize>,
    pub lookup: FxHashMap<String, usize>,
}

impl SceneGraph {
    /// Looks a node up by object id.
    #[must_use]
    pub fn get(&self, object_id: &str) -> Option<&SceneNode> {
        self.lookup.get(object_id).map(|&i| &self.nodes[i])
    }

    #[must_use]
    pub fn root_node(&self) -> Option<&SceneNode> {
        self.root.map(|i| &self.nodes[i])
    }

    /// Number of nodes that survived the visibility gate.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
