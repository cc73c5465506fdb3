//! Hit testing and selection bounds against an evaluated scene graph.

use crate::math::Rect;
use crate::scene::node::{SceneGraph, SceneNode};

/// Returns the front-most object whose rendered bounds contain `(x, y)`.
///
/// Children are visited last-to-first so later siblings (painted on top)
/// win. Only nodes with renderable content report themselves; groups and
/// symbols are transparent to picking. Invisible subtrees never made it
/// into the graph, so they can never hit.
#[must_use]
pub fn hit_test(graph: &SceneGraph, x: f64, y: f64) -> Option<String> {
    graph.root.and_then(|root| hit_node(graph, root, x, y))
}

fn hit_node(graph: &SceneGraph, index: usize, x: f64, y: f64) -> Option<String> {
    let node = &graph.nodes[index];
    for &child in node.children.iter().rev() {
        if let Some(hit) = hit_node(graph, child, x, y) {
            return Some(hit);
        }
    }
    if hits_directly(node, x, y) {
        return Some(node.id.clone());
    }
    None
}

fn hits_directly(node: &SceneNode, x: f64, y: f64) -> bool {
    node.geometry.is_some() && node.bounds.is_some_and(|b| b.contains(x, y))
}

/// Union of the world bounds of `ids` that exist in the graph and have
/// non-empty bounds. `None` when nothing selectable matched.
#[must_use]
pub fn selection_bounds(graph: &SceneGraph, ids: &[String]) -> Option<Rect> {
    ids.iter()
        .filter_map(|id| graph.get(id).and_then(|node| node.bounds))
        .reduce(|a, b| a.union(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::samples::{SEED_SCENE_ID, sample_document};
    use crate::scene::build_scene;
    use rustc_hash::FxHashMap;

    fn graph_at(frame: u32, playing: bool) -> SceneGraph {
        let doc = sample_document("proj_demo");
        build_scene(&doc, SEED_SCENE_ID, frame, playing, &FxHashMap::default()).unwrap()
    }

    #[test]
    fn front_most_wins() {
        let graph = graph_at(0, false);
        // The orb covers the backdrop around (160, 270).
        assert_eq!(hit_test(&graph, 160.0, 270.0), Some("obj_orb".into()));
        // Far corner only the backdrop covers.
        assert_eq!(hit_test(&graph, 5.0, 5.0), Some("obj_backdrop".into()));
    }

    #[test]
    fn symbol_is_transparent_to_picking() {
        let graph = graph_at(0, false);
        // Inside the pin arm; the hit is the rect, never the symbol.
        assert_eq!(hit_test(&graph, 500.0, 450.0), Some("obj_pin_arm".into()));
    }

    #[test]
    fn miss_outside_scene() {
        let graph = graph_at(0, false);
        assert_eq!(hit_test(&graph, -50.0, -50.0), None);
    }

    #[test]
    fn selection_union() {
        let graph = graph_at(0, false);
        let ids = vec!["obj_orb".to_string(), "obj_pin_arm".to_string()];
        let bounds = selection_bounds(&graph, &ids).unwrap();
        let orb = graph.get("obj_orb").unwrap().bounds.unwrap();
        let arm = graph.get("obj_pin_arm").unwrap().bounds.unwrap();
        assert_eq!(bounds, orb.union(&arm));
    }

    #[test]
    fn selection_ignores_unknown_ids() {
        let graph = graph_at(0, false);
        assert!(selection_bounds(&graph, &["obj_nope".to_string()]).is_none());
    }
}
