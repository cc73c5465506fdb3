//! Scene graph construction.
//!
//! The traversal contract per node, strictly in this order: visibility
//! gate, Symbol timeline merge, override application, matrix composition,
//! opacity inheritance, geometry synthesis, bounds, recursion over
//! children in stored order. In editing mode (`playing == false`) the
//! override pass is skipped entirely so editing handles track the stored
//! document values; drag overlays apply in both modes.

use glam::DVec2;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::animation::{Overrides, evaluate_timeline, evaluate_timeline_into};
use crate::document::{Document, NodeData, TransformPatch};
use crate::errors::{CelError, Result};
use crate::math::{Mat2D, Rect};
use crate::scene::geometry::{Geometry, synthesize_geometry};
use crate::scene::node::{ClipRef, SceneGraph, SceneNode};

/// Evaluates `scene_id` at `frame` into a retained scene graph.
///
/// `drag_overlays` is the engine's transient per-object transform override
/// table; pass an empty map when no drag is in flight.
pub fn build_scene(
    document: &Document,
    scene_id: &str,
    frame: u32,
    playing: bool,
    drag_overlays: &FxHashMap<String, TransformPatch>,
) -> Result<SceneGraph> {
    let scene = document
        .scene(scene_id)
        .ok_or_else(|| CelError::SceneNotFound(scene_id.to_string()))?;

    let mut graph = SceneGraph {
        scene_id: scene.id.clone(),
        width: scene.width,
        height: scene.height,
        background_color: scene.background_color.clone(),
        nodes: Vec::new(),
        root: None,
        lookup: FxHashMap::default(),
    };

    let mut overrides = if playing {
        evaluate_timeline(document, &document.root_timeline_id, frame)
    } else {
        Overrides::new()
    };
    // Timelines already merged this pass; seeded with the root so a Symbol
    // pointing at the root timeline cannot merge it twice.
    let mut merged: FxHashSet<String> = FxHashSet::default();
    merged.insert(document.root_timeline_id.clone());

    let mut builder = Builder {
        document,
        frame,
        playing,
        drag_overlays,
        overrides: &mut overrides,
        merged: &mut merged,
    };
    graph.root = builder.build_node(&scene.root_object_id, Mat2D::IDENTITY, 1.0, &mut graph);

    Ok(graph)
}

struct Builder<'a> {
    document: &'a Document,
    frame: u32,
    playing: bool,
    drag_overlays: &'a FxHashMap<String, TransformPatch>,
    overrides: &'a mut Overrides,
    merged: &'a mut FxHashSet<String>,
}

impl Builder<'_> {
    fn build_node(
        &mut self,
        object_id: &str,
        parent_world: Mat2D,
        parent_opacity: f64,
        graph: &mut SceneGraph,
    ) -> Option<usize> {
        let Some(object) = self.document.object(object_id) else {
            log::warn!("scene references missing object {object_id}");
            return None;
        };
        // 1. Visibility gate: the whole subtree drops out.
        if !object.visible {
            return None;
        }

        // 2. Symbol timeline merge, before this node's own transform so
        //    self-targeted overrides apply to the symbol itself.
        if self.playing {
            if let NodeData::Symbol {
                timeline_id: Some(timeline_id),
                ..
            } = &object.data
            {
                if self.merged.insert(timeline_id.clone()) {
                    evaluate_timeline_into(self.document, timeline_id, self.frame, self.overrides);
                }
            }
        }

        // 3. Override application on copies of the stored values.
        let mut transform = object.transform;
        let mut style = object.style.clone();
        if self.playing {
            self.overrides.apply_to(object_id, &mut transform, &mut style);
        }
        if let Some(patch) = self.drag_overlays.get(object_id) {
            patch.apply_to(&mut transform);
        }

        // 4. + 5. Matrix composition and opacity inheritance.
        let local = Mat2D::from_transform(
            transform.x,
            transform.y,
            transform.sx,
            transform.sy,
            transform.rotation,
            transform.anchor_x,
            transform.anchor_y,
            transform.skew_x,
            transform.skew_y,
        );
        let world = parent_world.multiply(&local);
        let opacity = parent_opacity * style.opacity.clamp(0.0, 1.0);

        // 6. + 7. Geometry synthesis and own bounds.
        let geometry = synthesize_geometry(&object.data);
        let own_bounds = geometry_bounds(&geometry, &world);

        let clip = object
            .mask_id
            .as_deref()
            .and_then(|mask_id| self.resolve_clip(mask_id, parent_world));

        let index = graph.nodes.len();
        graph.nodes.push(SceneNode {
            id: object.id.clone(),
            kind: object.data.kind(),
            world,
            opacity,
            style,
            geometry,
            bounds: own_bounds,
            clip,
            children: Vec::new(),
        });
        graph.lookup.insert(object.id.clone(), index);

        // 8. Recurse in stored order; invisible children return None and
        //    contribute nothing.
        let mut bounds = own_bounds;
        for child_id in &object.children {
            if let Some(child_index) = self.build_node(child_id, world, opacity, graph) {
                graph.nodes[index].children.push(child_index);
                bounds = match (bounds, graph.nodes[child_index].bounds) {
                    (Some(a), Some(b)) => Some(a.union(&b)),
                    (a, b) => a.or(b),
                };
            }
        }
        graph.nodes[index].bounds = bounds;

        Some(index)
    }

    /// Resolves a clip-mask reference to the mask object's path geometry
    /// under the world matrix it would paint with as a sibling.
    fn resolve_clip(&mut self, mask_id: &str, parent_world: Mat2D) -> Option<ClipRef> {
        let mask = self.document.object(mask_id)?;
        let mut transform = mask.transform;
        let mut style = mask.style.clone();
        if self.playing {
            self.overrides.apply_to(mask_id, &mut transform, &mut style);
        }
        let local = Mat2D::from_transform(
            transform.x,
            transform.y,
            transform.sx,
            transform.sy,
            transform.rotation,
            transform.anchor_x,
            transform.anchor_y,
            transform.skew_x,
            transform.skew_y,
        );
        match synthesize_geometry(&mask.data) {
            Geometry::Path(path) => Some(ClipRef {
                transform: parent_world.multiply(&local),
                path,
            }),
            _ => None,
        }
    }
}

fn geometry_bounds(geometry: &Geometry, world: &Mat2D) -> Option<Rect> {
    match geometry {
        Geometry::None => None,
        Geometry::Path(commands) => {
            let points: Vec<DVec2> = commands
                .iter()
                .flat_map(|cmd| cmd.points().map(|(x, y)| world.apply_point(x, y)))
                .collect();
            Rect::from_points(&points)
        }
        Geometry::Image { width, height, .. } => {
            Some(world.apply_rect(&Rect::new(0.0, 0.0, *width, *height)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::samples::{
        SAMPLE_RECT_ID, SAMPLE_SYMBOL_ID, SEED_SCENE_ID, sample_document,
    };

    fn no_drag() -> FxHashMap<String, TransformPatch> {
        FxHashMap::default()
    }

    #[test]
    fn edit_mode_uses_stored_values() {
        let doc = sample_document("proj_demo");
        let graph = build_scene(&doc, SEED_SCENE_ID, 12, false, &no_drag()).unwrap();
        let orb = graph.get("obj_orb").unwrap();
        // Stored x is 160; the timeline would move it at frame 12.
        let p = orb.world.apply_point(0.0, 0.0);
        assert!((p.x - 160.0).abs() < 1e-9);
    }

    #[test]
    fn playing_mode_applies_overrides() {
        let doc = sample_document("proj_demo");
        let graph = build_scene(&doc, SEED_SCENE_ID, 119, true, &no_drag()).unwrap();
        let orb = graph.get("obj_orb").unwrap();
        let p = orb.world.apply_point(0.0, 0.0);
        assert!((p.x - 760.0).abs() < 1e-9, "got {}", p.x);
    }

    #[test]
    fn symbol_timeline_rotates_symbol_itself() {
        let doc = sample_document("proj_demo");
        let graph = build_scene(&doc, SEED_SCENE_ID, 12, true, &no_drag()).unwrap();
        let symbol = graph.get(SAMPLE_SYMBOL_ID).unwrap();

        let angle = (12.0 / 23.0) * 360.0_f64;
        let expected = Mat2D::translation(500.0, 450.0)
            .multiply(&Mat2D::rotation(angle.to_radians()));
        assert!(symbol.world.approx_eq(&expected, 1e-9));

        // Child AABB is the rotated [-30,-50,30,50] box.
        let child = graph.get(SAMPLE_RECT_ID).unwrap();
        let expected_bounds = expected.apply_rect(&Rect::new(-30.0, -50.0, 60.0, 100.0));
        let bounds = child.bounds.unwrap();
        assert!((bounds.x - expected_bounds.x).abs() < 1e-9);
        assert!((bounds.y - expected_bounds.y).abs() < 1e-9);
        assert!((bounds.width - expected_bounds.width).abs() < 1e-9);
        assert!((bounds.height - expected_bounds.height).abs() < 1e-9);
    }

    #[test]
    fn invisible_subtree_is_dropped() {
        let mut doc = sample_document("proj_demo");
        doc.objects.get_mut(SAMPLE_SYMBOL_ID).unwrap().visible = false;
        let graph = build_scene(&doc, SEED_SCENE_ID, 0, true, &no_drag()).unwrap();
        assert!(graph.get(SAMPLE_SYMBOL_ID).is_none());
        assert!(graph.get(SAMPLE_RECT_ID).is_none());
    }

    #[test]
    fn drag_overlay_applies_in_edit_mode() {
        let doc = sample_document("proj_demo");
        let mut drag = FxHashMap::default();
        drag.insert("obj_orb".to_string(), TransformPatch {
            x: Some(640.0),
            ..TransformPatch::default()
        });
        let graph = build_scene(&doc, SEED_SCENE_ID, 0, false, &drag).unwrap();
        let p = graph.get("obj_orb").unwrap().world.apply_point(0.0, 0.0);
        assert!((p.x - 640.0).abs() < 1e-9);
    }

    #[test]
    fn opacity_inherits_multiplicatively() {
        let mut doc = sample_document("proj_demo");
        doc.objects
            .get_mut(SAMPLE_SYMBOL_ID)
            .unwrap()
            .style
            .opacity = 0.5;
        doc.objects.get_mut(SAMPLE_RECT_ID).unwrap().style.opacity = 0.5;
        let graph = build_scene(&doc, SEED_SCENE_ID, 0, false, &no_drag()).unwrap();
        let child = graph.get(SAMPLE_RECT_ID).unwrap();
        assert!((child.opacity - 0.25).abs() < 1e-12);
    }
}
