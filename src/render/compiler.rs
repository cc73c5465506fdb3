//! Scene graph → draw-command list.
//!
//! A pre-order walk of the visible nodes, so the list paints back-to-front
//! in stored child order. A node carrying a clip-mask reference brackets
//! itself and its subtree in `save`/`clip` … `restore`.

use crate::render::command::DrawCommand;
use crate::scene::geometry::Geometry;
use crate::scene::node::SceneGraph;

/// Compiles the painter-ordered command list for an evaluated scene.
#[must_use]
pub fn compile_commands(graph: &SceneGraph) -> Vec<DrawCommand> {
    let mut out = Vec::with_capacity(graph.len() + 2);
    if let Some(root) = graph.root {
        emit_node(graph, root, &mut out);
    }
    out
}

fn emit_node(graph: &SceneGraph, index: usize, out: &mut Vec<DrawCommand>) {
    let node = &graph.nodes[index];

    let clipped = node.clip.is_some();
    if let Some(clip) = &node.clip {
        out.push(DrawCommand::Save);
        out.push(DrawCommand::Clip {
            transform: clip.transform,
            path: clip.path.clone(),
        });
    }

    match &node.geometry {
        Geometry::Path(path) => out.push(DrawCommand::Path {
            object_id: node.id.clone(),
            transform: node.world,
            path: path.clone(),
            fill: non_empty(&node.style.fill),
            stroke: non_empty(&node.style.stroke),
            stroke_width: node.style.stroke_width,
            opacity: node.opacity,
        }),
        Geometry::Image {
            asset_id,
            width,
            height,
        } => out.push(DrawCommand::Image {
            object_id: node.id.clone(),
            transform: node.world,
            asset_id: asset_id.clone(),
            width: *width,
            height: *height,
            opacity: node.opacity,
        }),
        Geometry::None => {}
    }

    for &child in &node.children {
        emit_node(graph, child, out);
    }

    if clipped {
        out.push(DrawCommand::Restore);
    }
}

fn non_empty(color: &str) -> Option<String> {
    if color.is_empty() {
        None
    } else {
        Some(color.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::samples::{SEED_SCENE_ID, sample_document};
    use crate::scene::build_scene;
    use rustc_hash::FxHashMap;

    #[test]
    fn painter_order_follows_stored_children() {
        let doc = sample_document("proj_demo");
        let graph = build_scene(&doc, SEED_SCENE_ID, 0, false, &FxHashMap::default()).unwrap();
        let commands = compile_commands(&graph);

        let ids: Vec<&str> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Path { object_id, .. } | DrawCommand::Image { object_id, .. } => {
                    Some(object_id.as_str())
                }
                _ => None,
            })
            .collect();
        // Backdrop paints first, the symbol's arm last.
        assert_eq!(ids.first(), Some(&"obj_backdrop"));
        assert_eq!(ids.last(), Some(&"obj_pin_arm"));
        // Group/Symbol/Text nodes emit no draw of their own.
        assert!(!ids.contains(&"obj_pin"));
        assert!(!ids.contains(&"obj_root"));
    }

    #[test]
    fn clip_mask_brackets_subtree() {
        let mut doc = sample_document("proj_demo");
        doc.objects.get_mut("obj_pin").unwrap().mask_id = Some("obj_orb".to_string());
        let graph = build_scene(&doc, SEED_SCENE_ID, 0, false, &FxHashMap::default()).unwrap();
        let commands = compile_commands(&graph);

        let tags: Vec<&str> = commands
            .iter()
            .map(|c| match c {
                DrawCommand::Save => "save",
                DrawCommand::Restore => "restore",
                DrawCommand::Clip { .. } => "clip",
                DrawCommand::Path { object_id, .. } | DrawCommand::Image { object_id, .. } => {
                    object_id.as_str()
                }
            })
            .collect();
        let save = tags.iter().position(|t| *t == "save").unwrap();
        let arm = tags.iter().position(|t| *t == "obj_pin_arm").unwrap();
        let restore = tags.iter().position(|t| *t == "restore").unwrap();
        assert_eq!(tags[save + 1], "clip");
        assert!(save < arm && arm < restore, "arm paints inside the bracket");
    }

    #[test]
    fn determinism_byte_identical() {
        let doc = sample_document("proj_demo");
        let a = serde_json::to_string(&compile_commands(
            &build_scene(&doc, SEED_SCENE_ID, 12, true, &FxHashMap::default()).unwrap(),
        ))
        .unwrap();
        let b = serde_json::to_string(&compile_commands(
            &build_scene(&doc, SEED_SCENE_ID, 12, true, &FxHashMap::default()).unwrap(),
        ))
        .unwrap();
        assert_eq!(a, b);
    }
}
