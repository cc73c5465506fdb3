//! Operation application.
//!
//! `apply_operation` is a pure function of `(document, operation)`: on
//! success the document holds the mutation, on failure it is left exactly
//! as it was. Every branch validates all lookups and field values before
//! touching any table. The error `Display` strings become `op.nack`
//! reasons verbatim.

use crate::collab::ops::{OpKind, Operation};
use crate::document::{Asset, Document, ObjectNode, Scene};
use crate::errors::OpError;

fn require<'a, T>(field: Option<&'a T>, name: &'static str) -> Result<&'a T, OpError> {
    field.ok_or(OpError::MissingField(name))
}

/// Applies one operation, leaving the document untouched on failure.
pub fn apply_operation(document: &mut Document, op: &Operation) -> Result<(), OpError> {
    match &op.kind {
        OpKind::ObjectTransform {
            object_id,
            transform,
        } => {
            let object_id = require(object_id.as_ref(), "objectId")?;
            let patch = require(transform.as_ref(), "transform")?;
            let object = document
                .objects
                .get_mut(object_id)
                .ok_or(OpError::NotFound("object"))?;
            patch.apply_to(&mut object.transform);
            Ok(())
        }

        OpKind::ObjectStyle { object_id, style } => {
            let object_id = require(object_id.as_ref(), "objectId")?;
            let patch = require(style.as_ref(), "style")?;
            let object = document
                .objects
                .get_mut(object_id)
                .ok_or(OpError::NotFound("object"))?;
            patch.apply_to(&mut object.style);
            Ok(())
        }

        OpKind::ObjectVisibility { object_id, visible } => {
            let object_id = require(object_id.as_ref(), "objectId")?;
            let visible = *require(visible.as_ref(), "visible")?;
            let object = document
                .objects
                .get_mut(object_id)
                .ok_or(OpError::NotFound("object"))?;
            object.visible = visible;
            Ok(())
        }

        OpKind::ObjectLocked { object_id, locked } => {
            let object_id = require(object_id.as_ref(), "objectId")?;
            let locked = *require(locked.as_ref(), "locked")?;
            let object = document
                .objects
                .get_mut(object_id)
                .ok_or(OpError::NotFound("object"))?;
            object.locked = locked;
            Ok(())
        }

        OpKind::ObjectData { object_id, data } => {
            let object_id = require(object_id.as_ref(), "objectId")?;
            let patch = require(data.as_ref(), "data")?;
            let object = document
                .objects
                .get(object_id)
                .ok_or(OpError::NotFound("object"))?;
            // Build the merged payload first so a bad patch mutates nothing.
            let merged = object.data.merged(patch)?;
            if let Some(object) = document.objects.get_mut(object_id) {
                object.data = merged;
            }
            Ok(())
        }

        OpKind::ObjectCreate {
            object,
            parent_id,
            index,
            asset,
        } => apply_object_create(
            document,
            object.as_deref(),
            parent_id.as_ref(),
            *index,
            asset.as_ref(),
        ),

        OpKind::ObjectDelete { object_id } => {
            let object_id = require(object_id.as_ref(), "objectId")?;
            let object = document
                .objects
                .get(object_id)
                .ok_or(OpError::NotFound("object"))?;
            // Scene roots are deleted via scene.delete; removing one here
            // would leave a scene without a tree.
            let Some(parent_id) = object.parent_id.clone() else {
                return Err(OpError::InvalidField("objectId"));
            };
            if let Some(parent) = document.objects.get_mut(&parent_id) {
                parent.children.retain(|c| c != object_id);
            }
            document.objects.remove(object_id);
            Ok(())
        }

        OpKind::ObjectReparent {
            object_id,
            new_parent_id,
            new_index,
        } => {
            let object_id = require(object_id.as_ref(), "objectId")?;
            let new_parent_id = require(new_parent_id.as_ref(), "newParentId")?;
            let new_index = *require(new_index.as_ref(), "newIndex")?;

            let object = document
                .objects
                .get(object_id)
                .ok_or(OpError::NotFound("object"))?;
            let Some(old_parent_id) = object.parent_id.clone() else {
                return Err(OpError::InvalidField("objectId"));
            };
            if !document.objects.contains_key(new_parent_id) {
                return Err(OpError::NotFound("object"));
            }
            // Reparenting under the node itself or a descendant would cut
            // the subtree loose as a cycle.
            if document.is_same_or_descendant_of(new_parent_id, object_id) {
                return Err(OpError::InvalidField("newParentId"));
            }

            if let Some(old_parent) = document.objects.get_mut(&old_parent_id) {
                old_parent.children.retain(|c| c != object_id);
            }
            if let Some(new_parent) = document.objects.get_mut(new_parent_id) {
                let at = new_index.min(new_parent.children.len());
                new_parent.children.insert(at, object_id.clone());
            }
            if let Some(object) = document.objects.get_mut(object_id) {
                object.parent_id = Some(new_parent_id.clone());
            }
            Ok(())
        }

        OpKind::SceneCreate { scene, root_object } => {
            apply_scene_create(document, scene.as_ref(), root_object.as_deref())
        }

        OpKind::SceneUpdate { scene_id, changes } => {
            let scene_id = require(scene_id.as_ref(), "sceneId")?;
            let changes = require(changes.as_ref(), "changes")?;
            if !document.scenes_by_id.contains_key(scene_id) {
                return Err(OpError::NotFound("scene"));
            }
            if changes.width.is_some_and(|w| w <= 0.0 || !w.is_finite()) {
                return Err(OpError::InvalidField("width"));
            }
            if changes.height.is_some_and(|h| h <= 0.0 || !h.is_finite()) {
                return Err(OpError::InvalidField("height"));
            }
            if let Some(scene) = document.scenes_by_id.get_mut(scene_id) {
                if let Some(name) = &changes.name {
                    scene.name = name.clone();
                }
                if let Some(width) = changes.width {
                    scene.width = width;
                }
                if let Some(height) = changes.height {
                    scene.height = height;
                }
                if let Some(background) = &changes.background {
                    scene.background_color = background.clone();
                }
            }
            Ok(())
        }

        OpKind::SceneDelete { scene_id } => {
            let scene_id = require(scene_id.as_ref(), "sceneId")?;
            let scene = document
                .scenes_by_id
                .get(scene_id)
                .ok_or(OpError::NotFound("scene"))?;
            let root_object_id = scene.root_object_id.clone();
            document.scenes_by_id.remove(scene_id);
            document.objects.remove(&root_object_id);
            document.scenes.retain(|s| s != scene_id);
            Ok(())
        }

        OpKind::ProjectRename { name } => {
            let name = require(name.as_ref(), "name")?;
            document.name = name.clone();
            Ok(())
        }

        OpKind::TimelineUpdate {
            timeline_id,
            changes,
        } => {
            let timeline_id = require(timeline_id.as_ref(), "timelineId")?;
            let changes = require(changes.as_ref(), "changes")?;
            if changes.length == Some(0) {
                return Err(OpError::InvalidField("length"));
            }
            let timeline = document
                .timelines
                .get_mut(timeline_id)
                .ok_or(OpError::NotFound("timeline"))?;
            if let Some(length) = changes.length {
                timeline.length = length;
            }
            Ok(())
        }

        OpKind::TrackCreate { timeline_id, track } => {
            let timeline_id = require(timeline_id.as_ref(), "timelineId")?;
            let track = require(track.as_ref(), "track")?;
            if !document.timelines.contains_key(timeline_id) {
                return Err(OpError::NotFound("timeline"));
            }
            if document.tracks.contains_key(&track.id) {
                return Err(OpError::InvalidField("track"));
            }
            for key_id in &track.keys {
                if !document.keyframes.contains_key(key_id) {
                    return Err(OpError::NotFound("keyframe"));
                }
            }
            let mut track = track.clone();
            // Stable sort keeps insertion order among equal frames.
            track
                .keys
                .sort_by_key(|id| document.keyframes.get(id).map_or(0, |k| k.frame));
            let track_id = track.id.clone();
            document.tracks.insert(track_id.clone(), track);
            if let Some(timeline) = document.timelines.get_mut(timeline_id) {
                timeline.tracks.push(track_id);
            }
            Ok(())
        }

        OpKind::TrackDelete {
            timeline_id,
            track_id,
        } => {
            let timeline_id = require(timeline_id.as_ref(), "timelineId")?;
            let track_id = require(track_id.as_ref(), "trackId")?;
            if !document.timelines.contains_key(timeline_id) {
                return Err(OpError::NotFound("timeline"));
            }
            if !document.tracks.contains_key(track_id) {
                return Err(OpError::NotFound("track"));
            }
            if let Some(timeline) = document.timelines.get_mut(timeline_id) {
                timeline.tracks.retain(|t| t != track_id);
            }
            document.tracks.remove(track_id);
            Ok(())
        }

        OpKind::KeyframeAdd { track_id, keyframe } => {
            let track_id = require(track_id.as_ref(), "trackId")?;
            let keyframe = require(keyframe.as_ref(), "keyframe")?;
            if !document.tracks.contains_key(track_id) {
                return Err(OpError::NotFound("track"));
            }
            if document.keyframes.contains_key(&keyframe.id) {
                return Err(OpError::InvalidField("keyframe"));
            }
            let at = sorted_insert_position(document, track_id, keyframe.frame);
            document
                .keyframes
                .insert(keyframe.id.clone(), keyframe.clone());
            if let Some(track) = document.tracks.get_mut(track_id) {
                track.keys.insert(at, keyframe.id.clone());
            }
            Ok(())
        }

        OpKind::KeyframeUpdate {
            keyframe_id,
            changes,
            track_id,
        } => {
            let keyframe_id = require(keyframe_id.as_ref(), "keyframeId")?;
            let changes = require(changes.as_ref(), "changes")?;
            if !document.keyframes.contains_key(keyframe_id) {
                return Err(OpError::NotFound("keyframe"));
            }
            // Resolve the resort target before mutating anything.
            let resort = match (changes.frame, track_id) {
                (Some(_), Some(track_id)) => {
                    if !document.tracks.contains_key(track_id) {
                        return Err(OpError::NotFound("track"));
                    }
                    Some(track_id.clone())
                }
                _ => None,
            };
            if let Some(keyframe) = document.keyframes.get_mut(keyframe_id) {
                if let Some(frame) = changes.frame {
                    keyframe.frame = frame;
                }
                if let Some(value) = &changes.value {
                    keyframe.value = value.clone();
                }
                if let Some(easing) = changes.easing {
                    keyframe.easing = easing;
                }
            }
            if let Some(track_id) = resort {
                resort_track_keys(document, &track_id);
            }
            Ok(())
        }

        OpKind::KeyframeDelete {
            track_id,
            keyframe_id,
        } => {
            let track_id = require(track_id.as_ref(), "trackId")?;
            let keyframe_id = require(keyframe_id.as_ref(), "keyframeId")?;
            if !document.tracks.contains_key(track_id) {
                return Err(OpError::NotFound("track"));
            }
            if !document.keyframes.contains_key(keyframe_id) {
                return Err(OpError::NotFound("keyframe"));
            }
            if let Some(track) = document.tracks.get_mut(track_id) {
                track.keys.retain(|k| k != keyframe_id);
            }
            document.keyframes.remove(keyframe_id);
            Ok(())
        }
    }
}

fn apply_object_create(
    document: &mut Document,
    object: Option<&ObjectNode>,
    parent_id: Option<&String>,
    index: Option<usize>,
    asset: Option<&Asset>,
) -> Result<(), OpError> {
    let object = require(object, "object")?;
    let parent_id = require(parent_id, "parentId")?;
    if object.id.is_empty() {
        return Err(OpError::InvalidField("object"));
    }
    if document.objects.contains_key(&object.id) {
        return Err(OpError::InvalidField("object"));
    }
    if !document.objects.contains_key(parent_id) {
        return Err(OpError::NotFound("object"));
    }

    if let Some(asset) = asset {
        if !document.assets_by_id.contains_key(&asset.id) {
            document
                .assets_by_id
                .insert(asset.id.clone(), asset.clone());
        }
        if !document.assets.contains(&asset.id) {
            document.assets.push(asset.id.clone());
        }
    }

    let mut node = object.clone();
    node.parent_id = Some(parent_id.clone());
    // A freshly created node never arrives with children attached.
    node.children.clear();
    document.objects.insert(node.id.clone(), node);

    if let Some(parent) = document.objects.get_mut(parent_id) {
        let at = index
            .filter(|&i| i <= parent.children.len())
            .unwrap_or(parent.children.len());
        parent.children.insert(at, object.id.clone());
    }
    Ok(())
}

fn apply_scene_create(
    document: &mut Document,
    scene: Option<&Scene>,
    root_object: Option<&ObjectNode>,
) -> Result<(), OpError> {
    let scene = require(scene, "scene")?;
    let root_object = require(root_object, "rootObject")?;

    // Idempotent: replaying the same create is a no-op.
    if document.scenes_by_id.contains_key(&scene.id) {
        return Ok(());
    }
    if scene.width <= 0.0 || scene.height <= 0.0 {
        return Err(OpError::InvalidField("scene"));
    }
    if scene.root_object_id != root_object.id {
        return Err(OpError::InvalidField("rootObject"));
    }
    if !root_object.data.can_root_scene() {
        return Err(OpError::InvalidField("rootObject"));
    }
    if document.objects.contains_key(&root_object.id) {
        return Err(OpError::InvalidField("rootObject"));
    }

    let mut root = root_object.clone();
    root.parent_id = None;
    document.objects.insert(root.id.clone(), root);
    document
        .scenes_by_id
        .insert(scene.id.clone(), scene.clone());
    if !document.scenes.contains(&scene.id) {
        document.scenes.push(scene.id.clone());
    }
    Ok(())
}

/// Position in `track.keys` that keeps frames ascending, with a new key
/// sorting after any existing key at the same frame.
fn sorted_insert_position(document: &Document, track_id: &str, frame: u32) -> usize {
    let Some(track) = document.tracks.get(track_id) else {
        return 0;
    };
    track
        .keys
        .iter()
        .position(|key_id| {
            document
                .keyframes
                .get(key_id)
                .is_some_and(|k| k.frame > frame)
        })
        .unwrap_or(track.keys.len())
}

fn resort_track_keys(document: &mut Document, track_id: &str) {
    let Some(track) = document.tracks.get(track_id) else {
        return;
    };
    let mut keyed: Vec<(String, u32)> = track
        .keys
        .iter()
        .map(|id| {
            (
                id.clone(),
                document.keyframes.get(id).map_or(0, |k| k.frame),
            )
        })
        .collect();
    keyed.sort_by_key(|(_, frame)| *frame);
    if let Some(track) = document.tracks.get_mut(track_id) {
        track.keys = keyed.into_iter().map(|(id, _)| id).collect();
    }
}
