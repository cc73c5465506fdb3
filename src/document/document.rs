//! The document aggregate.
//!
//! One project header plus six id-keyed tables. The aggregate owns all
//! subordinate entities exclusively: a collaboration room holds exactly one
//! document in memory and nothing else keeps a long-lived reference to it.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::document::asset::Asset;
use crate::document::object::ObjectNode;
use crate::document::timeline::{Keyframe, Timeline, Track};
use crate::errors::{CelError, Result};

/// A drawing surface: fixed pixel size, a background color and the root of
/// its object tree (always a Group or Symbol).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: String,
    pub name: String,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub background_color: String,
    pub root_object_id: String,
}

/// Partial scene for the `scene.update` operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScenePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(alias = "backgroundColor", skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

/// The whole project: header fields plus the six entity tables.
///
/// The JSON shape of this struct is the snapshot format and the `doc.sync`
/// payload; tables are maps keyed by entity id, ordering lives in the
/// header's `scenes`/`assets` lists and in each parent's `children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: u64,
    pub fps: u32,
    pub root_timeline_id: String,
    /// Scene ids in display order.
    #[serde(default)]
    pub scenes: Vec<String>,
    /// Asset ids in upload order.
    #[serde(default)]
    pub assets: Vec<String>,
    #[serde(default, rename = "scenesById")]
    pub scenes_by_id: FxHashMap<String, Scene>,
    #[serde(default)]
    pub objects: FxHashMap<String, ObjectNode>,
    #[serde(default)]
    pub timelines: FxHashMap<String, Timeline>,
    #[serde(default)]
    pub tracks: FxHashMap<String, Track>,
    #[serde(default)]
    pub keyframes: FxHashMap<String, Keyframe>,
    #[serde(default, rename = "assetsById")]
    pub assets_by_id: FxHashMap<String, Asset>,
}

impl Document {
    /// Parses and validates a snapshot.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: Self = serde_json::from_str(json)
            .map_err(|e| CelError::BadDocument(format!("parse failed: {e}")))?;
        doc.validate()?;
        Ok(doc)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    #[must_use]
    pub fn object(&self, id: &str) -> Option<&ObjectNode> {
        self.objects.get(id)
    }

    #[must_use]
    pub fn scene(&self, id: &str) -> Option<&Scene> {
        self.scenes_by_id.get(id)
    }

    #[must_use]
    pub fn timeline(&self, id: &str) -> Option<&Timeline> {
        self.timelines.get(id)
    }

    #[must_use]
    pub fn track(&self, id: &str) -> Option<&Track> {
        self.tracks.get(id)
    }

    #[must_use]
    pub fn keyframe(&self, id: &str) -> Option<&Keyframe> {
        self.keyframes.get(id)
    }

    /// First scene in display order.
    #[must_use]
    pub fn first_scene_id(&self) -> Option<&str> {
        self.scenes
            .iter()
            .find(|id| self.scenes_by_id.contains_key(*id))
            .map(String::as_str)
    }

    /// Length of the root timeline in frames, 1 at minimum.
    #[must_use]
    pub fn total_frames(&self) -> u32 {
        self.timelines
            .get(&self.root_timeline_id)
            .map_or(1, |tl| tl.length.max(1))
    }

    /// True when `ancestor_id` appears on the parent chain of `id`
    /// (inclusive of `id` itself).
    #[must_use]
    pub fn is_same_or_descendant_of(&self, id: &str, ancestor_id: &str) -> bool {
        let mut cursor = Some(id);
        let mut hops = 0usize;
        while let Some(current) = cursor {
            if current == ancestor_id {
                return true;
            }
            hops += 1;
            if hops > self.objects.len() {
                // Broken parent chain; treat as related so callers refuse
                // to make things worse.
                return true;
            }
            cursor = self
                .objects
                .get(current)
                .and_then(|o| o.parent_id.as_deref());
        }
        false
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Checks the structural invariants: fps range, referenced ids, scene
    /// roots, the strict-tree shape of each object hierarchy and the
    /// keyframe sort order of every track.
    pub fn validate(&self) -> Result<()> {
        let bad = |msg: String| Err(CelError::BadDocument(msg));

        if self.fps == 0 || self.fps > 120 {
            return bad(format!("fps {} out of range 1..120", self.fps));
        }
        if !self.timelines.contains_key(&self.root_timeline_id) {
            return bad(format!(
                "rootTimelineId {} missing from timelines",
                self.root_timeline_id
            ));
        }

        for scene_id in &self.scenes {
            if !self.scenes_by_id.contains_key(scene_id) {
                return bad(format!("scene {scene_id} listed but missing"));
            }
        }
        for (id, scene) in &self.scenes_by_id {
            if *id != scene.id {
                return bad(format!("scene {id} keyed under wrong id"));
            }
            if scene.width <= 0.0 || scene.height <= 0.0 {
                return bad(format!("scene {id} has non-positive size"));
            }
            let Some(root) = self.objects.get(&scene.root_object_id) else {
                return bad(format!("scene {id} root object missing"));
            };
            if root.parent_id.is_some() {
                return bad(format!("scene {id} root object has a parent"));
            }
            if !root.data.can_root_scene() {
                return bad(format!(
                    "scene {id} root object must be a Group or Symbol, got {}",
                    root.data.kind()
                ));
            }
        }

        let mut claimed: FxHashSet<&str> = FxHashSet::default();
        for (id, object) in &self.objects {
            if *id != object.id {
                return bad(format!("object {id} keyed under wrong id"));
            }
            for child_id in &object.children {
                let Some(child) = self.objects.get(child_id) else {
                    return bad(format!("object {id} lists missing child {child_id}"));
                };
                if child.parent_id.as_deref() != Some(id.as_str()) {
                    return bad(format!("child {child_id} does not point back at {id}"));
                }
                if !claimed.insert(child_id.as_str()) {
                    return bad(format!("object {child_id} appears in two children lists"));
                }
            }
            if let Some(parent_id) = &object.parent_id {
                let Some(parent) = self.objects.get(parent_id) else {
                    return bad(format!("object {id} has missing parent {parent_id}"));
                };
                if !parent.children.iter().any(|c| c == id) {
                    return bad(format!("object {id} absent from parent children list"));
                }
            }
        }
        // Parent chains must terminate at a root; a cycle never does.
        for id in self.objects.keys() {
            let mut cursor = self.objects.get(id);
            let mut hops = 0usize;
            while let Some(object) = cursor {
                match &object.parent_id {
                    None => break,
                    Some(parent_id) => {
                        hops += 1;
                        if hops > self.objects.len() {
                            return bad(format!("cycle in parent chain of object {id}"));
                        }
                        cursor = self.objects.get(parent_id);
                    }
                }
            }
        }

        for (id, timeline) in &self.timelines {
            if timeline.length == 0 {
                return bad(format!("timeline {id} has zero length"));
            }
            for track_id in &timeline.tracks {
                if !self.tracks.contains_key(track_id) {
                    return bad(format!("timeline {id} lists missing track {track_id}"));
                }
            }
        }
        for (id, track) in &self.tracks {
            let mut last_frame = 0u32;
            for (i, key_id) in track.keys.iter().enumerate() {
                let Some(key) = self.keyframes.get(key_id) else {
                    return bad(format!("track {id} lists missing keyframe {key_id}"));
                };
                if i > 0 && key.frame < last_frame {
                    return bad(format!("track {id} keys not sorted by frame"));
                }
                last_frame = key.frame;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::samples;

    #[test]
    fn seed_validates() {
        let doc = samples::seed_document("proj_test", "Untitled");
        doc.validate().unwrap();
        assert_eq!(doc.scenes.len(), 1);
        assert_eq!(doc.total_frames(), samples::SEED_TIMELINE_LENGTH);
    }

    #[test]
    fn sample_validates_and_roundtrips() {
        let doc = samples::sample_document("proj_demo");
        doc.validate().unwrap();
        let json = doc.to_json_string().unwrap();
        let back = Document::from_json(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn validate_rejects_bad_fps() {
        let mut doc = samples::seed_document("proj_test", "Untitled");
        doc.fps = 0;
        assert!(doc.validate().is_err());
    }

    #[test]
    fn validate_rejects_dangling_child() {
        let mut doc = samples::seed_document("proj_test", "Untitled");
        let root_id = doc.scenes_by_id[samples::SEED_SCENE_ID]
            .root_object_id
            .clone();
        doc.objects
            .get_mut(&root_id)
            .unwrap()
            .children
            .push("obj_ghost".into());
        assert!(doc.validate().is_err());
    }

    #[test]
    fn descendant_walk() {
        let doc = samples::sample_document("proj_demo");
        assert!(doc.is_same_or_descendant_of(samples::SAMPLE_RECT_ID, samples::SAMPLE_SYMBOL_ID));
        assert!(!doc.is_same_or_descendant_of(samples::SAMPLE_SYMBOL_ID, samples::SAMPLE_RECT_ID));
    }
}
