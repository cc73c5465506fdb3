//! The operation catalogue.
//!
//! Every mutation a client can make is one typed, immutable operation.
//! Required fields are modeled as `Option` so that a missing field fails
//! inside the dispatcher with the exact `"<field> is required"` nack
//! reason instead of a serde parse error; `previous` fields clients attach
//! for undo composition are simply ignored on decode.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::{
    Asset, Keyframe, KeyframePatch, ObjectNode, Scene, ScenePatch, StylePatch, TimelinePatch,
    Track, TransformPatch,
};
use crate::errors::OpError;

/// Wire names of every known operation, in catalogue order.
pub const KNOWN_TYPES: [&str; 18] = [
    "object.transform",
    "object.style",
    "object.visibility",
    "object.locked",
    "object.data",
    "object.create",
    "object.delete",
    "object.reparent",
    "scene.create",
    "scene.update",
    "scene.delete",
    "project.rename",
    "timeline.update",
    "track.create",
    "track.delete",
    "keyframe.add",
    "keyframe.update",
    "keyframe.delete",
];

/// One mutation: common envelope fields plus the per-type payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub kind: OpKind,
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default)]
    pub client_seq: u64,
}

impl Operation {
    /// Decodes an operation from raw JSON, mapping an unrecognized `type`
    /// to the dedicated nack reason before serde gets a chance to produce
    /// a generic message.
    pub fn from_value(value: Value) -> Result<Self, OpError> {
        let type_name = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(OpError::MissingField("type"))?;
        if !KNOWN_TYPES.contains(&type_name) {
            return Err(OpError::UnknownType(type_name.to_string()));
        }
        serde_json::from_value(value).map_err(|e| OpError::Malformed(e.to_string()))
    }

    /// The wire `type` string.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OpKind {
    #[serde(rename = "object.transform", rename_all = "camelCase")]
    ObjectTransform {
        object_id: Option<String>,
        transform: Option<TransformPatch>,
    },
    #[serde(rename = "object.style", rename_all = "camelCase")]
    ObjectStyle {
        object_id: Option<String>,
        style: Option<StylePatch>,
    },
    #[serde(rename = "object.visibility", rename_all = "camelCase")]
    ObjectVisibility {
        object_id: Option<String>,
        visible: Option<bool>,
    },
    #[serde(rename = "object.locked", rename_all = "camelCase")]
    ObjectLocked {
        object_id: Option<String>,
        locked: Option<bool>,
    },
    #[serde(rename = "object.data", rename_all = "camelCase")]
    ObjectData {
        object_id: Option<String>,
        data: Option<Map<String, Value>>,
    },
    #[serde(rename = "object.create", rename_all = "camelCase")]
    ObjectCreate {
        object: Option<Box<ObjectNode>>,
        parent_id: Option<String>,
        index: Option<usize>,
        asset: Option<Asset>,
    },
    #[serde(rename = "object.delete", rename_all = "camelCase")]
    ObjectDelete { object_id: Option<String> },
    #[serde(rename = "object.reparent", rename_all = "camelCase")]
    ObjectReparent {
        object_id: Option<String>,
        new_parent_id: Option<String>,
        new_index: Option<usize>,
    },
    #[serde(rename = "scene.create", rename_all = "camelCase")]
    SceneCreate {
        scene: Option<Scene>,
        root_object: Option<Box<ObjectNode>>,
    },
    #[serde(rename = "scene.update", rename_all = "camelCase")]
    SceneUpdate {
        scene_id: Option<String>,
        changes: Option<ScenePatch>,
    },
    #[serde(rename = "scene.delete", rename_all = "camelCase")]
    SceneDelete { scene_id: Option<String> },
    #[serde(rename = "project.rename", rename_all = "camelCase")]
    ProjectRename { name: Option<String> },
    #[serde(rename = "timeline.update", rename_all = "camelCase")]
    TimelineUpdate {
        timeline_id: Option<String>,
        changes: Option<TimelinePatch>,
    },
    #[serde(rename = "track.create", rename_all = "camelCase")]
    TrackCreate {
        timeline_id: Option<String>,
        track: Option<Track>,
    },
    #[serde(rename = "track.delete", rename_all = "camelCase")]
    TrackDelete {
        timeline_id: Option<String>,
        track_id: Option<String>,
    },
    #[serde(rename = "keyframe.add", rename_all = "camelCase")]
    KeyframeAdd {
        track_id: Option<String>,
        keyframe: Option<Keyframe>,
    },
    #[serde(rename = "keyframe.update", rename_all = "camelCase")]
    KeyframeUpdate {
        keyframe_id: Option<String>,
        changes: Option<KeyframePatch>,
        track_id: Option<String>,
    },
    #[serde(rename = "keyframe.delete", rename_all = "camelCase")]
    KeyframeDelete {
        track_id: Option<String>,
        keyframe_id: Option<String>,
    },
}

impl OpKind {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::ObjectTransform { .. } => "object.transform",
            Self::ObjectStyle { .. } => "object.style",
            Self::ObjectVisibility { .. } => "object.visibility",
            Self::ObjectLocked { .. } => "object.locked",
            Self::ObjectData { .. } => "object.data",
            Self::ObjectCreate { .. } => "object.create",
            Self::ObjectDelete { .. } => "object.delete",
            Self::ObjectReparent { .. } => "object.reparent",
            Self::SceneCreate { .. } => "scene.create",
            Self::SceneUpdate { .. } => "scene.update",
            Self::SceneDelete { .. } => "scene.delete",
            Self::ProjectRename { .. } => "project.rename",
            Self::TimelineUpdate { .. } => "timeline.update",
            Self::TrackCreate { .. } => "track.create",
            Self::TrackDelete { .. } => "track.delete",
            Self::KeyframeAdd { .. } => "keyframe.add",
            Self::KeyframeUpdate { .. } => "keyframe.update",
            Self::KeyframeDelete { .. } => "keyframe.delete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_type_gets_dedicated_error() {
        let err = Operation::from_value(json!({ "id": "op_1", "type": "object.explode" }))
            .unwrap_err();
        assert_eq!(err, OpError::UnknownType("object.explode".into()));
    }

    #[test]
    fn previous_fields_are_ignored() {
        let op = Operation::from_value(json!({
            "id": "op_1",
            "type": "object.transform",
            "objectId": "obj_a",
            "transform": { "x": 4.0 },
            "previous": { "x": 1.0 },
            "clientSeq": 3,
        }))
        .unwrap();
        assert_eq!(op.client_seq, 3);
        match op.kind {
            OpKind::ObjectTransform {
                object_id,
                transform,
            } => {
                assert_eq!(object_id.as_deref(), Some("obj_a"));
                assert_eq!(transform.unwrap().x, Some(4.0));
            }
            _ => panic!("wrong kind"),
        }
    }

    #[test]
    fn roundtrip_keeps_type_tag() {
        let op = Operation::from_value(json!({
            "id": "op_2",
            "type": "keyframe.add",
            "trackId": "track_a",
            "keyframe": { "id": "kf_1", "frame": 3, "value": 1.5, "easing": "easeIn" },
        }))
        .unwrap();
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["type"], "keyframe.add");
        assert_eq!(json["keyframe"]["easing"], "easeIn");
    }
}
