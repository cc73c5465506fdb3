//! Seed and sample documents.
//!
//! [`seed_document`] is the minimal shape every new project starts from:
//! one scene, one empty root group, one empty root timeline. Everything
//! after that arrives as operations.
//!
//! [`sample_document`] is the demo project used by
//! `load_sample_document`: a handful of node kinds with enough animation
//! on the root and a nested symbol timeline to exercise the evaluator.
//! Ids are fixed strings so every client builds the identical document.

use crate::animation::Easing;
use crate::document::asset::{Asset, AssetKind};
use crate::document::document::{Document, Scene};
use crate::document::object::{FontWeight, NodeData, ObjectNode, TextAlign};
use crate::document::path::PathCommand;
use crate::document::timeline::{KeyValue, Keyframe, Timeline, Track};

pub const SEED_SCENE_ID: &str = "scene_main";
pub const SEED_ROOT_OBJECT_ID: &str = "obj_root";
pub const SEED_TIMELINE_ID: &str = "tl_root";
pub const SEED_TIMELINE_LENGTH: u32 = 120;

pub const SAMPLE_SYMBOL_ID: &str = "obj_pin";
pub const SAMPLE_RECT_ID: &str = "obj_pin_arm";
pub const SAMPLE_SYMBOL_TIMELINE_ID: &str = "tl_pin";

/// The minimal document a freshly created project starts from.
#[must_use]
pub fn seed_document(project_id: &str, name: &str) -> Document {
    let mut doc = Document {
        id: project_id.to_string(),
        name: name.to_string(),
        version: 0,
        fps: 24,
        root_timeline_id: SEED_TIMELINE_ID.to_string(),
        scenes: vec![SEED_SCENE_ID.to_string()],
        assets: Vec::new(),
        scenes_by_id: Default::default(),
        objects: Default::default(),
        timelines: Default::default(),
        tracks: Default::default(),
        keyframes: Default::default(),
        assets_by_id: Default::default(),
    };

    doc.scenes_by_id.insert(SEED_SCENE_ID.to_string(), Scene {
        id: SEED_SCENE_ID.to_string(),
        name: "Scene 1".to_string(),
        width: 1920.0,
        height: 1080.0,
        background_color: "#ffffff".to_string(),
        root_object_id: SEED_ROOT_OBJECT_ID.to_string(),
    });
    doc.objects.insert(
        SEED_ROOT_OBJECT_ID.to_string(),
        ObjectNode::new(SEED_ROOT_OBJECT_ID, NodeData::Group {}),
    );
    doc.timelines.insert(SEED_TIMELINE_ID.to_string(), Timeline {
        id: SEED_TIMELINE_ID.to_string(),
        length: SEED_TIMELINE_LENGTH,
        tracks: Vec::new(),
    });

    doc
}

fn put_child(doc: &mut Document, parent_id: &str, node: ObjectNode) {
    let id = node.id.clone();
    let mut node = node;
    node.parent_id = Some(parent_id.to_string());
    doc.objects.insert(id.clone(), node);
    doc.objects
        .get_mut(parent_id)
        .expect("sample parent exists")
        .children
        .push(id);
}

fn put_track(
    doc: &mut Document,
    timeline_id: &str,
    track_id: &str,
    object_id: &str,
    property: &str,
    keys: Vec<(&str, u32, KeyValue, Easing)>,
) {
    let mut key_ids = Vec::with_capacity(keys.len());
    for (kf_id, frame, value, easing) in keys {
        doc.keyframes.insert(kf_id.to_string(), Keyframe {
            id: kf_id.to_string(),
            frame,
            value,
            easing,
        });
        key_ids.push(kf_id.to_string());
    }
    doc.tracks.insert(track_id.to_string(), Track {
        id: track_id.to_string(),
        object_id: object_id.to_string(),
        property: property.to_string(),
        keys: key_ids,
    });
    doc.timelines
        .get_mut(timeline_id)
        .expect("sample timeline exists")
        .tracks
        .push(track_id.to_string());
}

/// The demo project: a dark stage with an easing-driven orb, a rotating
/// nested symbol, a lightning path and a title card.
#[must_use]
pub fn sample_document(project_id: &str) -> Document {
    let mut doc = seed_document(project_id, "Sample Project");
    doc.scenes_by_id.get_mut(SEED_SCENE_ID).unwrap().width = 960.0;
    doc.scenes_by_id.get_mut(SEED_SCENE_ID).unwrap().height = 540.0;
    doc.scenes_by_id
        .get_mut(SEED_SCENE_ID)
        .unwrap()
        .background_color = "#1e1e2e".to_string();

    // Stage backdrop
    let mut backdrop = ObjectNode::new("obj_backdrop", NodeData::ShapeRect {
        width: 960.0,
        height: 540.0,
    });
    backdrop.style.fill = "#14141f".to_string();
    backdrop.style.stroke_width = 0.0;
    put_child(&mut doc, SEED_ROOT_OBJECT_ID, backdrop);

    // Orb: slides across the stage while pulsing opacity
    let mut orb = ObjectNode::new("obj_orb", NodeData::ShapeEllipse {
        rx: 60.0,
        ry: 60.0,
    });
    orb.transform.x = 160.0;
    orb.transform.y = 270.0;
    orb.style.fill = "#f5a97f".to_string();
    orb.style.stroke_width = 0.0;
    put_child(&mut doc, SEED_ROOT_OBJECT_ID, orb);

    // Lightning bolt: a raw vector path with a color swap mid-way
    let mut bolt = ObjectNode::new("obj_bolt", NodeData::VectorPath {
        commands: vec![
            PathCommand::move_to(0.0, 0.0),
            PathCommand::line_to(26.0, 0.0),
            PathCommand::line_to(10.0, 34.0),
            PathCommand::line_to(30.0, 34.0),
            PathCommand::line_to(-6.0, 80.0),
            PathCommand::line_to(6.0, 44.0),
            PathCommand::line_to(-10.0, 44.0),
            PathCommand::close(),
        ],
    });
    bolt.transform.x = 720.0;
    bolt.transform.y = 120.0;
    bolt.style.fill = "#eed49f".to_string();
    bolt.style.stroke_width = 0.0;
    put_child(&mut doc, SEED_ROOT_OBJECT_ID, bolt);

    // Title card
    let mut title = ObjectNode::new("obj_title", NodeData::Text {
        content: "Sample Project".to_string(),
        font_size: 32.0,
        font_family: "Inter".to_string(),
        font_weight: FontWeight::Normal,
        text_align: TextAlign::Center,
    });
    title.transform.x = 480.0;
    title.transform.y = 60.0;
    title.style.fill = "#cad3f5".to_string();
    put_child(&mut doc, SEED_ROOT_OBJECT_ID, title);

    // Pin: a symbol spinning on its own nested timeline
    let mut symbol = ObjectNode::new(SAMPLE_SYMBOL_ID, NodeData::Symbol {
        timeline_id: Some(SAMPLE_SYMBOL_TIMELINE_ID.to_string()),
        looping: Some(true),
    });
    symbol.transform.x = 500.0;
    symbol.transform.y = 450.0;
    put_child(&mut doc, SEED_ROOT_OBJECT_ID, symbol);

    let mut arm = ObjectNode::new(SAMPLE_RECT_ID, NodeData::ShapeRect {
        width: 60.0,
        height: 100.0,
    });
    arm.transform.x = -30.0;
    arm.transform.y = -50.0;
    arm.style.fill = "#8aadf4".to_string();
    arm.style.stroke_width = 0.0;
    put_child(&mut doc, SAMPLE_SYMBOL_ID, arm);

    doc.timelines
        .insert(SAMPLE_SYMBOL_TIMELINE_ID.to_string(), Timeline {
            id: SAMPLE_SYMBOL_TIMELINE_ID.to_string(),
            length: 24,
            tracks: Vec::new(),
        });

    // Root timeline animation
    put_track(
        &mut doc,
        SEED_TIMELINE_ID,
        "track_orb_x",
        "obj_orb",
        "transform.x",
        vec![
            ("kf_orb_x0", 0, KeyValue::Number(160.0), Easing::EaseInOut),
            ("kf_orb_x1", 119, KeyValue::Number(760.0), Easing::Linear),
        ],
    );
    put_track(
        &mut doc,
        SEED_TIMELINE_ID,
        "track_orb_opacity",
        "obj_orb",
        "style.opacity",
        vec![
            ("kf_orb_o0", 0, KeyValue::Number(1.0), Easing::CubicOut),
            ("kf_orb_o1", 60, KeyValue::Number(0.25), Easing::CubicIn),
            ("kf_orb_o2", 119, KeyValue::Number(1.0), Easing::Linear),
        ],
    );
    put_track(
        &mut doc,
        SEED_TIMELINE_ID,
        "track_bolt_fill",
        "obj_bolt",
        "style.fill",
        vec![
            (
                "kf_bolt_f0",
                0,
                KeyValue::Text("#eed49f".to_string()),
                Easing::Linear,
            ),
            (
                "kf_bolt_f1",
                60,
                KeyValue::Text("#ed8796".to_string()),
                Easing::Linear,
            ),
        ],
    );

    // Symbol timeline: one full turn across its 24 frames
    put_track(
        &mut doc,
        SAMPLE_SYMBOL_TIMELINE_ID,
        "track_pin_rot",
        SAMPLE_SYMBOL_ID,
        "transform.r",
        vec![
            ("kf_pin_r0", 0, KeyValue::Number(0.0), Easing::Linear),
            ("kf_pin_r1", 23, KeyValue::Number(360.0), Easing::Linear),
        ],
    );

    doc
}

/// Demo asset attached by some integration tests; not part of the default
/// sample scene graph.
#[must_use]
pub fn sample_asset(id: &str, name: &str) -> Asset {
    Asset {
        id: id.to_string(),
        kind: AssetKind::Png,
        name: name.to_string(),
        url: format!("/assets/{id}.png"),
        meta: serde_json::Value::Null,
    }
}
