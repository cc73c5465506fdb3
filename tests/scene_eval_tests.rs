//! End-To-End Evaluation Tests
//!
//! The literal scenarios from the engine contract, driven through the
//! public surface:
//! - Linear keyframe midpoint and hold-clamping past the last key
//! - Bounce easing endpoint exactness
//! - Nested symbol rotation: world matrix and child AABB at frame 12
//! - Hit testing through an invisible ancestor
//! - Opacity monotonicity across the whole sample timeline

use rustc_hash::FxHashMap;

use cel::animation::easing::ALL_EASINGS;
use cel::document::samples::{
    SAMPLE_RECT_ID, SAMPLE_SYMBOL_ID, SEED_SCENE_ID, SEED_TIMELINE_ID, sample_document,
    seed_document,
};
use cel::document::{KeyValue, Keyframe, Timeline, Track};
use cel::{Easing, Mat2D, Rect, build_scene, evaluate_timeline, hit_test};

const EPSILON: f64 = 1e-9;

fn no_drag() -> FxHashMap<String, cel::document::TransformPatch> {
    FxHashMap::default()
}

// ============================================================================
// Timeline evaluation scenarios
// ============================================================================

fn two_key_doc(v0: f64, f0: u32, v1: f64, f1: u32) -> cel::Document {
    let mut doc = seed_document("proj_s", "s");
    for (i, (frame, value)) in [(f0, v0), (f1, v1)].into_iter().enumerate() {
        doc.keyframes.insert(format!("kf_{i}"), Keyframe {
            id: format!("kf_{i}"),
            frame,
            value: KeyValue::Number(value),
            easing: Easing::Linear,
        });
    }
    doc.tracks.insert("track_s".into(), Track {
        id: "track_s".into(),
        object_id: "obj_root".into(),
        property: "transform.x".into(),
        keys: vec!["kf_0".into(), "kf_1".into()],
    });
    doc.timelines.insert(SEED_TIMELINE_ID.into(), Timeline {
        id: SEED_TIMELINE_ID.into(),
        length: 120,
        tracks: vec!["track_s".into()],
    });
    doc
}

#[test]
fn linear_keyframe_midpoint_is_half() {
    let doc = two_key_doc(0.0, 0, 100.0, 10);
    let overrides = evaluate_timeline(&doc, SEED_TIMELINE_ID, 5);
    assert_eq!(
        overrides.numeric["obj_root"]["transform.x"], 50.0,
        "midpoint of 0..100 at frame 5 of 10"
    );
}

#[test]
fn clamp_past_last_keyframe() {
    let doc = two_key_doc(0.0, 0, 100.0, 10);
    let overrides = evaluate_timeline(&doc, SEED_TIMELINE_ID, 100);
    assert_eq!(overrides.numeric["obj_root"]["transform.x"], 100.0);
}

#[test]
fn bounce_out_endpoints_exact() {
    assert_eq!(Easing::BounceOut.eval(0.0), 0.0);
    assert_eq!(Easing::BounceOut.eval(1.0), 1.0);
}

#[test]
fn every_easing_stays_finite_on_unit_interval() {
    for easing in ALL_EASINGS {
        for i in 0..=100 {
            let t = f64::from(i) / 100.0;
            assert!(easing.eval(t).is_finite(), "{easing} at t={t}");
        }
    }
}

// ============================================================================
// Nested symbol scenario
// ============================================================================

#[test]
fn nested_symbol_rotation_world_matrix_and_bounds() {
    let doc = sample_document("proj_demo");
    let graph = build_scene(&doc, SEED_SCENE_ID, 12, true, &no_drag()).unwrap();

    // 0° → 360° across frames 0→23, so frame 12 sits at 12·360/23 ≈ 187.826°.
    let angle_deg: f64 = 12.0 * 360.0 / 23.0;
    let expected_world =
        Mat2D::translation(500.0, 450.0).multiply(&Mat2D::rotation(angle_deg.to_radians()));

    let symbol = graph.get(SAMPLE_SYMBOL_ID).unwrap();
    assert!(
        symbol.world.approx_eq(&expected_world, EPSILON),
        "symbol world matrix rotates about its pivot"
    );

    let child = graph.get(SAMPLE_RECT_ID).unwrap();
    let expected_bounds = expected_world.apply_rect(&Rect::new(-30.0, -50.0, 60.0, 100.0));
    let bounds = child.bounds.unwrap();
    for (got, want) in [
        (bounds.x, expected_bounds.x),
        (bounds.y, expected_bounds.y),
        (bounds.width, expected_bounds.width),
        (bounds.height, expected_bounds.height),
    ] {
        assert!((got - want).abs() < EPSILON, "got {got}, want {want}");
    }
}

// ============================================================================
// Visibility and hit testing
// ============================================================================

#[test]
fn hit_test_through_invisible_ancestor_misses() {
    let mut doc = sample_document("proj_demo");
    // The arm itself stays visible; its parent group goes invisible.
    doc.objects.get_mut(SAMPLE_SYMBOL_ID).unwrap().visible = false;
    let graph = build_scene(&doc, SEED_SCENE_ID, 0, false, &no_drag()).unwrap();

    let hit = hit_test(&graph, 500.0, 450.0);
    assert_ne!(hit.as_deref(), Some(SAMPLE_RECT_ID));
    assert_eq!(hit.as_deref(), Some("obj_backdrop"));
}

// ============================================================================
// Opacity monotonicity
// ============================================================================

#[test]
fn opacity_never_exceeds_ancestor_product() {
    let mut doc = sample_document("proj_demo");
    doc.objects
        .get_mut(SAMPLE_SYMBOL_ID)
        .unwrap()
        .style
        .opacity = 0.6;

    for frame in (0..120).step_by(7) {
        let graph = build_scene(&doc, SEED_SCENE_ID, frame, true, &no_drag()).unwrap();
        for node in &graph.nodes {
            assert!(
                node.opacity <= 1.0 + EPSILON,
                "frame {frame}: node {} opacity {}",
                node.id,
                node.opacity
            );
        }
        let symbol = graph.get(SAMPLE_SYMBOL_ID).unwrap();
        let child = graph.get(SAMPLE_RECT_ID).unwrap();
        assert!(child.opacity <= symbol.opacity + EPSILON);
    }
}
