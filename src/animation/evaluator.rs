//! Track sampling at an integer frame.
//!
//! For every track of a timeline: bracket the query frame between the last
//! keyframe at-or-before it (`prev`) and the first at-or-after it (`next`),
//! hold values outside the keyed range, short-circuit exact hits, and
//! otherwise interpolate numerically using the easing attached to `prev`.
//! When either side of the pair is a non-numeric string the track steps;
//! color values never blend.

use crate::animation::overrides::Overrides;
use crate::document::{Document, Keyframe, Track};

/// Samples every track of `timeline_id` at `frame` into a fresh override
/// set. Missing timelines evaluate to nothing.
#[must_use]
pub fn evaluate_timeline(document: &Document, timeline_id: &str, frame: u32) -> Overrides {
    let mut overrides = Overrides::new();
    evaluate_timeline_into(document, timeline_id, frame, &mut overrides);
    overrides
}

/// Samples into an existing override set. Used by the scene builder to
/// merge a Symbol's timeline into the live override map; inserting the
/// same `(object, property)` twice yields the same value, so a repeated
/// visit is idempotent.
pub fn evaluate_timeline_into(
    document: &Document,
    timeline_id: &str,
    frame: u32,
    out: &mut Overrides,
) {
    let Some(timeline) = document.timelines.get(timeline_id) else {
        return;
    };
    for track_id in &timeline.tracks {
        let Some(track) = document.tracks.get(track_id) else {
            continue;
        };
        // Gather in key order, then stable-sort by frame: duplicate frames
        // keep their track order, so the later key wins the <= bracket.
        let mut keys: Vec<&Keyframe> = track
            .keys
            .iter()
            .filter_map(|id| document.keyframes.get(id))
            .collect();
        if keys.is_empty() {
            continue;
        }
        keys.sort_by_key(|k| k.frame);
        sample_track(track, &keys, frame, out);
    }
}

fn sample_track(track: &Track, keys: &[&Keyframe], frame: u32, out: &mut Overrides) {
    let first_after = keys.partition_point(|k| k.frame <= frame);
    let prev = first_after.checked_sub(1).map(|i| keys[i]);
    let next_idx = keys.partition_point(|k| k.frame < frame);
    let next = keys.get(next_idx).copied();

    let (prev, next) = match (prev, next) {
        (Some(p), Some(n)) => (p, n),
        // Only one side exists: the series holds its boundary value.
        (Some(p), None) => {
            emit_verbatim(track, p, out);
            return;
        }
        (None, Some(n)) => {
            emit_verbatim(track, n, out);
            return;
        }
        (None, None) => return,
    };

    if std::ptr::eq(prev, next) || prev.frame == next.frame {
        emit_verbatim(track, prev, out);
        return;
    }

    match (prev.value.as_number(), next.value.as_number()) {
        (Some(a), Some(b)) => {
            let t = f64::from(frame - prev.frame) / f64::from(next.frame - prev.frame);
            let eased = prev.easing.eval(t);
            out.set_numeric(&track.object_id, &track.property, a + (b - a) * eased);
        }
        // String on either side: hold prev until the next keyframe.
        _ => emit_verbatim(track, prev, out),
    }
}

fn emit_verbatim(track: &Track, key: &Keyframe, out: &mut Overrides) {
    match key.value.as_number() {
        Some(n) => out.set_numeric(&track.object_id, &track.property, n),
        None => out.set_text(&track.object_id, &track.property, key.value.as_text()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Easing;
    use crate::document::samples::{SEED_TIMELINE_ID, seed_document};
    use crate::document::{KeyValue, Timeline};

    fn doc_with_track(keys: Vec<(u32, KeyValue, Easing)>) -> Document {
        let mut doc = seed_document("proj_t", "t");
        let mut key_ids = Vec::new();
        for (i, (frame, value, easing)) in keys.into_iter().enumerate() {
            let id = format!("kf_{i}");
            doc.keyframes.insert(id.clone(), Keyframe {
                id: id.clone(),
                frame,
                value,
                easing,
            });
            key_ids.push(id);
        }
        doc.tracks.insert("track_t".into(), Track {
            id: "track_t".into(),
            object_id: "obj_root".into(),
            property: "transform.x".into(),
            keys: key_ids,
        });
        doc.timelines.insert(SEED_TIMELINE_ID.into(), Timeline {
            id: SEED_TIMELINE_ID.into(),
            length: 200,
            tracks: vec!["track_t".into()],
        });
        doc
    }

    fn x_at(doc: &Document, frame: u32) -> Option<f64> {
        evaluate_timeline(doc, SEED_TIMELINE_ID, frame)
            .numeric
            .get("obj_root")
            .and_then(|m| m.get("transform.x"))
            .copied()
    }

    #[test]
    fn linear_midpoint() {
        let doc = doc_with_track(vec![
            (0, KeyValue::Number(0.0), Easing::Linear),
            (10, KeyValue::Number(100.0), Easing::Linear),
        ]);
        assert_eq!(x_at(&doc, 5), Some(50.0));
    }

    #[test]
    fn clamps_outside_range() {
        let doc = doc_with_track(vec![
            (5, KeyValue::Number(10.0), Easing::Linear),
            (10, KeyValue::Number(100.0), Easing::Linear),
        ]);
        assert_eq!(x_at(&doc, 0), Some(10.0));
        assert_eq!(x_at(&doc, 100), Some(100.0));
    }

    #[test]
    fn exact_hit_is_verbatim() {
        let doc = doc_with_track(vec![
            (0, KeyValue::Number(0.0), Easing::BounceOut),
            (10, KeyValue::Number(100.0), Easing::BounceOut),
        ]);
        assert_eq!(x_at(&doc, 10), Some(100.0));
    }

    #[test]
    fn duplicate_frame_later_key_wins() {
        let doc = doc_with_track(vec![
            (0, KeyValue::Number(0.0), Easing::Linear),
            (5, KeyValue::Number(1.0), Easing::Linear),
            (5, KeyValue::Number(2.0), Easing::Linear),
            (10, KeyValue::Number(10.0), Easing::Linear),
        ]);
        assert_eq!(x_at(&doc, 5), Some(2.0));
    }

    #[test]
    fn eased_segment_uses_prev_easing() {
        let doc = doc_with_track(vec![
            (0, KeyValue::Number(0.0), Easing::EaseIn),
            (10, KeyValue::Number(100.0), Easing::Linear),
        ]);
        // easeIn(0.5) = 0.25
        assert_eq!(x_at(&doc, 5), Some(25.0));
    }

    #[test]
    fn string_tracks_step() {
        let mut doc = doc_with_track(vec![
            (0, KeyValue::Text("#111111".into()), Easing::Linear),
            (10, KeyValue::Text("#999999".into()), Easing::Linear),
        ]);
        doc.tracks.get_mut("track_t").unwrap().property = "style.fill".into();
        let overrides = evaluate_timeline(&doc, SEED_TIMELINE_ID, 5);
        assert_eq!(
            overrides.text["obj_root"]["style.fill"],
            "#111111".to_string()
        );
    }

    #[test]
    fn single_key_holds_everywhere() {
        let doc = doc_with_track(vec![(7, KeyValue::Number(3.5), Easing::ElasticOut)]);
        assert_eq!(x_at(&doc, 0), Some(3.5));
        assert_eq!(x_at(&doc, 7), Some(3.5));
        assert_eq!(x_at(&doc, 1000), Some(3.5));
    }
}
