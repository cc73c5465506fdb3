//! Timelines, tracks and keyframes.
//!
//! A timeline owns an ordered list of tracks; a track binds one property of
//! one object to an ordered list of keyframes. Track keys stay sorted
//! ascending by keyframe frame at all times; duplicate frames are allowed
//! and the later key wins.

use serde::{Deserialize, Serialize};

use crate::animation::Easing;

/// A keyframe value: a number for numeric properties, a string for color
/// properties. Numeric strings still interpolate numerically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyValue {
    Number(f64),
    Text(String),
}

impl KeyValue {
    /// The value as a finite number, if it is one (or parses as one).
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n).filter(|n| n.is_finite()),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    /// The value rendered as a string override.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// A value stamped at a frame, with the easing governing the transition
/// from this keyframe to the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyframe {
    pub id: String,
    pub frame: u32,
    pub value: KeyValue,
    #[serde(default)]
    pub easing: Easing,
}

/// Partial keyframe for the `keyframe.update` operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyframePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<KeyValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub easing: Option<Easing>,
}

/// One animated property of one object: a dotted path such as
/// `transform.x`, `transform.r` or `style.opacity`, plus the ordered
/// keyframe ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub object_id: String,
    pub property: String,
    #[serde(default)]
    pub keys: Vec<String>,
}

/// An ordered list of tracks with a declared length in frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub id: String,
    pub length: u32,
    #[serde(default)]
    pub tracks: Vec<String>,
}

/// Partial timeline for the `timeline.update` operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelinePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_number_parsing() {
        assert_eq!(KeyValue::Number(4.5).as_number(), Some(4.5));
        assert_eq!(KeyValue::Text("12.5".into()).as_number(), Some(12.5));
        assert_eq!(KeyValue::Text("#ff0000".into()).as_number(), None);
        assert_eq!(KeyValue::Number(f64::NAN).as_number(), None);
    }

    #[test]
    fn key_value_untagged_roundtrip() {
        let n: KeyValue = serde_json::from_str("3.5").unwrap();
        assert_eq!(n, KeyValue::Number(3.5));
        let s: KeyValue = serde_json::from_str("\"#fff\"").unwrap();
        assert_eq!(s, KeyValue::Text("#fff".into()));
    }
}
