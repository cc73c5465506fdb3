//! Uploaded binary references. Assets are immutable after creation; the
//! document only ever stores the reference, never the bytes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Png,
    Jpg,
    Svg,
    Audio,
    Video,
}

/// Reference to an uploaded asset blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub kind: AssetKind,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub meta: Value,
}
