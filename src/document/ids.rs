//! Opaque string ids: a short typed prefix plus a random suffix, e.g.
//! `obj_1f87c2…`. The prefix is purely diagnostic; nothing parses it back.

use uuid::Uuid;

/// Generates a fresh id with the given type prefix.
#[must_use]
pub fn new_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

#[must_use]
pub fn object_id() -> String {
    new_id("obj")
}

#[must_use]
pub fn scene_id() -> String {
    new_id("scene")
}

#[must_use]
pub fn timeline_id() -> String {
    new_id("tl")
}

#[must_use]
pub fn track_id() -> String {
    new_id("track")
}

#[must_use]
pub fn keyframe_id() -> String {
    new_id("kf")
}

#[must_use]
pub fn asset_id() -> String {
    new_id("asset")
}

#[must_use]
pub fn project_id() -> String {
    new_id("proj")
}
