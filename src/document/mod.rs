//! Document Model
//!
//! The document is the single aggregate every other subsystem consumes: a
//! project header plus six id-keyed tables (scenes, objects, timelines,
//! tracks, keyframes, assets). It is created once from a minimal seed and
//! from then on mutated only by operations applied inside a collaboration
//! room.
//!
//! # Architecture
//!
//! - [`Document`] - The aggregate: project header + tables, validation,
//!   JSON round trip
//! - [`ObjectNode`] - A drawable tree node with a tagged per-kind payload
//! - [`Transform`] / [`Style`] - Embedded value components with partial
//!   patch types used by both mutation operations and drag overlays
//! - [`Timeline`] / [`Track`] / [`Keyframe`] - Animation data
//! - [`Asset`] - An immutable reference to an uploaded binary
//! - [`PathCommand`] - One vector path instruction, serialized as
//!   `[opcode, coords…]`
//!
//! All wire-visible structs rename to camelCase; the JSON shape of the
//! aggregate is the same shape the snapshot store persists and the
//! collaboration protocol ships in `doc.sync`.

pub mod asset;
pub mod document;
pub mod ids;
pub mod object;
pub mod path;
pub mod samples;
pub mod timeline;

pub use asset::{Asset, AssetKind};
pub use document::{Document, Scene, ScenePatch};
pub use ids::new_id;
pub use object::{
    FontWeight, NodeData, ObjectNode, Style, StylePatch, TextAlign, Transform, TransformPatch,
};
pub use path::{PathCommand, PathOp};
pub use timeline::{KeyValue, Keyframe, KeyframePatch, Timeline, TimelinePatch, Track};
