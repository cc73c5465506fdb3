#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod bindings;
pub mod collab;
pub mod document;
pub mod engine;
pub mod errors;
pub mod math;
pub mod render;
pub mod scene;

pub use animation::{Easing, Overrides, evaluate_timeline};
pub use document::{
    Asset, Document, Keyframe, NodeData, ObjectNode, Scene, Style, Timeline, Track, Transform,
};
pub use engine::{Engine, PlaybackState};
pub use errors::{CelError, OpError, Result};
pub use math::{Mat2D, Rect};
pub use render::{DrawCommand, compile_commands, hit_test, selection_bounds};
pub use scene::{SceneGraph, SceneNode, build_scene};
