//! Timeline Evaluation
//!
//! Deterministic per-frame sampling of keyframe tracks:
//!
//! - [`Easing`] - The fixed easing catalogue applied between keyframes
//! - [`Overrides`] - Per-object property values produced for one frame
//! - [`evaluate_timeline`] - Samples every track of a timeline at an
//!   integer frame
//!
//! Evaluation is a pure function of `(document, timeline, frame)`: no
//! randomness, no wall-clock input. The collaboration model depends on
//! every client computing bit-identical overrides from the same document.

pub mod easing;
pub mod evaluator;
pub mod overrides;

pub use easing::Easing;
pub use evaluator::{evaluate_timeline, evaluate_timeline_into};
pub use overrides::Overrides;
