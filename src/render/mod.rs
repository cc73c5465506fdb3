//! Command Compilation & Queries
//!
//! The last engine stage: flattening an evaluated [`SceneGraph`] into a
//! painter-ordered draw-command list, plus the two read queries the
//! authoring UI needs (`hit_test`, `selection_bounds`).
//!
//! A consuming renderer must treat each command's `transform` as the
//! absolute world matrix (set, not accumulate), multiply `opacity` into its
//! global alpha, push/pop state on `save`/`restore`, intersect its clip
//! region on `clip`, and paint strictly in list order. It never reads the
//! document.
//!
//! [`SceneGraph`]: crate::scene::SceneGraph

pub mod command;
pub mod compiler;
pub mod queries;

pub use command::DrawCommand;
pub use compiler::compile_commands;
pub use queries::{hit_test, selection_bounds};
