//! Scene Building
//!
//! Walks a scene's object tree at one evaluated frame and produces a
//! retained scene graph: world matrices, inherited opacity, resolved
//! styles, synthesized geometry and world-space bounds, plus an id lookup.
//!
//! # Architecture
//!
//! - [`geometry`] - Per-kind geometry synthesis (rect paths, bezier
//!   ellipses, verbatim vector paths, image references)
//! - [`SceneNode`] / [`SceneGraph`] - The retained output consumed by the
//!   command compiler and the query surface
//! - [`build_scene`] - The traversal: visibility gate, symbol timeline
//!   merge, override application, matrix composition, opacity inheritance,
//!   bounds accumulation
//!
//! The builder is pure with respect to the document: it never mutates it,
//! and two builds of the same `(document, scene, frame, playing)` input
//! produce identical graphs.

pub mod builder;
pub mod geometry;
pub mod node;

pub use builder::build_scene;
pub use geometry::{ELLIPSE_KAPPA, Geometry, ellipse_path, rect_path, synthesize_geometry};
pub use node::{ClipRef, SceneGraph, SceneNode};
