//! 2D Math Kernel
//!
//! The matrix kernel underpinning every evaluated scene:
//!
//! - [`Mat2D`] - A 2D affine transform stored as six floats `[a,b,c,d,e,f]`
//! - [`Rect`] - A world-space axis-aligned bounding box
//!
//! All arithmetic is plain `f64`; both deployment targets (wasm authoring
//! runtime and the headless server runtime) must produce bit-identical
//! results, so nothing in this module may depend on platform SIMD paths.

pub mod matrix;
pub mod rect;

pub use matrix::Mat2D;
pub use rect::Rect;
