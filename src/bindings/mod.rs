//! Host-runtime bindings.
//!
//! The browser deployment exports the engine through wasm-bindgen as a
//! string-in/string-out JSON surface; the native build exposes nothing
//! here, since the server links [`crate::engine::Engine`] directly.

#[cfg(target_arch = "wasm32")]
pub mod wasm;
