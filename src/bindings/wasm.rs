//! wasm-bindgen export of the engine API.
//!
//! Every command returns `{"ok":true}` or `{"error":"…"}`; queries return
//! their payload JSON directly. The wrapper owns the engine instance;
//! the host page never touches engine state except through these calls.

use wasm_bindgen::prelude::*;

use crate::engine::Engine;
use crate::errors::CelError;

fn ok() -> String {
    "{\"ok\":true}".to_string()
}

fn err_json(error: &CelError) -> String {
    serde_json::json!({ "error": error.to_string() }).to_string()
}

fn status(result: Result<(), CelError>) -> String {
    match result {
        Ok(()) => ok(),
        Err(error) => err_json(&error),
    }
}

#[wasm_bindgen]
pub struct CelEngine {
    inner: Engine,
}

#[wasm_bindgen]
impl CelEngine {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Engine::new(),
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    pub fn load_document(&mut self, json: &str) -> String {
        status(self.inner.load_document(json))
    }

    pub fn update_document(&mut self, json: &str) -> String {
        status(self.inner.update_document(json))
    }

    pub fn load_sample_document(&mut self, project_id: &str) -> String {
        self.inner.load_sample_document(project_id);
        ok()
    }

    pub fn set_playhead(&mut self, frame: u32) {
        self.inner.set_playhead(frame);
    }

    pub fn play(&mut self) {
        self.inner.play();
    }

    pub fn pause(&mut self) {
        self.inner.pause();
    }

    pub fn toggle_play(&mut self) {
        self.inner.toggle_play();
    }

    pub fn set_scene(&mut self, scene_id: &str) -> String {
        status(self.inner.set_scene(scene_id))
    }

    pub fn set_selection(&mut self, ids_json: &str) -> String {
        match serde_json::from_str::<Vec<String>>(ids_json) {
            Ok(ids) => {
                self.inner.set_selection(ids);
                ok()
            }
            Err(error) => err_json(&error.into()),
        }
    }

    pub fn set_drag_overlay(&mut self, json: &str) -> String {
        status(self.inner.set_drag_overlay(json))
    }

    pub fn update_drag_overlay(&mut self, json: &str) -> String {
        status(self.inner.update_drag_overlay(json))
    }

    pub fn clear_drag_overlay(&mut self) {
        self.inner.clear_drag_overlay();
    }

    /// Advances one frame if playing, then renders.
    pub fn tick(&mut self) -> String {
        self.inner.tick().unwrap_or_else(|e| err_json(&e))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn render(&self) -> String {
        self.inner.render().unwrap_or_else(|e| err_json(&e))
    }

    pub fn hit_test(&self, x: f64, y: f64) -> String {
        match self.inner.hit_test(x, y) {
            Ok(hit) => hit.unwrap_or_default(),
            Err(_) => String::new(),
        }
    }

    pub fn selection_bounds(&self) -> String {
        match self
            .inner
            .selection_bounds()
            .and_then(|b| Ok(serde_json::to_string(&b)?))
        {
            Ok(json) => json,
            Err(error) => err_json(&error),
        }
    }

    pub fn get_scene(&self) -> String {
        self.inner.scene_json().unwrap_or_else(|e| err_json(&e))
    }

    pub fn get_playback_state(&self) -> String {
        serde_json::to_string(&self.inner.playback_state())
            .unwrap_or_else(|e| err_json(&e.into()))
    }

    pub fn get_document(&self) -> String {
        self.inner.document_json().unwrap_or_else(|e| err_json(&e))
    }

    pub fn get_selection(&self) -> String {
        serde_json::to_string(self.inner.selection()).unwrap_or_else(|e| err_json(&e.into()))
    }

    #[must_use]
    pub fn get_frame(&self) -> u32 {
        self.inner.frame()
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.inner.is_playing()
    }

    #[must_use]
    pub fn get_fps(&self) -> u32 {
        self.inner.fps()
    }

    #[must_use]
    pub fn get_total_frames(&self) -> u32 {
        self.inner.total_frames()
    }
}

impl Default for CelEngine {
    fn default() -> Self {
        Self::new()
    }
}
