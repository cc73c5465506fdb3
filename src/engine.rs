//! Engine Core Module
//!
//! [`Engine`] is the deterministic evaluation runtime: it owns one
//! document plus playback state and answers render, hit-test and bounds
//! queries against the evaluated scene. It is a pure engine instance with
//! no window or socket management, so the same type backs both deployment
//! targets: the wasm authoring runtime in the browser and transient
//! headless instances inside the collaboration server.
//!
//! # Concurrency
//!
//! Single-threaded cooperative: all calls are synchronous, hold no locks
//! and must not be issued concurrently against the same instance.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut engine = Engine::new();
//! engine.load_sample_document("proj_demo");
//! engine.play();
//! let frame_json = engine.tick()?; // advance one frame, render
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::document::{Document, TransformPatch, samples};
use crate::errors::{CelError, Result};
use crate::math::Rect;
use crate::render::{DrawCommand, compile_commands, hit_test, selection_bounds};
use crate::scene::{SceneGraph, build_scene};

/// Playback status snapshot returned by [`Engine::playback_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub frame: u32,
    pub playing: bool,
    pub fps: u32,
    pub total_frames: u32,
}

/// Payload of `set_drag_overlay` / `update_drag_overlay`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DragOverlayPayload {
    object_id: String,
    #[serde(default)]
    transform: TransformPatch,
}

/// The authoring/headless evaluation runtime.
pub struct Engine {
    document: Option<Document>,
    scene_id: Option<String>,
    frame: u32,
    playing: bool,
    selection: Vec<String>,
    drag_overlays: FxHashMap<String, TransformPatch>,
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            document: None,
            scene_id: None,
            frame: 0,
            playing: false,
            selection: Vec::new(),
            drag_overlays: FxHashMap::default(),
        }
    }

    // ========================================================================
    // Document lifecycle
    // ========================================================================

    /// Loads a document snapshot, resetting playback, selection and any
    /// drag overlay.
    pub fn load_document(&mut self, json: &str) -> Result<()> {
        let document = Document::from_json(json)?;
        self.install_document(document);
        Ok(())
    }

    /// Replaces the document while preserving playback state, used when
    /// remote operations arrive as full-document snapshots. The playhead
    /// is re-clamped and stale scene/selection references are dropped.
    pub fn update_document(&mut self, json: &str) -> Result<()> {
        let document = Document::from_json(json)?;

        self.scene_id = self
            .scene_id
            .take()
            .filter(|id| document.scene(id).is_some())
            .or_else(|| document.first_scene_id().map(str::to_string));
        self.selection
            .retain(|id| document.objects.contains_key(id));
        self.frame = self.frame.min(document.total_frames().saturating_sub(1));
        self.document = Some(document);
        Ok(())
    }

    /// Installs the built-in demo project.
    pub fn load_sample_document(&mut self, project_id: &str) {
        self.install_document(samples::sample_document(project_id));
    }

    fn install_document(&mut self, document: Document) {
        log::info!("engine: loading document {}", document.id);
        self.scene_id = document.first_scene_id().map(str::to_string);
        self.frame = 0;
        self.playing = false;
        self.selection.clear();
        self.drag_overlays.clear();
        self.document = Some(document);
    }

    fn document(&self) -> Result<&Document> {
        self.document.as_ref().ok_or(CelError::NoDocument)
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Moves the playhead, clamping into the root timeline's range.
    pub fn set_playhead(&mut self, frame: u32) {
        let total = self.total_frames();
        self.frame = frame.min(total.saturating_sub(1));
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle_play(&mut self) {
        self.playing = !self.playing;
    }

    /// Advances one frame when playing (wrapping at the root timeline
    /// length), then renders.
    pub fn tick(&mut self) -> Result<String> {
        if self.playing {
            let total = self.total_frames().max(1);
            self.frame = (self.frame + 1) % total;
        }
        self.render()
    }

    #[must_use]
    pub fn frame(&self) -> u32 {
        self.frame
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[must_use]
    pub fn fps(&self) -> u32 {
        self.document.as_ref().map_or(0, |d| d.fps)
    }

    #[must_use]
    pub fn total_frames(&self) -> u32 {
        self.document.as_ref().map_or(1, Document::total_frames)
    }

    #[must_use]
    pub fn playback_state(&self) -> PlaybackState {
        PlaybackState {
            frame: self.frame,
            playing: self.playing,
            fps: self.fps(),
            total_frames: self.total_frames(),
        }
    }

    // ========================================================================
    // Scene & selection
    // ========================================================================

    pub fn set_scene(&mut self, scene_id: &str) -> Result<()> {
        let document = self.document()?;
        if document.scene(scene_id).is_none() {
            return Err(CelError::SceneNotFound(scene_id.to_string()));
        }
        self.scene_id = Some(scene_id.to_string());
        Ok(())
    }

    #[must_use]
    pub fn scene_id(&self) -> Option<&str> {
        self.scene_id.as_deref()
    }

    pub fn set_selection(&mut self, ids: Vec<String>) {
        self.selection = ids;
    }

    #[must_use]
    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    // ========================================================================
    // Drag overlay
    // ========================================================================

    /// Starts a transient transform override for one object. The overlay
    /// bypasses document state and the timeline until cleared; it never
    /// persists.
    pub fn set_drag_overlay(&mut self, json: &str) -> Result<()> {
        let payload: DragOverlayPayload = serde_json::from_str(json)?;
        self.drag_overlays
            .insert(payload.object_id, payload.transform);
        Ok(())
    }

    /// Merges additional fields into an in-flight overlay (starting one if
    /// none exists for the object).
    pub fn update_drag_overlay(&mut self, json: &str) -> Result<()> {
        let payload: DragOverlayPayload = serde_json::from_str(json)?;
        let entry = self
            .drag_overlays
            .entry(payload.object_id)
            .or_default();
        merge_patch(entry, &payload.transform);
        Ok(())
    }

    pub fn clear_drag_overlay(&mut self) {
        self.drag_overlays.clear();
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Builds the scene graph for the current playhead and mode.
    pub fn scene_graph(&self) -> Result<SceneGraph> {
        let document = self.document()?;
        let scene_id = self
            .scene_id
            .as_deref()
            .ok_or_else(|| CelError::SceneNotFound(String::new()))?;
        build_scene(
            document,
            scene_id,
            self.frame,
            self.playing,
            &self.drag_overlays,
        )
    }

    /// The draw-command list for the current frame.
    pub fn render_commands(&self) -> Result<Vec<DrawCommand>> {
        Ok(compile_commands(&self.scene_graph()?))
    }

    /// The draw-command list serialized to JSON.
    pub fn render(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.render_commands()?)?)
    }

    /// Front-most object at `(x, y)`, or `None`.
    pub fn hit_test(&self, x: f64, y: f64) -> Result<Option<String>> {
        Ok(hit_test(&self.scene_graph()?, x, y))
    }

    /// Union bounds of the current selection; zero when nothing selected
    /// or selected ids are not in the evaluated scene.
    pub fn selection_bounds(&self) -> Result<Rect> {
        let graph = self.scene_graph()?;
        Ok(selection_bounds(&graph, &self.selection).unwrap_or(Rect::ZERO))
    }

    /// The current scene entity as JSON.
    pub fn scene_json(&self) -> Result<String> {
        let document = self.document()?;
        let scene = self
            .scene_id
            .as_deref()
            .and_then(|id| document.scene(id))
            .ok_or_else(|| CelError::SceneNotFound(String::new()))?;
        Ok(serde_json::to_string(scene)?)
    }

    /// The whole document as JSON.
    pub fn document_json(&self) -> Result<String> {
        self.document()?.to_json_string()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_patch(target: &mut TransformPatch, patch: &TransformPatch) {
    target.x = patch.x.or(target.x);
    target.y = patch.y.or(target.y);
    target.sx = patch.sx.or(target.sx);
    target.sy = patch.sy.or(target.sy);
    target.rotation = patch.rotation.or(target.rotation);
    target.anchor_x = patch.anchor_x.or(target.anchor_x);
    target.anchor_y = patch.anchor_y.or(target.anchor_y);
    target.skew_x = patch.skew_x.or(target.skew_x);
    target.skew_y = patch.skew_y.or(target.skew_y);
}
