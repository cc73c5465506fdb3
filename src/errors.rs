//! Error Types
//!
//! This module defines the error types used throughout the engine and the
//! collaboration hub.
//!
//! # Overview
//!
//! [`CelError`] covers the crate-wide failure modes:
//! - Document loading and validation failures
//! - JSON encoding/decoding errors
//! - Snapshot store I/O errors
//! - Rejected mutation operations
//!
//! [`OpError`] is the narrower error used by the operation dispatcher. Its
//! `Display` output is wire-visible: the hub copies it verbatim into
//! `op.nack` reasons, so the message formats are part of the protocol.

use thiserror::Error;

/// The main error type for the Cel engine.
#[derive(Error, Debug)]
pub enum CelError {
    // ========================================================================
    // Document Errors
    // ========================================================================
    /// The document failed structural validation on load.
    #[error("bad document: {0}")]
    BadDocument(String),

    /// The requested scene does not exist in the loaded document.
    #[error("scene not found: {0}")]
    SceneNotFound(String),

    /// No document has been loaded into the engine yet.
    #[error("no document loaded")]
    NoDocument,

    // ========================================================================
    // Serialization & I/O Errors
    // ========================================================================
    /// JSON parsing or encoding error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Snapshot store I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // ========================================================================
    // Collaboration Errors
    // ========================================================================
    /// A mutation operation was rejected by the dispatcher.
    #[error(transparent)]
    OpRejected(#[from] OpError),

    /// The hub event loop has shut down and no longer accepts events.
    #[error("hub closed")]
    HubClosed,
}

/// Rejection reasons produced by the operation dispatcher.
///
/// The `Display` strings are sent to clients as `op.nack` reasons and must
/// stay stable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OpError {
    /// The operation `type` field names no known operation.
    #[error("unknown operation type: {0}")]
    UnknownType(String),

    /// The operation targets an entity id that does not exist.
    /// The payload names the entity table, e.g. `"object"` or `"keyframe"`.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A required field is missing from the operation payload.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A supplied field has an unusable value.
    #[error("invalid {0}")]
    InvalidField(&'static str),

    /// The addressed room does not exist.
    #[error("room not found")]
    RoomNotFound,

    /// The operation envelope itself could not be decoded.
    #[error("malformed operation: {0}")]
    Malformed(String),
}

/// Alias for `Result<T, CelError>`.
pub type Result<T> = std::result::Result<T, CelError>;
