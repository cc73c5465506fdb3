//! Collaboration Substrate
//!
//! Per-project rooms hold the authoritative document; many concurrent
//! editors stream typed mutation operations in, the hub applies each one
//! under the room's single-writer discipline, acks the sender, broadcasts
//! to everyone else and periodically flushes dirty documents back to the
//! snapshot store.
//!
//! # Architecture
//!
//! - [`protocol`] - Wire envelopes, message kinds and transport limits
//! - [`ops`] - The typed operation catalogue
//! - [`apply`] - The pure `(document, operation) → document' | error`
//!   dispatcher
//! - [`presence`] - Ephemeral per-room cursors and selections
//! - [`client`] - Per-connection handle with a bounded, drop-on-overflow
//!   send queue
//! - [`room`] - One project's authoritative state: document, sequence
//!   counter, op log, presence, clients
//! - [`hub`] - The actor servicing register/unregister/inbound events and
//!   the room registry
//! - [`store`] - Snapshot persistence behind a trait
//!
//! Ordering is defined by the server: every accepted operation gets the
//! room's next `serverSeq`, and clients converge by applying broadcasts in
//! ascending sequence order. Conflicts resolve last-writer-wins; there is
//! no operational transform.
//!
//! The operation model and protocol types compile on both targets; the
//! hub, rooms and stores are server-side only.

pub mod apply;
pub mod ops;
pub mod presence;
pub mod protocol;

#[cfg(not(target_arch = "wasm32"))]
pub mod client;
#[cfg(not(target_arch = "wasm32"))]
pub mod hub;
#[cfg(not(target_arch = "wasm32"))]
pub mod room;
#[cfg(not(target_arch = "wasm32"))]
pub mod store;

pub use apply::apply_operation;
pub use ops::{OpKind, Operation};
pub use presence::{Cursor, PresenceEntry, PresenceTable};
pub use protocol::Envelope;

#[cfg(not(target_arch = "wasm32"))]
pub use client::ClientHandle;
#[cfg(not(target_arch = "wasm32"))]
pub use hub::{Hub, HubEvent};
#[cfg(not(target_arch = "wasm32"))]
pub use room::Room;
#[cfg(not(target_arch = "wasm32"))]
pub use store::{FileStore, MemoryStore, SnapshotStore};
