//! The hub actor.
//!
//! One actor services three event streams (client register, client
//! unregister, per-client inbound messages) for every room in the
//! process. Rooms are created on first arrival (loading the latest
//! snapshot, seeding a fresh document when none exists) and destroyed
//! when the last client leaves, after a final flush. The rooms map is
//! behind a reader-writer lock used only for create/lookup/destroy; all
//! intra-room state lives behind each room's own lock.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::collab::client::ClientHandle;
use crate::collab::ops::Operation;
use crate::collab::protocol::{Envelope, FLUSH_INTERVAL, kind};
use crate::collab::room::{Room, deliver};
use crate::collab::store::SnapshotStore;
use crate::document::samples::seed_document;
use crate::errors::{OpError, Result};

/// Events fed to [`Hub::run`] by the connection pumps.
#[derive(Debug)]
pub enum HubEvent {
    Register {
        project_id: String,
        client: ClientHandle,
    },
    Unregister {
        project_id: String,
        client_id: String,
    },
    Inbound {
        project_id: String,
        client_id: String,
        envelope: Envelope,
    },
}

/// The per-process collaboration hub.
pub struct Hub<S: SnapshotStore> {
    rooms: RwLock<FxHashMap<String, Arc<Room>>>,
    /// Connection index for replies that cannot be routed through a room
    /// (e.g. nacking a submit against a room that no longer exists).
    connections: RwLock<FxHashMap<String, ClientHandle>>,
    store: S,
}

impl<S: SnapshotStore> Hub<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            rooms: RwLock::new(FxHashMap::default()),
            connections: RwLock::new(FxHashMap::default()),
            store,
        }
    }

    /// Drains the event channel until every sender is gone.
    pub async fn run(&self, events: flume::Receiver<HubEvent>) {
        while let Ok(event) = events.recv_async().await {
            self.handle_event(event).await;
        }
        log::info!("hub event channel closed, shutting down");
    }

    pub async fn handle_event(&self, event: HubEvent) {
        match event {
            HubEvent::Register { project_id, client } => {
                if let Err(error) = self.connect(&project_id, client.clone()).await {
                    log::error!("register failed for {project_id}: {error}");
                    client.send(Envelope::error(&format!("failed to join: {error}")));
                }
            }
            HubEvent::Unregister {
                project_id,
                client_id,
            } => self.disconnect(&project_id, &client_id).await,
            HubEvent::Inbound {
                project_id,
                client_id,
                envelope,
            } => self.handle_message(&project_id, &client_id, envelope),
        }
    }

    // ========================================================================
    // Membership
    // ========================================================================

    /// Adds a client to its project's room, creating the room from the
    /// latest snapshot (or a fresh seed) on first arrival.
    pub async fn connect(&self, project_id: &str, client: ClientHandle) -> Result<Arc<Room>> {
        let room = self.room_or_create(project_id).await?;
        self.connections
            .write()
            .insert(client.client_id.clone(), client.clone());
        deliver(room.join(&client));
        Ok(room)
    }

    /// Removes a client; the last one out flushes and destroys the room.
    pub async fn disconnect(&self, project_id: &str, client_id: &str) {
        self.connections.write().remove(client_id);
        let Some(room) = self.room(project_id) else {
            return;
        };
        let (mail, empty) = room.leave(client_id);
        deliver(mail);
        if empty {
            self.flush_room(&room).await;
            let mut rooms = self.rooms.write();
            // A client may have raced in while the flush was in flight.
            if room.client_count() == 0 {
                rooms.remove(project_id);
                log::info!("room {project_id} destroyed");
            }
        }
    }

    // ========================================================================
    // Inbound dispatch
    // ========================================================================

    /// Routes one inbound envelope. Unknown message kinds answer with an
    /// `error` envelope; nothing a single client sends can stall the room.
    pub fn handle_message(&self, project_id: &str, client_id: &str, envelope: Envelope) {
        match envelope.kind.as_str() {
            kind::OP_SUBMIT => self.handle_submit(project_id, client_id, &envelope.payload),
            kind::PRESENCE_UPDATE => {
                if let Some(room) = self.room(project_id) {
                    deliver(room.presence_update(client_id, &envelope.payload));
                } else if let Some(client) = self.connection(client_id) {
                    client.send(Envelope::error("room not found"));
                }
            }
            other => {
                log::debug!("client {client_id}: unknown message type {other}");
                if let Some(client) = self.connection(client_id) {
                    client.send(Envelope::error(&format!("unknown message type: {other}")));
                }
            }
        }
    }

    fn handle_submit(&self, project_id: &str, client_id: &str, payload: &Value) {
        // The operation may come wrapped as {"operation": …} or bare.
        let op_value = payload
            .get("operation")
            .cloned()
            .unwrap_or_else(|| payload.clone());
        let op_id = op_value
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let Some(room) = self.room(project_id) else {
            if let Some(client) = self.connection(client_id) {
                client.send(Envelope::op_nack(&op_id, &OpError::RoomNotFound.to_string()));
            }
            return;
        };
        match Operation::from_value(op_value) {
            Ok(operation) => deliver(room.submit(client_id, &operation)),
            Err(error) => deliver(room.nack(client_id, &op_id, &error)),
        }
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Saves every dirty room.
    pub async fn flush_dirty(&self) {
        let rooms: Vec<Arc<Room>> = self.rooms.read().values().cloned().collect();
        for room in rooms {
            self.flush_room(&room).await;
        }
    }

    /// Saves one room if it has unpersisted operations.
    pub async fn flush_room(&self, room: &Room) {
        let Some((document, snapshot_seq)) = room.snapshot_if_dirty() else {
            return;
        };
        match self.store.save(room.project_id(), &document).await {
            Ok(version) => {
                room.mark_clean(snapshot_seq, version);
                log::debug!(
                    "room {}: flushed snapshot v{version} at seq {snapshot_seq}",
                    room.project_id()
                );
            }
            Err(error) => {
                log::error!("room {}: flush failed: {error}", room.project_id());
            }
        }
    }

    /// Periodic dirty-room flush; spawn this next to [`Hub::run`].
    pub async fn run_flush_loop(&self) {
        loop {
            tokio::time::sleep(FLUSH_INTERVAL).await;
            self.flush_dirty().await;
        }
    }

    // ========================================================================
    // Room registry
    // ========================================================================

    #[must_use]
    pub fn room(&self, project_id: &str) -> Option<Arc<Room>> {
        self.rooms.read().get(project_id).cloned()
    }

    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms.read().len()
    }

    fn connection(&self, client_id: &str) -> Option<ClientHandle> {
        self.connections.read().get(client_id).cloned()
    }

    async fn room_or_create(&self, project_id: &str) -> Result<Arc<Room>> {
        if let Some(room) = self.room(project_id) {
            return Ok(room);
        }
        // Load outside the lock; I/O must never block lookups.
        let document = match self.store.load(project_id).await? {
            Some(document) => {
                log::info!("room {project_id}: loaded snapshot v{}", document.version);
                document
            }
            None => {
                log::info!("room {project_id}: no snapshot, seeding");
                seed_document(project_id, "Untitled")
            }
        };
        let mut rooms = self.rooms.write();
        let room = rooms
            .entry(project_id.to_string())
            .or_insert_with(|| Arc::new(Room::new(project_id, document)));
        Ok(room.clone())
    }
}
