//! Per-project rooms.
//!
//! A room owns the authoritative document, the monotonically increasing
//! `serverSeq`, the operation log, the dirty flag, the presence table and
//! the connected clients. All of it sits behind the room's own lock; every
//! method computes its outbound messages under the lock and returns them
//! as [`Mail`], which the caller delivers after the lock is released.

use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use serde_json::Value;

use crate::collab::apply::apply_operation;
use crate::collab::client::ClientHandle;
use crate::collab::ops::Operation;
use crate::collab::presence::{PresenceTable, PresenceUpdate};
use crate::collab::protocol::Envelope;
use crate::document::Document;
use crate::errors::OpError;

/// One outbound message bound to one client.
#[derive(Debug)]
pub struct Mail {
    pub to: ClientHandle,
    pub envelope: Envelope,
}

impl Mail {
    fn new(to: &ClientHandle, mut envelope: Envelope, project_id: &str) -> Self {
        envelope.project_id = Some(project_id.to_string());
        Self {
            to: to.clone(),
            envelope,
        }
    }
}

/// Delivers a batch of mail; call this only after the room lock is gone.
pub fn deliver(mail: Vec<Mail>) {
    for item in mail {
        item.to.send(item.envelope);
    }
}

struct RoomState {
    document: Document,
    server_seq: u64,
    op_log: Vec<Operation>,
    dirty: bool,
    presence: PresenceTable,
    clients: Vec<ClientHandle>,
}

/// In-memory authoritative state of one project plus its clients.
pub struct Room {
    project_id: String,
    state: Mutex<RoomState>,
}

impl Room {
    #[must_use]
    pub fn new(project_id: &str, document: Document) -> Self {
        Self {
            project_id: project_id.to_string(),
            state: Mutex::new(RoomState {
                document,
                server_seq: 0,
                op_log: Vec::new(),
                dirty: false,
                presence: PresenceTable::new(),
                clients: Vec::new(),
            }),
        }
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    // ========================================================================
    // Membership
    // ========================================================================

    /// Adds a client: the newcomer gets `welcome`, the full document and
    /// the presence table; everyone else gets `presence.join`.
    #[must_use]
    pub fn join(&self, client: &ClientHandle) -> Vec<Mail> {
        let mut state = self.state.lock();
        log::info!(
            "room {}: client {} (user {}) joined",
            self.project_id,
            client.client_id,
            client.user_id
        );
        state.clients.push(client.clone());
        let entry = state.presence.join(&client.user_id, &client.display_name);

        let mut mail = vec![
            Mail::new(
                client,
                Envelope::welcome(&client.user_id, &client.display_name),
                &self.project_id,
            ),
            Mail::new(
                client,
                Envelope::doc_sync(&state.document),
                &self.project_id,
            ),
            Mail::new(
                client,
                Envelope::presence_state(&state.presence.snapshot()),
                &self.project_id,
            ),
        ];
        for other in state
            .clients
            .iter()
            .filter(|c| c.client_id != client.client_id)
        {
            mail.push(Mail::new(
                other,
                Envelope::presence_join(&entry),
                &self.project_id,
            ));
        }
        mail
    }

    /// Removes a client. When its user has no remaining connections the
    /// presence entry is dropped and `presence.leave` broadcast. Returns
    /// the outbound mail and whether the room is now empty.
    #[must_use]
    pub fn leave(&self, client_id: &str) -> (Vec<Mail>, bool) {
        let mut state = self.state.lock();
        let Some(position) = state.clients.iter().position(|c| c.client_id == client_id) else {
            return (Vec::new(), state.clients.is_empty());
        };
        let client = state.clients.remove(position);
        log::info!(
            "room {}: client {} (user {}) left",
            self.project_id,
            client.client_id,
            client.user_id
        );

        let mut mail = Vec::new();
        let user_still_here = state.clients.iter().any(|c| c.user_id == client.user_id);
        if !user_still_here && state.presence.remove(&client.user_id).is_some() {
            for other in &state.clients {
                mail.push(Mail::new(
                    other,
                    Envelope::presence_leave(&client.user_id),
                    &self.project_id,
                ));
            }
        }
        let empty = state.clients.is_empty();
        (mail, empty)
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Applies a submitted operation under the room writer. On success the
    /// sequence advances, the op is logged, the sender is acked and every
    /// other client gets the broadcast; on failure only the sender hears
    /// about it and nothing else moves.
    #[must_use]
    pub fn submit(&self, client_id: &str, operation: &Operation) -> Vec<Mail> {
        let mut state = self.state.lock();
        let Some(sender) = state
            .clients
            .iter()
            .find(|c| c.client_id == client_id)
            .cloned()
        else {
            log::warn!(
                "room {}: op from unknown client {}",
                self.project_id,
                client_id
            );
            return Vec::new();
        };

        match apply_operation(&mut state.document, operation) {
            Ok(()) => {
                state.server_seq += 1;
                state.dirty = true;
                let seq = state.server_seq;
                state.op_log.push(operation.clone());

                let mut mail = vec![Mail::new(
                    &sender,
                    Envelope::op_ack(&operation.id, seq, now_millis()),
                    &self.project_id,
                )];
                for other in state
                    .clients
                    .iter()
                    .filter(|c| c.client_id != client_id)
                {
                    mail.push(Mail::new(
                        other,
                        Envelope::op_broadcast(operation, &sender.user_id, seq),
                        &self.project_id,
                    ));
                }
                mail
            }
            Err(error) => {
                log::warn!(
                    "room {}: rejected {} from {}: {}",
                    self.project_id,
                    operation.type_name(),
                    client_id,
                    error
                );
                vec![Mail::new(
                    &sender,
                    Envelope::op_nack(&operation.id, &error.to_string()),
                    &self.project_id,
                )]
            }
        }
    }

    /// Nacks a message that never decoded into an operation.
    #[must_use]
    pub fn nack(&self, client_id: &str, operation_id: &str, error: &OpError) -> Vec<Mail> {
        let state = self.state.lock();
        state
            .clients
            .iter()
            .find(|c| c.client_id == client_id)
            .map(|sender| {
                vec![Mail::new(
                    sender,
                    Envelope::op_nack(operation_id, &error.to_string()),
                    &self.project_id,
                )]
            })
            .unwrap_or_default()
    }

    // ========================================================================
    // Presence
    // ========================================================================

    /// Applies a presence update and broadcasts it to the other clients.
    /// The display name comes from the connection identity, never the
    /// payload.
    #[must_use]
    pub fn presence_update(&self, client_id: &str, payload: &Value) -> Vec<Mail> {
        let update: PresenceUpdate = serde_json::from_value(payload.clone()).unwrap_or_default();
        let mut state = self.state.lock();
        let Some(sender) = state
            .clients
            .iter()
            .find(|c| c.client_id == client_id)
            .cloned()
        else {
            return Vec::new();
        };
        let entry = state
            .presence
            .update(&sender.user_id, &sender.display_name, &update);
        state
            .clients
            .iter()
            .filter(|c| c.client_id != client_id)
            .map(|other| {
                Mail::new(
                    other,
                    Envelope::presence_update(&entry),
                    &self.project_id,
                )
            })
            .collect()
    }

    // ========================================================================
    // Persistence hooks
    // ========================================================================

    /// Clones the document for saving when there are unpersisted
    /// operations; the returned sequence pins the snapshot for
    /// [`Room::mark_clean`].
    #[must_use]
    pub fn snapshot_if_dirty(&self) -> Option<(Document, u64)> {
        let state = self.state.lock();
        state
            .dirty
            .then(|| (state.document.clone(), state.server_seq))
    }

    /// Clears the dirty flag if no operation landed since the snapshot,
    /// and records the persisted version either way.
    pub fn mark_clean(&self, snapshot_seq: u64, version: u64) {
        let mut state = self.state.lock();
        state.document.version = version;
        if state.server_seq == snapshot_seq {
            state.dirty = false;
        }
    }

    // ========================================================================
    // Introspection (used by the hub and tests)
    // ========================================================================

    #[must_use]
    pub fn server_seq(&self) -> u64 {
        self.state.lock().server_seq
    }

    #[must_use]
    pub fn client_count(&self) -> usize {
        self.state.lock().clients.len()
    }

    #[must_use]
    pub fn op_log_len(&self) -> usize {
        self.state.lock().op_log.len()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.state.lock().dirty
    }

    /// Read-side copy of the document.
    #[must_use]
    pub fn document_snapshot(&self) -> Document {
        self.state.lock().document.clone()
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}
