//! Per-connection client handles.
//!
//! A handle pairs the connection's authenticated identity with the sending
//! half of its bounded outbound queue. The writer pump on the other end
//! drains the queue onto the socket; when the queue is full the message is
//! dropped rather than ever blocking the room.

use tokio::sync::mpsc;

use crate::collab::protocol::{Envelope, SEND_QUEUE_DEPTH};

#[derive(Debug, Clone)]
pub struct ClientHandle {
    pub client_id: String,
    pub user_id: String,
    pub display_name: String,
    sender: mpsc::Sender<Envelope>,
}

impl ClientHandle {
    /// Creates a handle plus the receiving half its writer pump drains.
    #[must_use]
    pub fn channel(
        client_id: &str,
        user_id: &str,
        display_name: &str,
    ) -> (Self, mpsc::Receiver<Envelope>) {
        let (sender, receiver) = mpsc::channel(SEND_QUEUE_DEPTH);
        (
            Self {
                client_id: client_id.to_string(),
                user_id: user_id.to_string(),
                display_name: display_name.to_string(),
                sender,
            },
            receiver,
        )
    }

    /// Enqueues a message without blocking. Overflow drops the message
    /// with a warning; a closed peer is quietly ignored (its unregister is
    /// already in flight).
    pub fn send(&self, envelope: Envelope) {
        match self.sender.try_send(envelope) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(envelope)) => {
                log::warn!(
                    "send queue full for client {}, dropping {}",
                    self.client_id,
                    envelope.kind
                );
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                log::debug!("client {} already closed", self.client_id);
            }
        }
    }
}
