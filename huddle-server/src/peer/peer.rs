use huddle_core::{Identity, OutboundMessage, PeerId};
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

/// Receiving end of a peer's outbound queue, drained only by its write loop.
pub type Outbox = mpsc::Receiver<Arc<OutboundMessage>>;

/// One connected participant as seen by its room.
///
/// Any task may enqueue into the peer; only the peer's own write loop drains it.
/// Closing is a one-way latch observed by both connection loops.
#[derive(Debug)]
pub struct Peer {
    id: PeerId,
    identity: Identity,
    outbox: mpsc::Sender<Arc<OutboundMessage>>,
    closed: watch::Sender<bool>,
}

impl Peer {
    pub fn new(identity: Identity, queue_capacity: usize) -> (Arc<Self>, Outbox) {
        let (outbox, rx) = mpsc::channel(queue_capacity.max(1));
        let (closed, _) = watch::channel(false);

        let peer = Self {
            id: PeerId::new(),
            identity,
            outbox,
            closed,
        };
        (Arc::new(peer), rx)
    }

    pub fn id(&self) -> PeerId {
        self.id
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn display_name(&self) -> &str {
        &self.identity.display_name
    }

    /// Non-blocking enqueue. A full queue means the peer is not keeping up,
    /// so it gets disconnected instead of stalling the sender.
    pub fn deliver(&self, message: Arc<OutboundMessage>) -> bool {
        if self.is_closed() {
            return false;
        }

        match self.outbox.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(message)) => {
                warn!(
                    peer = %self.id,
                    kind = message.kind(),
                    "Outbound queue full, disconnecting slow peer"
                );
                self.close();
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(peer = %self.id, "Outbound queue already closed");
                false
            }
        }
    }

    /// Returns `true` only for the call that actually closed the peer.
    pub fn close(&self) -> bool {
        !self.closed.send_replace(true)
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    pub(crate) fn closed_signal(&self) -> watch::Receiver<bool> {
        self.closed.subscribe()
    }
}

/// Resolves once the peer has been closed by anyone.
pub(crate) async fn closed(signal: &mut watch::Receiver<bool>) {
    let _ = signal.wait_for(|closed| *closed).await;
}
