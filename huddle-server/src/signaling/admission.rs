use crate::peer::{Peer, PeerConnection};
use crate::room::{RoomError, RoomRegistry};
use crate::transport::{Frame, TransportConfig};
use axum::extract::ws::{Message, WebSocket};
use futures::{Sink, SinkExt, Stream, StreamExt, future};
use huddle_core::{Identity, PeerId, RoomId};
use std::fmt::Display;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// A peer that has joined its room and whose loops are running.
#[derive(Debug)]
pub struct Admitted {
    pub peer_id: PeerId,
    pub room_id: RoomId,
    /// Completes after both loops stopped and the peer has left its room.
    pub task: JoinHandle<()>,
}

/// Joins a freshly minted peer to `room_id` (creating the room if needed) and
/// starts its connection loops over the given duplex transport halves.
pub fn admit<W, R, E>(
    registry: &RoomRegistry,
    room_id: &RoomId,
    identity: Identity,
    writer: W,
    reader: R,
    config: &TransportConfig,
) -> Admitted
where
    W: Sink<Frame> + Unpin + Send + 'static,
    W::Error: Display + Send,
    R: Stream<Item = Result<Frame, E>> + Unpin + Send + 'static,
    E: Display + Send + 'static,
{
    let (peer, outbox) = Peer::new(identity, config.queue_capacity);

    let room = loop {
        let room = registry.get_or_create(room_id);
        match room.join(peer.clone()) {
            Ok(()) => break room,
            Err(RoomError::Closed(_)) => {
                debug!(room = %room_id, "Room closed during admission, retrying");
                registry.discard(&room);
            }
        }
    };

    info!(
        peer = %peer.id(),
        room = %room_id,
        user = %peer.identity().user_id,
        "New WebSocket connection"
    );

    let peer_id = peer.id();
    let connection = PeerConnection::new(peer, room, registry.clone(), config.clone());
    let task = tokio::spawn(connection.run(outbox, writer, reader));

    Admitted {
        peer_id,
        room_id: room_id.clone(),
        task,
    }
}

/// Admits an upgraded axum socket and waits for the connection to end.
pub async fn admit_socket(
    registry: RoomRegistry,
    room_id: RoomId,
    identity: Identity,
    socket: WebSocket,
    config: TransportConfig,
) {
    let (sender, receiver) = socket.split();
    let writer = sender.with(|frame: Frame| future::ready(Ok::<_, axum::Error>(Message::from(frame))));
    let reader = receiver.map(|message| message.map(Frame::from));

    let admitted = admit(&registry, &room_id, identity, writer, reader, &config);
    if let Err(e) = admitted.task.await {
        error!(peer = %admitted.peer_id, "Connection task failed: {}", e);
    }
}
