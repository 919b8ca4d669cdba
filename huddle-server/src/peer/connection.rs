use super::dispatch::{Delivery, route};
use super::peer::{Outbox, Peer, closed};
use crate::room::{Room, RoomRegistry};
use crate::transport::{Frame, TransportConfig};
use bytes::Bytes;
use futures::{Sink, SinkExt, Stream, StreamExt};
use huddle_core::{DecodeError, decode};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Upper bound on the goodbye (close frame + flush) to a peer that may not be reading.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Why one of the connection loops stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disconnect {
    /// The other loop, an eviction or a room deletion closed the peer.
    Closed,
    /// The remote end sent a close frame or the stream ended.
    PeerGone,
    ReadError,
    /// No pong within the read window.
    ReadTimeout,
    WriteError,
}

/// Drives one admitted peer: an inbound pump, an outbound pump, and the
/// teardown that runs once both have stopped.
pub struct PeerConnection {
    peer: Arc<Peer>,
    room: Arc<Room>,
    registry: RoomRegistry,
    config: TransportConfig,
}

impl PeerConnection {
    pub fn new(
        peer: Arc<Peer>,
        room: Arc<Room>,
        registry: RoomRegistry,
        config: TransportConfig,
    ) -> Self {
        Self {
            peer,
            room,
            registry,
            config,
        }
    }

    pub async fn run<W, R, E>(self, outbox: Outbox, writer: W, reader: R)
    where
        W: Sink<Frame> + Unpin + Send + 'static,
        W::Error: Display + Send,
        R: Stream<Item = Result<Frame, E>> + Unpin + Send + 'static,
        E: Display + Send + 'static,
    {
        let peer_id = self.peer.id();

        let write_task = tokio::spawn(write_loop(
            self.peer.clone(),
            outbox,
            writer,
            self.config.ping_period(),
        ));
        let read_task = tokio::spawn(read_loop(
            self.peer.clone(),
            self.room.clone(),
            reader,
            self.config.pong_wait,
        ));

        let (written, read) = tokio::join!(write_task, read_task);
        match (written, read) {
            (Ok(write_reason), Ok(read_reason)) => {
                debug!(peer = %peer_id, ?write_reason, ?read_reason, "Connection loops finished");
            }
            (written, read) => {
                error!(peer = %peer_id, ?written, ?read, "Connection loop aborted");
            }
        }

        self.room.leave(peer_id);
        self.registry.release_if_empty(&self.room);
        info!(peer = %peer_id, room = %self.room.id(), "WebSocket disconnected");
    }
}

async fn write_loop<W>(
    peer: Arc<Peer>,
    mut outbox: Outbox,
    mut writer: W,
    ping_period: Duration,
) -> Disconnect
where
    W: Sink<Frame> + Unpin,
    W::Error: Display,
{
    let mut closed_signal = peer.closed_signal();
    let mut ticker = time::interval_at(Instant::now() + ping_period, ping_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let reason = loop {
        let frame = tokio::select! {
            _ = closed(&mut closed_signal) => break Disconnect::Closed,
            message = outbox.recv() => {
                let Some(message) = message else {
                    break Disconnect::Closed;
                };
                match message.to_json() {
                    Ok(json) => Frame::Text(json),
                    Err(e) => {
                        error!(peer = %peer.id(), kind = message.kind(), "Failed to serialize message: {}", e);
                        continue;
                    }
                }
            }
            _ = ticker.tick() => Frame::Ping(Bytes::new()),
        };

        if let Err(reason) = send_frame(&peer, &mut writer, frame, &mut closed_signal).await {
            break reason;
        }
    };

    if reason == Disconnect::Closed {
        let _ = time::timeout(CLOSE_GRACE, writer.send(Frame::Close)).await;
    }
    let _ = time::timeout(CLOSE_GRACE, writer.close()).await;

    peer.close();
    reason
}

/// A write to a stalled socket must not outlive the peer being closed.
async fn send_frame<W>(
    peer: &Peer,
    writer: &mut W,
    frame: Frame,
    closed_signal: &mut watch::Receiver<bool>,
) -> Result<(), Disconnect>
where
    W: Sink<Frame> + Unpin,
    W::Error: Display,
{
    tokio::select! {
        sent = writer.send(frame) => sent.map_err(|e| {
            debug!(peer = %peer.id(), "Write failed: {}", e);
            Disconnect::WriteError
        }),
        _ = closed(closed_signal) => Err(Disconnect::Closed),
    }
}

async fn read_loop<R, E>(
    peer: Arc<Peer>,
    room: Arc<Room>,
    mut reader: R,
    pong_wait: Duration,
) -> Disconnect
where
    R: Stream<Item = Result<Frame, E>> + Unpin,
    E: Display,
{
    let mut closed_signal = peer.closed_signal();
    let deadline = time::sleep(pong_wait);
    tokio::pin!(deadline);

    let reason = loop {
        tokio::select! {
            _ = closed(&mut closed_signal) => break Disconnect::Closed,
            _ = &mut deadline => {
                debug!(peer = %peer.id(), "No pong within {:?}", pong_wait);
                break Disconnect::ReadTimeout;
            }
            frame = reader.next() => match frame {
                None | Some(Ok(Frame::Close)) => break Disconnect::PeerGone,
                Some(Err(e)) => {
                    debug!(peer = %peer.id(), "Read failed: {}", e);
                    break Disconnect::ReadError;
                }
                Some(Ok(Frame::Text(text))) => handle_frame(&peer, &room, &text),
                Some(Ok(Frame::Binary(data))) => match std::str::from_utf8(&data) {
                    Ok(text) => handle_frame(&peer, &room, text),
                    Err(_) => debug!(peer = %peer.id(), "Skipping non UTF-8 binary frame"),
                },
                Some(Ok(Frame::Pong(_))) => deadline.as_mut().reset(Instant::now() + pong_wait),
                Some(Ok(Frame::Ping(_))) => {}
            }
        }
    };

    peer.close();
    reason
}

fn handle_frame(peer: &Peer, room: &Room, text: &str) {
    let message = match decode(text) {
        Ok(message) => message,
        Err(DecodeError::UnknownType(kind)) => {
            warn!(peer = %peer.id(), "Unknown payload type: '{}'", kind);
            return;
        }
        Err(e) => {
            debug!(peer = %peer.id(), "Ignoring frame: {}", e);
            return;
        }
    };

    match route(peer.id(), message) {
        Delivery::Broadcast(message) => {
            room.broadcast(peer.id(), message);
        }
        Delivery::Unicast { target, message } => {
            room.unicast(target, message);
        }
        Delivery::Discard => {
            debug!(peer = %peer.id(), "Dropping message addressed to a malformed peer id");
        }
    }
}
