use crate::peer::Peer;
use huddle_core::{
    ClientJoinedPayload, ClientRef, InitPayload, OutboundMessage, PeerId, RoomId, RosterEntry,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomError {
    /// The room was emptied and removed, or deleted, before the join landed.
    #[error("room {0} is closed")]
    Closed(RoomId),
}

struct Member {
    peer: Arc<Peer>,
    seq: u64,
}

#[derive(Default)]
struct Members {
    peers: HashMap<PeerId, Member>,
    next_seq: u64,
    closed: bool,
}

impl Members {
    fn others(&self, except: PeerId) -> impl Iterator<Item = &Arc<Peer>> {
        self.peers
            .iter()
            .filter(move |(id, _)| **id != except)
            .map(|(_, member)| &member.peer)
    }

    fn roster(&self) -> Vec<RosterEntry> {
        let mut members: Vec<&Member> = self.peers.values().collect();
        members.sort_by_key(|member| member.seq);

        members
            .into_iter()
            .map(|member| RosterEntry {
                id: member.peer.id(),
                username: member.peer.display_name().to_owned(),
            })
            .collect()
    }
}

/// A set of peers that signal to each other.
///
/// Membership changes take the write lock; fan-out only reads. Every delivery is a
/// non-blocking enqueue, so no lock is held across I/O.
pub struct Room {
    id: RoomId,
    members: RwLock<Members>,
}

impl Room {
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            members: RwLock::new(Members::default()),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// Adds the peer, hands it the roster of everyone already here, then
    /// announces it to them. Both happen under one write lock, so the joiner's
    /// `init` is queued before any other member can react to `client_joined`.
    pub fn join(&self, peer: Arc<Peer>) -> Result<(), RoomError> {
        let mut members = self.members.write();
        if members.closed {
            return Err(RoomError::Closed(self.id.clone()));
        }

        let peer_id = peer.id();
        if members.peers.contains_key(&peer_id) {
            return Ok(());
        }

        let init = OutboundMessage::Init(InitPayload {
            clients: members.roster(),
        });
        peer.deliver(Arc::new(init));

        let joined = Arc::new(OutboundMessage::ClientJoined(ClientJoinedPayload {
            client_id: peer_id,
            username: peer.display_name().to_owned(),
        }));
        for other in members.others(peer_id) {
            other.deliver(joined.clone());
        }

        let seq = members.next_seq;
        members.next_seq += 1;
        members.peers.insert(peer_id, Member { peer, seq });

        info!(room = %self.id, peer = %peer_id, size = members.peers.len(), "Peer joined room");
        Ok(())
    }

    /// Removes the peer and tells the rest. Leaving twice is a no-op.
    pub fn leave(&self, peer_id: PeerId) -> bool {
        let mut members = self.members.write();
        if members.peers.remove(&peer_id).is_none() {
            return false;
        }

        let left = Arc::new(OutboundMessage::ClientLeft(ClientRef { client_id: peer_id }));
        for other in members.others(peer_id) {
            other.deliver(left.clone());
        }

        info!(room = %self.id, peer = %peer_id, size = members.peers.len(), "Peer left room");
        true
    }

    /// Delivers to every member except `sender`. Returns how many were reached.
    pub fn broadcast(&self, sender: PeerId, message: OutboundMessage) -> usize {
        let message = Arc::new(message);
        let members = self.members.read();

        members
            .others(sender)
            .filter(|peer| peer.deliver(message.clone()))
            .count()
    }

    /// Delivers to `target` if it is a member; otherwise the message is dropped.
    pub fn unicast(&self, target: PeerId, message: OutboundMessage) -> bool {
        let members = self.members.read();

        match members.peers.get(&target) {
            Some(member) => member.peer.deliver(Arc::new(message)),
            None => {
                debug!(room = %self.id, peer = %target, "Unicast target not in room");
                false
            }
        }
    }

    pub fn contains(&self, peer_id: PeerId) -> bool {
        self.members.read().peers.contains_key(&peer_id)
    }

    pub fn roster(&self) -> Vec<RosterEntry> {
        self.members.read().roster()
    }

    pub fn participant_count(&self) -> usize {
        self.members.read().peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participant_count() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.members.read().closed
    }

    /// Refuses further joins and disconnects every member. Their connection
    /// tasks perform the actual leave.
    pub fn close(&self) -> usize {
        let mut members = self.members.write();
        members.closed = true;

        for member in members.peers.values() {
            member.peer.close();
        }
        members.peers.len()
    }

    /// Closes the room only if nobody is in it.
    pub(crate) fn seal_if_empty(&self) -> bool {
        let mut members = self.members.write();
        if members.peers.is_empty() {
            members.closed = true;
        }
        members.closed && members.peers.is_empty()
    }
}
