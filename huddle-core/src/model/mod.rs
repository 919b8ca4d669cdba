mod inbound;
mod outbound;
mod peer;
mod room;

pub use inbound::{
    DataPayload, DecodeError, IceCandidatePayload, InboundEnvelope, InboundKind, InboundMessage,
    SessionDescription, SessionDescriptionPayload, StreamMetadataPayload, StreamType,
    TrackPayload, decode,
};
pub use outbound::{
    ClientJoinedPayload, ClientRef, InitPayload, OutboundMessage, RelayedDescription,
    RelayedIceCandidate, RosterEntry, StreamAnnouncement, TrackState,
};
pub use peer::{Identity, PeerId};
pub use room::RoomId;
