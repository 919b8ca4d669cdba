use huddle_core::{
    ClientRef, IceCandidatePayload, InboundMessage, OutboundMessage, PeerId, RelayedDescription,
    RelayedIceCandidate, SessionDescriptionPayload, StreamAnnouncement, StreamMetadataPayload,
    TrackState,
};

/// Where an inbound message goes once it has been re-stamped with its sender.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Broadcast(OutboundMessage),
    Unicast {
        target: PeerId,
        message: OutboundMessage,
    },
    /// Addressed to something that cannot be a peer id.
    Discard,
}

pub fn route(sender: PeerId, message: InboundMessage) -> Delivery {
    match message {
        InboundMessage::Data(payload) => Delivery::Broadcast(OutboundMessage::Data(payload)),

        InboundMessage::Offer(SessionDescriptionPayload {
            message_id,
            target_client_id,
            client_id,
            value,
        }) => unicast(
            target_client_id.or(client_id),
            OutboundMessage::Offer(RelayedDescription {
                message_id,
                client_id: sender,
                value,
            }),
        ),

        InboundMessage::Answer(SessionDescriptionPayload {
            message_id,
            target_client_id,
            client_id,
            value,
        }) => unicast(
            target_client_id.or(client_id),
            OutboundMessage::Answer(RelayedDescription {
                message_id,
                client_id: sender,
                value,
            }),
        ),

        InboundMessage::IceCandidate(IceCandidatePayload {
            message_id,
            target_client_id,
            client_id,
            value,
        }) => unicast(
            target_client_id.or(client_id),
            OutboundMessage::IceCandidate(RelayedIceCandidate {
                message_id,
                client_id: sender,
                value,
            }),
        ),

        InboundMessage::TrackMuted(track) => {
            Delivery::Broadcast(OutboundMessage::TrackMuted(TrackState {
                client_id: sender,
                track_kind: track.track_kind,
            }))
        }

        InboundMessage::TrackUnmuted(track) => {
            Delivery::Broadcast(OutboundMessage::TrackUnmuted(TrackState {
                client_id: sender,
                track_kind: track.track_kind,
            }))
        }

        InboundMessage::StreamMetadata(StreamMetadataPayload {
            stream_id,
            stream_type,
        }) => Delivery::Broadcast(OutboundMessage::StreamMetadata(StreamAnnouncement {
            client_id: sender,
            stream_id,
            stream_type,
        })),

        InboundMessage::ScreenShareStarted => {
            Delivery::Broadcast(OutboundMessage::ScreenShareStarted(ClientRef {
                client_id: sender,
            }))
        }

        InboundMessage::ScreenShareStopped => {
            Delivery::Broadcast(OutboundMessage::ScreenShareStopped(ClientRef {
                client_id: sender,
            }))
        }
    }
}

fn unicast(target: Option<String>, message: OutboundMessage) -> Delivery {
    match target.as_deref().map(str::parse::<PeerId>) {
        Some(Ok(target)) => Delivery::Unicast { target, message },
        _ => Delivery::Discard,
    }
}
