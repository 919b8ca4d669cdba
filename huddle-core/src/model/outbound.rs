use crate::model::inbound::{SessionDescription, StreamType};
use crate::model::peer::PeerId;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterEntry {
    pub id: PeerId,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitPayload {
    pub clients: Vec<RosterEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientJoinedPayload {
    pub client_id: PeerId,
    pub username: String,
}

/// Payload that only names the peer an event is about.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRef {
    pub client_id: PeerId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayedDescription {
    pub message_id: String,
    pub client_id: PeerId,
    pub value: SessionDescription,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayedIceCandidate {
    pub message_id: String,
    pub client_id: PeerId,
    pub value: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackState {
    pub client_id: PeerId,
    pub track_kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamAnnouncement {
    pub client_id: PeerId,
    pub stream_id: String,
    pub stream_type: StreamType,
}

/// Server-to-peer message. `clientId` fields are always stamped by the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum OutboundMessage {
    #[serde(rename = "init")]
    Init(InitPayload),
    #[serde(rename = "client_joined")]
    ClientJoined(ClientJoinedPayload),
    #[serde(rename = "client_left")]
    ClientLeft(ClientRef),
    #[serde(rename = "offer")]
    Offer(RelayedDescription),
    #[serde(rename = "answer")]
    Answer(RelayedDescription),
    #[serde(rename = "data")]
    Data(Value),
    #[serde(rename = "iceCandidate")]
    IceCandidate(RelayedIceCandidate),
    #[serde(rename = "trackMuted")]
    TrackMuted(TrackState),
    #[serde(rename = "trackUnmuted")]
    TrackUnmuted(TrackState),
    #[serde(rename = "streamMetadata")]
    StreamMetadata(StreamAnnouncement),
    #[serde(rename = "screenShareStarted")]
    ScreenShareStarted(ClientRef),
    #[serde(rename = "screenShareStopped")]
    ScreenShareStopped(ClientRef),
}

impl OutboundMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            OutboundMessage::Init(_) => "init",
            OutboundMessage::ClientJoined(_) => "client_joined",
            OutboundMessage::ClientLeft(_) => "client_left",
            OutboundMessage::Offer(_) => "offer",
            OutboundMessage::Answer(_) => "answer",
            OutboundMessage::Data(_) => "data",
            OutboundMessage::IceCandidate(_) => "iceCandidate",
            OutboundMessage::TrackMuted(_) => "trackMuted",
            OutboundMessage::TrackUnmuted(_) => "trackUnmuted",
            OutboundMessage::StreamMetadata(_) => "streamMetadata",
            OutboundMessage::ScreenShareStarted(_) => "screenShareStarted",
            OutboundMessage::ScreenShareStopped(_) => "screenShareStopped",
        }
    }
}
