use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Types a browser peer may send. Anything else is reported as
/// [`DecodeError::UnknownType`] and skipped by the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InboundKind {
    Data,
    Offer,
    Answer,
    IceCandidate,
    TrackMuted,
    TrackUnmuted,
    StreamMetadata,
    ScreenShareStarted,
    ScreenShareStopped,
}

impl InboundKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InboundKind::Data => "data",
            InboundKind::Offer => "offer",
            InboundKind::Answer => "answer",
            InboundKind::IceCandidate => "iceCandidate",
            InboundKind::TrackMuted => "trackMuted",
            InboundKind::TrackUnmuted => "trackUnmuted",
            InboundKind::StreamMetadata => "streamMetadata",
            InboundKind::ScreenShareStarted => "screenShareStarted",
            InboundKind::ScreenShareStopped => "screenShareStopped",
        }
    }
}

impl FromStr for InboundKind {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "data" => InboundKind::Data,
            "offer" => InboundKind::Offer,
            "answer" => InboundKind::Answer,
            "iceCandidate" => InboundKind::IceCandidate,
            "trackMuted" => InboundKind::TrackMuted,
            "trackUnmuted" => InboundKind::TrackUnmuted,
            "streamMetadata" => InboundKind::StreamMetadata,
            "screenShareStarted" => InboundKind::ScreenShareStarted,
            "screenShareStopped" => InboundKind::ScreenShareStopped,
            _ => return Err(DecodeError::UnknownType(s.to_owned())),
        };
        Ok(kind)
    }
}

impl fmt::Display for InboundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame is not a message envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("unknown message type '{0}'")]
    UnknownType(String),

    #[error("malformed '{kind}' payload: {source}")]
    Payload {
        kind: InboundKind,
        #[source]
        source: serde_json::Error,
    },
}

/// First decoding phase: the type tag plus an uninterpreted payload.
#[derive(Debug, Deserialize)]
pub struct InboundEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

impl InboundEnvelope {
    pub fn parse(frame: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(frame).map_err(DecodeError::Envelope)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub sdp_type: String,
    pub sdp: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataPayload {
    pub message: String,
}

/// Offer or answer addressed to a single peer.
///
/// Browsers name the target in `clientId`; newer clients send `targetClientId`
/// and may echo their own id in `clientId`. The explicit target always wins.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDescriptionPayload {
    pub message_id: String,
    pub target_client_id: Option<String>,
    pub client_id: Option<String>,
    pub value: SessionDescription,
}

impl SessionDescriptionPayload {
    pub fn target(&self) -> Option<&str> {
        self.target_client_id.as_deref().or(self.client_id.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidatePayload {
    pub message_id: String,
    pub target_client_id: Option<String>,
    pub client_id: Option<String>,
    pub value: Map<String, Value>,
}

impl IceCandidatePayload {
    pub fn target(&self) -> Option<&str> {
        self.target_client_id.as_deref().or(self.client_id.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPayload {
    pub track_kind: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    Media,
    Screen,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamMetadataPayload {
    pub stream_id: String,
    pub stream_type: StreamType,
}

/// Second decoding phase: a fully typed inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// The validated payload, kept verbatim for pass-through.
    Data(Value),
    Offer(SessionDescriptionPayload),
    Answer(SessionDescriptionPayload),
    IceCandidate(IceCandidatePayload),
    TrackMuted(TrackPayload),
    TrackUnmuted(TrackPayload),
    StreamMetadata(StreamMetadataPayload),
    ScreenShareStarted,
    ScreenShareStopped,
}

impl InboundMessage {
    pub fn from_envelope(envelope: InboundEnvelope) -> Result<Self, DecodeError> {
        let kind: InboundKind = envelope.kind.parse()?;
        let payload = envelope.payload;

        let message = match kind {
            InboundKind::Data => {
                DataPayload::deserialize(&payload)
                    .map_err(|source| DecodeError::Payload { kind, source })?;
                InboundMessage::Data(payload)
            }
            InboundKind::Offer => {
                let offer: SessionDescriptionPayload = typed(kind, payload)?;
                require_target(kind, offer.target())?;
                InboundMessage::Offer(offer)
            }
            InboundKind::Answer => {
                let answer: SessionDescriptionPayload = typed(kind, payload)?;
                require_target(kind, answer.target())?;
                InboundMessage::Answer(answer)
            }
            InboundKind::IceCandidate => {
                let candidate: IceCandidatePayload = typed(kind, payload)?;
                require_target(kind, candidate.target())?;
                InboundMessage::IceCandidate(candidate)
            }
            InboundKind::TrackMuted => InboundMessage::TrackMuted(typed(kind, payload)?),
            InboundKind::TrackUnmuted => InboundMessage::TrackUnmuted(typed(kind, payload)?),
            InboundKind::StreamMetadata => InboundMessage::StreamMetadata(typed(kind, payload)?),
            InboundKind::ScreenShareStarted => InboundMessage::ScreenShareStarted,
            InboundKind::ScreenShareStopped => InboundMessage::ScreenShareStopped,
        };
        Ok(message)
    }

    pub fn kind(&self) -> InboundKind {
        match self {
            InboundMessage::Data(_) => InboundKind::Data,
            InboundMessage::Offer(_) => InboundKind::Offer,
            InboundMessage::Answer(_) => InboundKind::Answer,
            InboundMessage::IceCandidate(_) => InboundKind::IceCandidate,
            InboundMessage::TrackMuted(_) => InboundKind::TrackMuted,
            InboundMessage::TrackUnmuted(_) => InboundKind::TrackUnmuted,
            InboundMessage::StreamMetadata(_) => InboundKind::StreamMetadata,
            InboundMessage::ScreenShareStarted => InboundKind::ScreenShareStarted,
            InboundMessage::ScreenShareStopped => InboundKind::ScreenShareStopped,
        }
    }
}

fn typed<T: DeserializeOwned>(kind: InboundKind, payload: Value) -> Result<T, DecodeError> {
    serde_json::from_value(payload).map_err(|source| DecodeError::Payload { kind, source })
}

fn require_target(kind: InboundKind, target: Option<&str>) -> Result<(), DecodeError> {
    match target {
        Some(_) => Ok(()),
        None => Err(DecodeError::Payload {
            kind,
            source: de::Error::missing_field("targetClientId"),
        }),
    }
}

/// Decode one text frame: envelope first, payload only once the type is known.
pub fn decode(frame: &str) -> Result<InboundMessage, DecodeError> {
    InboundMessage::from_envelope(InboundEnvelope::parse(frame)?)
}
