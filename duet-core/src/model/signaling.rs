use crate::error::ProtocolError;
use crate::model::{ChatMessage, IceCandidate, IceServerConfig, PeerId, Role, RoomId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Envelope exchanged over the signaling socket.
///
/// Serialized as `{"type": "<kebab-case tag>", "payload": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum SignalMessage {
    Welcome {
        peer_id: PeerId,
    },
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    Join {
        room_id: RoomId,
    },
    Leave {
        room_id: RoomId,
    },
    RoleAssignment {
        role: Role,
    },
    Offer {
        room_id: RoomId,
        sdp: String,
    },
    Answer {
        room_id: RoomId,
        sdp: String,
    },
    IceCandidate {
        room_id: RoomId,
        candidate: IceCandidate,
    },
    Chat {
        room_id: RoomId,
        message: ChatMessage,
    },
    PeerLeft,
    Error {
        reason: SignalError,
    },
}

impl SignalMessage {
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Malformed)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Malformed)
    }

    /// Room the envelope claims to belong to, for envelopes that carry one.
    pub fn room_id(&self) -> Option<&RoomId> {
        match self {
            SignalMessage::Join { room_id }
            | SignalMessage::Leave { room_id }
            | SignalMessage::Offer { room_id, .. }
            | SignalMessage::Answer { room_id, .. }
            | SignalMessage::IceCandidate { room_id, .. }
            | SignalMessage::Chat { room_id, .. } => Some(room_id),
            _ => None,
        }
    }

    /// Short tag used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            SignalMessage::Welcome { .. } => "welcome",
            SignalMessage::IceConfig { .. } => "ice-config",
            SignalMessage::Join { .. } => "join",
            SignalMessage::Leave { .. } => "leave",
            SignalMessage::RoleAssignment { .. } => "role-assignment",
            SignalMessage::Offer { .. } => "offer",
            SignalMessage::Answer { .. } => "answer",
            SignalMessage::IceCandidate { .. } => "ice-candidate",
            SignalMessage::Chat { .. } => "chat",
            SignalMessage::PeerLeft => "peer-left",
            SignalMessage::Error { .. } => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SignalError {
    /// The room already holds two participants.
    RoomFull,
    /// A relayed envelope named a room the sender is not part of.
    NotInRoom,
}

impl fmt::Display for SignalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalError::RoomFull => f.write_str("room is full"),
            SignalError::NotInRoom => f.write_str("not a member of the room"),
        }
    }
}
