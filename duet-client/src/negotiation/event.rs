use duet_core::{IceCandidate, Role};

/// Inputs of the negotiation state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationEvent {
    /// The session wants into its room.
    JoinRequested,
    RoleAssigned(Role),
    OfferReceived(String),
    /// The local offer left through the relay.
    OfferDispatched,
    AnswerReceived(String),
    RemoteCandidate(IceCandidate),
    LocalCandidate(IceCandidate),
    /// The peer connection reports an established transport.
    PeerConnected,
    PeerLeft,
    /// A peer-connection step failed mid-transition.
    NegotiationFailed,
    MediaUnavailable,
    TransportLost,
    Hangup,
}

impl NegotiationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            NegotiationEvent::JoinRequested => "join-requested",
            NegotiationEvent::RoleAssigned(_) => "role-assignment",
            NegotiationEvent::OfferReceived(_) => "offer",
            NegotiationEvent::OfferDispatched => "offer-dispatched",
            NegotiationEvent::AnswerReceived(_) => "answer",
            NegotiationEvent::RemoteCandidate(_) => "remote-candidate",
            NegotiationEvent::LocalCandidate(_) => "local-candidate",
            NegotiationEvent::PeerConnected => "peer-connected",
            NegotiationEvent::PeerLeft => "peer-left",
            NegotiationEvent::NegotiationFailed => "negotiation-failed",
            NegotiationEvent::MediaUnavailable => "media-unavailable",
            NegotiationEvent::TransportLost => "transport-lost",
            NegotiationEvent::Hangup => "hangup",
        }
    }
}
