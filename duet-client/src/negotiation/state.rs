use std::fmt;

/// Where a call is in the offer/answer exchange.
///
/// `Idle` also covers "joined, but the other peer left"; a fresh role
/// assignment restarts negotiation from there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NegotiationState {
    Idle,
    AwaitingRole,
    CreatingOffer,
    OfferSent,
    AwaitingOffer,
    AnswerSent,
    Connected,
    Closed,
}

impl NegotiationState {
    /// A remote description has been applied to the current peer connection.
    pub fn has_remote_description(self) -> bool {
        matches!(self, NegotiationState::AnswerSent | NegotiationState::Connected)
    }

    /// A peer connection object exists in this state.
    pub fn has_peer_connection(self) -> bool {
        matches!(
            self,
            NegotiationState::CreatingOffer
                | NegotiationState::OfferSent
                | NegotiationState::AwaitingOffer
                | NegotiationState::AnswerSent
                | NegotiationState::Connected
        )
    }

    pub fn is_closed(self) -> bool {
        self == NegotiationState::Closed
    }
}

impl fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NegotiationState::Idle => "idle",
            NegotiationState::AwaitingRole => "awaiting-role",
            NegotiationState::CreatingOffer => "creating-offer",
            NegotiationState::OfferSent => "offer-sent",
            NegotiationState::AwaitingOffer => "awaiting-offer",
            NegotiationState::AnswerSent => "answer-sent",
            NegotiationState::Connected => "connected",
            NegotiationState::Closed => "closed",
        };
        f.write_str(name)
    }
}
