use crate::error::SessionError;
use crate::media::SessionDescription;
use crate::negotiation::{NegotiationEvent, NegotiationState};
use duet_core::{IceCandidate, Role};

/// A side effect the session driver performs, in order, for a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SendJoin,
    /// No-op when local media is already held.
    AcquireLocalMedia,
    CreatePeerConnection,
    AttachLocalTracks,
    CreateOffer,
    CreateAnswer,
    /// Applies the description produced by the preceding create step.
    SetLocalDescription,
    /// Relays the description produced by the preceding create step.
    SendLocalDescription,
    ApplyRemoteDescription(SessionDescription),
    DrainCandidates,
    BufferCandidate(IceCandidate),
    ApplyCandidate(IceCandidate),
    SendCandidate(IceCandidate),
    ClosePeerConnection,
    ClearRemoteMedia,
    ClearCandidates,
    ReleaseLocalMedia,
    Disconnect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: NegotiationState,
    pub actions: Vec<Action>,
}

impl Transition {
    fn to(next: NegotiationState, actions: Vec<Action>) -> Self {
        Self { next, actions }
    }

    fn stay(state: NegotiationState, actions: Vec<Action>) -> Self {
        Self::to(state, actions)
    }
}

fn prepare_peer() -> Vec<Action> {
    vec![
        Action::AcquireLocalMedia,
        Action::CreatePeerConnection,
        Action::AttachLocalTracks,
    ]
}

fn offer_steps() -> Vec<Action> {
    vec![
        Action::CreateOffer,
        Action::SetLocalDescription,
        Action::SendLocalDescription,
    ]
}

fn answer_steps(offer: &str) -> Vec<Action> {
    vec![
        Action::ApplyRemoteDescription(SessionDescription::offer(offer)),
        Action::DrainCandidates,
        Action::CreateAnswer,
        Action::SetLocalDescription,
        Action::SendLocalDescription,
    ]
}

fn drop_peer() -> Vec<Action> {
    vec![
        Action::ClosePeerConnection,
        Action::ClearRemoteMedia,
        Action::ClearCandidates,
    ]
}

fn teardown() -> Vec<Action> {
    let mut actions = drop_peer();
    actions.extend([Action::ReleaseLocalMedia, Action::Disconnect]);
    actions
}

/// The whole negotiation protocol as one pure function.
///
/// Returns the next state plus the effects to run, or
/// [`SessionError::InvalidNegotiationState`] when the event must be discarded
/// without touching anything.
pub fn apply(
    state: NegotiationState,
    event: &NegotiationEvent,
) -> Result<Transition, SessionError> {
    use NegotiationEvent as E;
    use NegotiationState as S;

    let transition = match (state, event) {
        (S::Closed, _) => return Err(reject(state, event)),

        (_, E::Hangup | E::TransportLost | E::MediaUnavailable) => {
            Transition::to(S::Closed, teardown())
        }

        (S::Idle, E::JoinRequested) => Transition::to(S::AwaitingRole, vec![Action::SendJoin]),

        (S::Idle | S::AwaitingRole, E::RoleAssigned(Role::Caller)) => {
            let mut actions = prepare_peer();
            actions.extend(offer_steps());
            Transition::to(S::CreatingOffer, actions)
        }
        (S::Idle | S::AwaitingRole, E::RoleAssigned(Role::Callee)) => {
            Transition::to(S::AwaitingOffer, prepare_peer())
        }
        // A fresh pairing overtook a negotiation that never got going.
        (S::AwaitingOffer | S::OfferSent, E::RoleAssigned(role)) => {
            let mut actions = drop_peer();
            actions.extend(prepare_peer());
            match role {
                Role::Caller => {
                    actions.extend(offer_steps());
                    Transition::to(S::CreatingOffer, actions)
                }
                Role::Callee => Transition::to(S::AwaitingOffer, actions),
            }
        }

        (S::CreatingOffer, E::OfferDispatched) => Transition::to(S::OfferSent, Vec::new()),

        (S::AwaitingOffer, E::OfferReceived(sdp)) => {
            Transition::to(S::AnswerSent, answer_steps(sdp))
        }
        // Role assignment not seen yet but the caller already offered.
        (S::AwaitingRole, E::OfferReceived(sdp)) => {
            let mut actions = prepare_peer();
            actions.extend(answer_steps(sdp));
            Transition::to(S::AnswerSent, actions)
        }

        (S::OfferSent, E::AnswerReceived(sdp)) => Transition::to(
            S::Connected,
            vec![
                Action::ApplyRemoteDescription(SessionDescription::answer(sdp)),
                Action::DrainCandidates,
            ],
        ),

        (S::AnswerSent, E::PeerConnected) => Transition::to(S::Connected, Vec::new()),
        (S::Connected, E::PeerConnected) => Transition::stay(state, Vec::new()),

        (s, E::RemoteCandidate(candidate)) if s.has_remote_description() => {
            Transition::stay(state, vec![Action::ApplyCandidate(candidate.clone())])
        }
        (
            S::AwaitingRole | S::AwaitingOffer | S::CreatingOffer | S::OfferSent,
            E::RemoteCandidate(candidate),
        ) => Transition::stay(state, vec![Action::BufferCandidate(candidate.clone())]),

        (s, E::LocalCandidate(candidate)) if s.has_peer_connection() => {
            Transition::stay(state, vec![Action::SendCandidate(candidate.clone())])
        }

        (s, E::PeerLeft | E::NegotiationFailed) if s.has_peer_connection() => {
            Transition::to(S::Idle, drop_peer())
        }
        // Alone in the room, nothing negotiated yet: only forget stray candidates.
        (S::AwaitingRole, E::PeerLeft) => {
            Transition::to(S::Idle, vec![Action::ClearCandidates])
        }

        _ => return Err(reject(state, event)),
    };

    Ok(transition)
}

fn reject(state: NegotiationState, event: &NegotiationEvent) -> SessionError {
    SessionError::InvalidNegotiationState {
        state: state.to_string(),
        event: event.name().to_owned(),
    }
}
