use duet_core::SignalError;
use thiserror::Error;

/// Everything that can go wrong inside one call.
///
/// Media and transport failures reach the UI through
/// [`SessionUpdate::Error`](crate::SessionUpdate); ordering problems are
/// logged and absorbed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("local media unavailable: {0}")]
    MediaAccessDenied(String),

    #[error("signaling transport lost: {0}")]
    SignalingTransportLost(String),

    #[error("'{event}' is not valid while {state}")]
    InvalidNegotiationState { state: String, event: String },

    #[error("failed to apply ICE candidate: {0}")]
    IceApplyFailure(String),

    #[error("peer connection error: {0}")]
    PeerConnection(String),

    #[error("relay refused: {0}")]
    Rejected(SignalError),
}

impl SessionError {
    /// Whether the user should be told about it.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            SessionError::MediaAccessDenied(_)
                | SessionError::SignalingTransportLost(_)
                | SessionError::PeerConnection(_)
                | SessionError::Rejected(_)
        )
    }
}
