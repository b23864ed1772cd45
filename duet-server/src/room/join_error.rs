use duet_core::{RoomId, SignalError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JoinError {
    #[error("room '{0}' already holds two participants")]
    RoomFull(RoomId),

    #[error("peer is already a member of room '{0}'")]
    AlreadyInRoom(RoomId),
}

impl JoinError {
    /// Wire reason reported back to the rejected client, if any.
    pub fn signal_error(&self) -> Option<SignalError> {
        match self {
            JoinError::RoomFull(_) => Some(SignalError::RoomFull),
            JoinError::AlreadyInRoom(_) => None,
        }
    }
}
