use crate::room::{JoinError, Room};
use dashmap::DashMap;
use duet_core::{PeerId, RoomId};
use std::sync::Arc;
use tracing::{debug, info};

/// Result of a successful join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// First participant; stays unassigned until somebody else arrives.
    Anchored,
    /// Second participant arrived: the anchor calls, the newcomer answers.
    Paired { caller: PeerId, callee: PeerId },
}

/// Room id → participants.
///
/// Every mutation of a room happens under that room's map entry guard, so a
/// join and a departure on the same room are serialized.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<RoomId, Room>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&self, room_id: &RoomId, peer_id: PeerId) -> Result<JoinOutcome, JoinError> {
        let mut room = self.rooms.entry(room_id.clone()).or_default();

        if room.contains(&peer_id) {
            return Err(JoinError::AlreadyInRoom(room_id.clone()));
        }
        if room.is_full() {
            return Err(JoinError::RoomFull(room_id.clone()));
        }

        room.push(peer_id);

        match room.participants() {
            [anchor, newcomer] => {
                info!(
                    "Room '{}' paired: caller {} / callee {}",
                    room_id, anchor, newcomer
                );
                Ok(JoinOutcome::Paired {
                    caller: *anchor,
                    callee: *newcomer,
                })
            }
            _ => {
                info!("Room '{}' anchored by {}", room_id, peer_id);
                Ok(JoinOutcome::Anchored)
            }
        }
    }

    /// Removes `peer_id` from the room and returns whoever is still in it.
    pub fn leave(&self, room_id: &RoomId, peer_id: &PeerId) -> Option<PeerId> {
        let remaining = {
            let mut room = self.rooms.get_mut(room_id)?;
            if !room.remove(peer_id) {
                debug!("Peer {} was not in room '{}'", peer_id, room_id);
                return None;
            }
            room.participants().first().copied()
        };

        if self.rooms.remove_if(room_id, |_, room| room.is_empty()).is_some() {
            info!("Room '{}' is empty, dropping it", room_id);
        }

        remaining
    }

    /// The other participant of `room_id`, if `peer_id` is in it and is not alone.
    pub fn peer_of(&self, room_id: &RoomId, peer_id: &PeerId) -> Option<PeerId> {
        self.rooms.get(room_id)?.other(peer_id)
    }

    pub fn participants(&self, room_id: &RoomId) -> Vec<PeerId> {
        self.rooms
            .get(room_id)
            .map(|room| room.participants().to_vec())
            .unwrap_or_default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
