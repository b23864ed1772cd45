use duet_core::PeerId;

/// Participants of one call, in join order. Never more than [`Room::CAPACITY`].
#[derive(Debug, Default, Clone)]
pub struct Room {
    participants: Vec<PeerId>,
}

impl Room {
    pub const CAPACITY: usize = 2;

    pub fn participants(&self) -> &[PeerId] {
        &self.participants
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.participants.contains(peer_id)
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() >= Self::CAPACITY
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// The participant on the other end of the call from `peer_id`.
    pub fn other(&self, peer_id: &PeerId) -> Option<PeerId> {
        if !self.contains(peer_id) {
            return None;
        }
        self.participants.iter().find(|p| *p != peer_id).copied()
    }

    pub(crate) fn push(&mut self, peer_id: PeerId) {
        debug_assert!(!self.is_full());
        self.participants.push(peer_id);
    }

    pub(crate) fn remove(&mut self, peer_id: &PeerId) -> bool {
        let Some(idx) = self.participants.iter().position(|p| p == peer_id) else {
            return false;
        };
        self.participants.remove(idx);
        true
    }
}
