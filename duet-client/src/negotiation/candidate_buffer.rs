use duet_core::IceCandidate;
use std::collections::VecDeque;

/// Remote candidates that arrived before any remote description was set.
///
/// FIFO and unbounded: a call gathers a handful of candidates at most.
#[derive(Debug, Default)]
pub struct IceCandidateBuffer {
    pending: VecDeque<IceCandidate>,
}

impl IceCandidateBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, candidate: IceCandidate) {
        self.pending.push_back(candidate);
    }

    /// Hands out every buffered candidate in arrival order and empties the
    /// buffer, but only once a remote description is in place. Otherwise
    /// returns nothing and keeps the buffer intact.
    pub fn drain_if_ready(&mut self, remote_description_set: bool) -> Vec<IceCandidate> {
        if !remote_description_set {
            return Vec::new();
        }
        self.pending.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
