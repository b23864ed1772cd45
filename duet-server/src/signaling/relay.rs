use crate::room::{JoinError, JoinOutcome, RoomRegistry};
use crate::signaling::SignalingOutput;
use dashmap::DashMap;
use duet_core::{PeerId, Role, RoomId, SignalError, SignalMessage};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Routes envelopes between the two sockets of a room.
///
/// Holds no negotiation state. `memberships` is only ever written from the
/// owning peer's connection task, so it needs no coordination beyond the map.
#[derive(Clone)]
pub struct SignalingRelay {
    registry: RoomRegistry,
    memberships: Arc<DashMap<PeerId, RoomId>>,
    output: Arc<dyn SignalingOutput>,
}

impl SignalingRelay {
    pub fn new(registry: RoomRegistry, output: Arc<dyn SignalingOutput>) -> Self {
        Self {
            registry,
            memberships: Arc::new(DashMap::new()),
            output,
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn room_of(&self, peer_id: &PeerId) -> Option<RoomId> {
        self.memberships.get(peer_id).map(|room| room.clone())
    }

    /// Entry point for every envelope read off a client socket.
    pub async fn handle(&self, peer_id: PeerId, msg: SignalMessage) {
        match msg {
            SignalMessage::Join { room_id } => self.join(peer_id, room_id).await,
            SignalMessage::Leave { room_id } => {
                if self.room_of(&peer_id).as_ref() != Some(&room_id) {
                    warn!("Peer {} asked to leave '{}' without being in it", peer_id, room_id);
                    return;
                }
                self.leave(peer_id).await;
            }
            msg @ (SignalMessage::Offer { .. }
            | SignalMessage::Answer { .. }
            | SignalMessage::IceCandidate { .. }
            | SignalMessage::Chat { .. }) => self.relay(peer_id, msg).await,
            other => warn!("Ignoring server-only {} envelope from {}", other.kind(), peer_id),
        }
    }

    /// The current room is only left once the new one has accepted the peer.
    pub async fn join(&self, peer_id: PeerId, room_id: RoomId) {
        let current = self.room_of(&peer_id);
        if current.as_ref() == Some(&room_id) {
            debug!("Peer {} re-joined '{}', ignoring", peer_id, room_id);
            return;
        }

        match self.registry.join(&room_id, peer_id) {
            Ok(outcome) => {
                if let Some(current) = current {
                    info!("Peer {} moves from '{}' to '{}'", peer_id, current, room_id);
                    self.leave(peer_id).await;
                }
                self.memberships.insert(peer_id, room_id.clone());

                if let JoinOutcome::Paired { caller, callee } = outcome {
                    self.announce_roles(&room_id, caller, callee).await;
                }
            }
            Err(e) => {
                warn!("Join from {} rejected: {}", peer_id, e);
                if let Some(reason) = e.signal_error() {
                    self.output.send_error(peer_id, reason).await;
                }
                if let JoinError::AlreadyInRoom(room_id) = e {
                    self.memberships.insert(peer_id, room_id);
                }
            }
        }
    }

    /// Roles go out after the room guard is released, so a departure may
    /// slip in between; each role is only sent while the pair still stands.
    async fn announce_roles(&self, room_id: &RoomId, caller: PeerId, callee: PeerId) {
        for (peer_id, role) in [(caller, Role::Caller), (callee, Role::Callee)] {
            if self.registry.peer_of(room_id, &callee) != Some(caller) {
                info!(
                    "Pair {} / {} in '{}' broke up, {} role not sent",
                    caller, callee, room_id, role
                );
                return;
            }
            self.output.send_role(peer_id, role).await;
        }
    }

    /// Forwards `msg` to the other participant of the sender's room.
    pub async fn relay(&self, sender: PeerId, mut msg: SignalMessage) {
        let Some(room_id) = self.room_of(&sender) else {
            warn!("Dropping {} from {}: not in any room", msg.kind(), sender);
            self.output.send_error(sender, SignalError::NotInRoom).await;
            return;
        };

        if msg.room_id() != Some(&room_id) {
            warn!(
                "Dropping {} from {}: claims room {:?}, member of '{}'",
                msg.kind(),
                sender,
                msg.room_id(),
                room_id
            );
            self.output.send_error(sender, SignalError::NotInRoom).await;
            return;
        }

        if let SignalMessage::Chat { message, .. } = &mut msg {
            if message.from.is_empty() {
                message.from = sender.to_string();
            }
        }

        let Some(target) = self.registry.peer_of(&room_id, &sender) else {
            debug!("No peer in '{}' yet, {} from {} dropped", room_id, msg.kind(), sender);
            return;
        };

        debug!("Relaying {} {} -> {}", msg.kind(), sender, target);
        self.output.send_signal(target, msg).await;
    }

    /// Removes the peer from its room and tells whoever stays behind.
    pub async fn leave(&self, peer_id: PeerId) {
        let Some((_, room_id)) = self.memberships.remove(&peer_id) else {
            return;
        };

        info!("Peer {} left room '{}'", peer_id, room_id);

        if let Some(remaining) = self.registry.leave(&room_id, &peer_id) {
            self.output.send_peer_left(remaining).await;
        }
    }

    /// Transport closed: same as an explicit leave.
    pub async fn disconnect(&self, peer_id: PeerId) {
        self.leave(peer_id).await;
    }
}
