use async_trait::async_trait;
use duet_core::{PeerId, Role, SignalError, SignalMessage};

/// Outbound half of the relay: pushes an envelope to one connected peer.
///
/// Implemented by the WebSocket service; tests swap in a recorder.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn send_signal(&self, peer_id: PeerId, msg: SignalMessage);

    async fn send_role(&self, peer_id: PeerId, role: Role) {
        self.send_signal(peer_id, SignalMessage::RoleAssignment { role })
            .await;
    }

    async fn send_peer_left(&self, peer_id: PeerId) {
        self.send_signal(peer_id, SignalMessage::PeerLeft).await;
    }

    async fn send_error(&self, peer_id: PeerId, reason: SignalError) {
        self.send_signal(peer_id, SignalMessage::Error { reason })
            .await;
    }
}
