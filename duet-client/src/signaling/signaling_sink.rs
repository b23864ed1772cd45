use crate::error::SessionError;
use async_trait::async_trait;
use duet_core::SignalMessage;

/// Outbound half of the client's relay connection.
#[async_trait]
pub trait SignalingSink: Send + Sync {
    async fn send(&self, msg: SignalMessage) -> Result<(), SessionError>;

    /// Disconnects from the relay. Idempotent.
    async fn close(&self);
}
