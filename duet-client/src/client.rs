use crate::config::ClientConfig;
use crate::media::{MediaEngine, WebRtcMediaEngine};
use crate::negotiation::{NegotiationSession, SessionCommand, SessionUpdate};
use crate::signaling::WsSignaling;
use anyhow::Result;
use duet_core::{ChatMessage, RoomId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

/// Handle to a running call.
///
/// The session itself runs on its own task; this side only sends commands
/// and reads updates.
pub struct DuetClient {
    room_id: RoomId,
    commands: mpsc::UnboundedSender<SessionCommand>,
    updates: mpsc::UnboundedReceiver<SessionUpdate>,
    task: JoinHandle<()>,
}

impl DuetClient {
    /// Joins `config.room_id` on the relay using the `webrtc` media engine.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        Self::connect_with(config, WebRtcMediaEngine::new()?).await
    }

    pub async fn connect_with<E>(config: ClientConfig, engine: E) -> Result<Self>
    where
        E: MediaEngine + 'static,
        E::Stream: 'static,
        E::Peer: 'static,
    {
        let (signaling, inbound) = WsSignaling::connect(&config.server_url).await?;
        let (updates_tx, updates) = mpsc::unbounded_channel();
        let (commands, commands_rx) = mpsc::unbounded_channel();

        let session = NegotiationSession::new(&config, engine, signaling, updates_tx);
        let task = tokio::spawn(session.run(inbound, commands_rx));
        info!("Joining room '{}' via {}", config.room_id, config.server_url);

        Ok(Self {
            room_id: config.room_id,
            commands,
            updates,
            task,
        })
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Returns false once the session has ended.
    pub fn send_chat(&self, text: Option<String>, image: Option<String>) -> bool {
        self.commands
            .send(SessionCommand::SendChat { text, image })
            .is_ok()
    }

    pub fn send_image(&self, bytes: &[u8]) -> bool {
        self.send_chat(None, Some(ChatMessage::encode_image(bytes)))
    }

    pub fn hangup(&self) {
        let _ = self.commands.send(SessionCommand::Hangup);
    }

    /// Next update from the session, `None` after it has finished.
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        self.updates.recv().await
    }

    /// Hangs up and waits for the session to finish its teardown.
    pub async fn close(self) {
        self.hangup();
        let _ = self.task.await;
    }
}
