use crate::error::SessionError;
use crate::signaling::SignalingSink;
use anyhow::{Context, Result};
use async_trait::async_trait;
use duet_core::SignalMessage;
use futures::{SinkExt, StreamExt};
use std::sync::Mutex;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

/// Relay connection over a WebSocket.
///
/// Writes go through an unbounded queue drained by a writer task, reads are
/// parsed by a reader task and delivered in arrival order.
pub struct WsSignaling {
    outbound: Mutex<Option<mpsc::UnboundedSender<Message>>>,
}

impl WsSignaling {
    /// Connects to the relay and returns the sink plus the stream of
    /// inbound envelopes. The stream ends when the socket closes.
    pub async fn connect(url: &str) -> Result<(Self, mpsc::UnboundedReceiver<SignalMessage>)> {
        let (socket, _) = connect_async(url)
            .await
            .with_context(|| format!("Failed to connect to relay at {}", url))?;
        info!("Connected to relay {}", url);

        let (mut sender, mut receiver) = socket.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();
        let (in_tx, in_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let closing = matches!(msg, Message::Close(_));
                if let Err(e) = sender.send(msg).await {
                    warn!("Relay write failed: {}", e);
                    break;
                }
                if closing {
                    break;
                }
            }
            let _ = sender.close().await;
        });

        tokio::spawn(async move {
            while let Some(frame) = receiver.next().await {
                match frame {
                    Ok(Message::Text(text)) => match SignalMessage::from_json(&text) {
                        Ok(signal) => {
                            if in_tx.send(signal).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Invalid SignalMessage from relay: {}", e),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        error!("Relay read failed: {}", e);
                        break;
                    }
                }
            }
            debug!("Relay reader finished");
        });

        Ok((
            Self {
                outbound: Mutex::new(Some(out_tx)),
            },
            in_rx,
        ))
    }
}

#[async_trait]
impl SignalingSink for WsSignaling {
    async fn send(&self, msg: SignalMessage) -> Result<(), SessionError> {
        let json = msg
            .to_json()
            .map_err(|e| SessionError::SignalingTransportLost(e.to_string()))?;

        let outbound = self
            .outbound
            .lock()
            .map_err(|_| SessionError::SignalingTransportLost("sink poisoned".to_owned()))?;

        match outbound.as_ref() {
            Some(tx) => tx
                .send(Message::Text(json.into()))
                .map_err(|_| SessionError::SignalingTransportLost("socket closed".to_owned())),
            None => Err(SessionError::SignalingTransportLost(
                "disconnected".to_owned(),
            )),
        }
    }

    async fn close(&self) {
        let Ok(mut outbound) = self.outbound.lock() else {
            return;
        };
        if let Some(tx) = outbound.take() {
            let _ = tx.send(Message::Close(None));
            info!("Disconnected from relay");
        }
    }
}
