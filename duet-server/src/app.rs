use crate::config::ServerConfig;
use crate::room::RoomRegistry;
use crate::signaling::{SignalingRelay, SignalingService, ws_handler};
use crate::transport::TurnRelay;
use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use duet_core::IceServerConfig;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

pub struct AppState {
    pub signaling: SignalingService,
    pub relay: SignalingRelay,
}

impl AppState {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Arc<Self> {
        let signaling = SignalingService::new(ice_servers);
        let relay = SignalingRelay::new(RoomRegistry::new(), Arc::new(signaling.clone()));

        Arc::new(Self { signaling, relay })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

/// Runs the relay (and the embedded TURN server, if configured) until the
/// listener fails.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let turn = match &config.turn {
        Some(turn_config) => Some(TurnRelay::start(turn_config).await?),
        None => None,
    };

    let state = AppState::new(config.advertised_ice_servers());

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("Signaling relay listening on ws://{}/ws", config.listen_addr);

    let served = axum::serve(listener, router(state))
        .await
        .context("Signaling relay stopped");

    if let Some(turn) = turn {
        turn.close().await?;
    }

    served
}
