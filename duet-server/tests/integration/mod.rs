
use std::net::SocketAddr;
use std::sync::Arc;

use duet_core::IceServerConfig;
use duet_server::{AppState, RoomRegistry, SignalingRelay, router};
use tokio::net::TcpListener;
use tracing::Level;

use crate::utils::MockSignalingOutput;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn create_test_relay() -> (SignalingRelay, MockSignalingOutput) {
    let (signaling, _rx) = MockSignalingOutput::new();
    let relay = SignalingRelay::new(RoomRegistry::new(), Arc::new(signaling.clone()));
    (relay, signaling)
}

/// Serves the real router on an ephemeral port.
pub async fn spawn_test_server() -> (SocketAddr, Arc<AppState>) {
    let state = AppState::new(vec![IceServerConfig::turn(
        "turn:127.0.0.1:3478",
        "user",
        "pass",
    )]);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local addr");
    let app = router(state.clone());

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, state)
}
