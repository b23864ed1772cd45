use duet_core::{PeerId, RoomId, SignalMessage};

use crate::integration::{create_test_relay, init_tracing, spawn_test_server};
use crate::utils::WsTestClient;

#[tokio::test]
async fn test_socket_close_emits_peer_left() {
    init_tracing();

    let (addr, state) = spawn_test_server().await;

    let mut a = WsTestClient::connect(addr).await.unwrap();
    let mut b = WsTestClient::connect(addr).await.unwrap();
    let b_id = b.peer_id;

    a.join("R1").await.unwrap();
    b.join("R1").await.unwrap();
    a.recv().await.unwrap();
    b.recv().await.unwrap();

    a.close().await.unwrap();

    assert_eq!(b.recv().await.unwrap(), SignalMessage::PeerLeft);
    assert_eq!(
        state.relay.registry().participants(&RoomId::from("R1")),
        vec![b_id]
    );
}

#[tokio::test]
async fn test_explicit_leave_emits_peer_left_once() {
    init_tracing();

    let (relay, signaling) = create_test_relay();
    let (a, b) = (PeerId::new(), PeerId::new());

    relay.join(a, "R1".into()).await;
    relay.join(b, "R1".into()).await;

    relay
        .handle(
            a,
            SignalMessage::Leave {
                room_id: "R1".into(),
            },
        )
        .await;
    // transport closing afterwards must not announce a second departure
    relay.disconnect(a).await;

    let to_b = signaling.signals_for(&b).await;
    assert_eq!(to_b.len(), 2);
    assert_eq!(to_b[1], SignalMessage::PeerLeft);
}

#[tokio::test]
async fn test_lonely_departure_is_silent() {
    init_tracing();

    let (relay, signaling) = create_test_relay();
    let a = PeerId::new();

    relay.join(a, "R1".into()).await;
    relay.disconnect(a).await;

    assert_eq!(signaling.total().await, 0);
    assert_eq!(relay.registry().room_count(), 0);
}

#[tokio::test]
async fn test_switching_rooms_leaves_the_old_one() {
    init_tracing();

    let (relay, signaling) = create_test_relay();
    let (a, b) = (PeerId::new(), PeerId::new());

    relay.join(a, "R1".into()).await;
    relay.join(b, "R1".into()).await;
    relay.join(b, "R2".into()).await;

    assert_eq!(
        signaling.signals_for(&a).await.last(),
        Some(&SignalMessage::PeerLeft)
    );
    assert_eq!(relay.room_of(&b), Some(RoomId::from("R2")));
    assert_eq!(relay.registry().participants(&"R1".into()), vec![a]);
}
