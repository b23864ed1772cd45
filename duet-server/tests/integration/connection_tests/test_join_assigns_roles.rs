use duet_core::{PeerId, Role, SignalMessage};

use crate::integration::{create_test_relay, init_tracing, spawn_test_server};
use crate::utils::WsTestClient;

#[tokio::test]
async fn test_anchor_waits_until_second_join() {
    init_tracing();

    let (relay, signaling) = create_test_relay();
    let (a, b) = (PeerId::new(), PeerId::new());

    relay.join(a, "R1".into()).await;
    assert_eq!(signaling.total().await, 0, "anchor must not get a role alone");

    relay.join(b, "R1".into()).await;

    assert_eq!(
        signaling.signals_for(&a).await,
        vec![SignalMessage::RoleAssignment { role: Role::Caller }]
    );
    assert_eq!(
        signaling.signals_for(&b).await,
        vec![SignalMessage::RoleAssignment { role: Role::Callee }]
    );
}

#[tokio::test]
async fn test_roles_over_websocket() {
    init_tracing();

    let (addr, _state) = spawn_test_server().await;

    let mut a = WsTestClient::connect(addr).await.expect("connect a");
    let mut b = WsTestClient::connect(addr).await.expect("connect b");

    assert_eq!(a.ice_servers[0].username.as_deref(), Some("user"));
    assert_ne!(a.peer_id, b.peer_id);

    a.join("R1").await.unwrap();
    assert!(a.is_silent().await);

    b.join("R1").await.unwrap();

    assert_eq!(
        a.recv().await.unwrap(),
        SignalMessage::RoleAssignment { role: Role::Caller }
    );
    assert_eq!(
        b.recv().await.unwrap(),
        SignalMessage::RoleAssignment { role: Role::Callee }
    );
}

#[tokio::test]
async fn test_rejoining_same_room_is_ignored() {
    init_tracing();

    let (relay, signaling) = create_test_relay();
    let (a, b) = (PeerId::new(), PeerId::new());

    relay.join(a, "R1".into()).await;
    relay.join(b, "R1".into()).await;
    relay.join(b, "R1".into()).await;

    assert_eq!(signaling.signals_for(&b).await.len(), 1);
    assert_eq!(relay.registry().participants(&"R1".into()), vec![a, b]);
}
