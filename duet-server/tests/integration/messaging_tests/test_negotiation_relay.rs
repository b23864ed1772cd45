use duet_core::{IceCandidate, PeerId, RoomId, SignalError, SignalMessage};

use crate::integration::{create_test_relay, init_tracing, spawn_test_server};
use crate::utils::WsTestClient;

#[tokio::test]
async fn test_offer_answer_and_candidates_reach_the_other_side() {
    init_tracing();

    let (addr, _state) = spawn_test_server().await;

    let mut a = WsTestClient::connect(addr).await.unwrap();
    let mut b = WsTestClient::connect(addr).await.unwrap();

    a.join("R1").await.unwrap();
    b.join("R1").await.unwrap();
    a.recv().await.unwrap();
    b.recv().await.unwrap();

    let offer = SignalMessage::Offer {
        room_id: "R1".into(),
        sdp: "offer-sdp".into(),
    };
    let candidate = SignalMessage::IceCandidate {
        room_id: "R1".into(),
        candidate: IceCandidate::new("candidate:1 1 udp 1 10.0.0.1 5000 typ host"),
    };

    a.send(offer.clone()).await.unwrap();
    a.send(candidate.clone()).await.unwrap();

    // arrival order on one socket is preserved
    assert_eq!(b.recv().await.unwrap(), offer);
    assert_eq!(b.recv().await.unwrap(), candidate);

    let answer = SignalMessage::Answer {
        room_id: "R1".into(),
        sdp: "answer-sdp".into(),
    };
    b.send(answer.clone()).await.unwrap();

    assert_eq!(a.recv().await.unwrap(), answer);
    assert!(b.is_silent().await, "sender must not get its own envelope back");
}

#[tokio::test]
async fn test_relay_to_half_empty_room_is_noop() {
    init_tracing();

    let (relay, signaling) = create_test_relay();
    let a = PeerId::new();

    relay.join(a, "R1".into()).await;
    relay
        .relay(
            a,
            SignalMessage::Offer {
                room_id: "R1".into(),
                sdp: "v=0".into(),
            },
        )
        .await;

    assert_eq!(signaling.total().await, 0);
}

#[tokio::test]
async fn test_envelope_for_foreign_room_is_refused() {
    init_tracing();

    let (relay, signaling) = create_test_relay();
    let (a, b, c, d) = (PeerId::new(), PeerId::new(), PeerId::new(), PeerId::new());

    relay.join(a, "R1".into()).await;
    relay.join(b, "R1".into()).await;
    relay.join(c, "R2".into()).await;
    relay.join(d, "R2".into()).await;

    relay
        .relay(
            c,
            SignalMessage::Answer {
                room_id: RoomId::from("R1"),
                sdp: "stray".into(),
            },
        )
        .await;

    assert_eq!(signaling.signals_for(&a).await.len(), 1);
    assert_eq!(signaling.signals_for(&d).await.len(), 1);
    assert_eq!(
        signaling.signals_for(&c).await.last(),
        Some(&SignalMessage::Error {
            reason: SignalError::NotInRoom
        })
    );
}

#[tokio::test]
async fn test_server_only_envelopes_are_ignored() {
    init_tracing();

    let (relay, signaling) = create_test_relay();
    let (a, b) = (PeerId::new(), PeerId::new());

    relay.join(a, "R1".into()).await;
    relay.join(b, "R1".into()).await;

    relay.handle(a, SignalMessage::PeerLeft).await;
    relay
        .handle(
            a,
            SignalMessage::RoleAssignment {
                role: duet_core::Role::Caller,
            },
        )
        .await;

    assert_eq!(signaling.signals_for(&b).await.len(), 1);
}
