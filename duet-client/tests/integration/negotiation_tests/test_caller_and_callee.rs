use duet_client::{
    NegotiationState, PeerConnectionState, PeerEvent, SdpKind, SessionDescription, SessionUpdate,
};
use duet_core::{IceCandidate, IceServerConfig, PeerId, Role, SignalMessage};

use crate::integration::{TestSession, answer, init_tracing, offer};
use crate::utils::MediaCall;

#[tokio::test]
async fn test_caller_offers_then_connects_on_answer() {
    init_tracing();

    let mut t = TestSession::with_mocks();

    t.session.start().await;
    assert_eq!(t.state(), NegotiationState::AwaitingRole);
    assert_eq!(
        t.sink.sent().await,
        vec![SignalMessage::Join {
            room_id: "R1".into()
        }]
    );

    t.signal(SignalMessage::RoleAssignment { role: Role::Caller })
        .await;

    assert_eq!(t.state(), NegotiationState::OfferSent);
    assert_eq!(
        t.engine.calls(),
        vec![
            MediaCall::AcquireMedia,
            MediaCall::CreatePeer { generation: 1 },
            MediaCall::AttachTracks,
            MediaCall::CreateOffer,
            MediaCall::SetLocal(SdpKind::Offer),
        ]
    );
    assert_eq!(
        t.sink.sent().await[1],
        SignalMessage::Offer {
            room_id: "R1".into(),
            sdp: "v=0 mock-offer-1".into()
        }
    );

    t.signal(answer("v=0 remote-answer")).await;

    assert_eq!(t.state(), NegotiationState::Connected);
    assert_eq!(
        t.engine.calls().last(),
        Some(&MediaCall::SetRemote(SessionDescription::answer(
            "v=0 remote-answer"
        )))
    );

    let states: Vec<NegotiationState> = t
        .drain_updates()
        .into_iter()
        .filter_map(|u| match u {
            SessionUpdate::StateChanged(s) => Some(s),
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![
            NegotiationState::AwaitingRole,
            NegotiationState::CreatingOffer,
            NegotiationState::OfferSent,
            NegotiationState::Connected,
        ]
    );
}

#[tokio::test]
async fn test_callee_answers_and_connects_on_peer_state() {
    init_tracing();

    let mut t = TestSession::with_mocks();
    t.with_role(Role::Callee).await;

    assert_eq!(t.state(), NegotiationState::AwaitingOffer);
    assert_eq!(t.engine.count(&MediaCall::CreateOffer), 0);
    assert!(t.session.has_peer_connection());

    t.signal(offer("v=0 remote-offer")).await;

    assert_eq!(t.state(), NegotiationState::AnswerSent);
    assert_eq!(
        &t.engine.calls()[3..],
        &[
            MediaCall::SetRemote(SessionDescription::offer("v=0 remote-offer")),
            MediaCall::CreateAnswer,
            MediaCall::SetLocal(SdpKind::Answer),
        ]
    );
    assert_eq!(t.sink.sent_kinds().await, vec!["join", "answer"]);

    let generation = t.engine.last_generation().unwrap();
    t.session
        .on_peer_event(
            generation,
            PeerEvent::StateChanged(PeerConnectionState::Connected),
        )
        .await;

    assert_eq!(t.state(), NegotiationState::Connected);
}

#[tokio::test]
async fn test_local_candidates_are_relayed() {
    init_tracing();

    let mut t = TestSession::with_mocks();
    t.with_role(Role::Caller).await;

    let generation = t.engine.last_generation().unwrap();
    let candidate = IceCandidate::new("candidate:7 1 udp 1 192.168.1.2 4000 typ host");
    t.session
        .on_peer_event(generation, PeerEvent::LocalCandidate(candidate.clone()))
        .await;

    assert_eq!(
        t.sink.sent().await.last(),
        Some(&SignalMessage::IceCandidate {
            room_id: "R1".into(),
            candidate
        })
    );
}

#[tokio::test]
async fn test_relay_ice_config_replaces_local_servers() {
    init_tracing();

    let mut t = TestSession::with_mocks();
    let peer_id = PeerId::new();

    t.signal(SignalMessage::Welcome { peer_id }).await;
    t.signal(SignalMessage::IceConfig {
        ice_servers: Vec::new(),
    })
    .await;
    assert!(!t.session.ice_servers().is_empty(), "empty config must not wipe defaults");

    let turn = IceServerConfig::turn("turn:turn.example.org:3478", "u", "p");
    t.signal(SignalMessage::IceConfig {
        ice_servers: vec![turn.clone()],
    })
    .await;

    assert_eq!(t.session.local_peer(), Some(peer_id));
    assert_eq!(t.session.ice_servers(), &[turn]);
}
