use std::time::Duration;

use duet_client::{
    ChatOrigin, ClientConfig, DuetClient, NegotiationState, SessionError, SessionUpdate,
};
use duet_core::SignalError;
use tokio::time::timeout;

use crate::integration::{init_tracing, spawn_test_server};
use crate::utils::{MediaCall, MockMediaEngine};

/// Reads updates until one matches; panics on timeout or session end.
async fn wait_for(client: &mut DuetClient, pred: impl Fn(&SessionUpdate) -> bool) {
    timeout(Duration::from_secs(5), async {
        while let Some(update) = client.next_update().await {
            if pred(&update) {
                return;
            }
        }
        panic!("session ended before the expected update");
    })
    .await
    .expect("timed out waiting for update");
}

fn state_is(state: NegotiationState) -> impl Fn(&SessionUpdate) -> bool {
    move |u| *u == SessionUpdate::StateChanged(state)
}

async fn join(url: &str, name: &str, engine: MockMediaEngine) -> DuetClient {
    let config = ClientConfig::new(url, "R1").with_display_name(name);
    DuetClient::connect_with(config, engine)
        .await
        .expect("client connect")
}

#[tokio::test]
async fn test_two_clients_negotiate_chat_and_hang_up() {
    init_tracing();

    let (url, _addr) = spawn_test_server().await;
    let (engine_a, engine_b) = (MockMediaEngine::new(), MockMediaEngine::new());

    let mut a = join(&url, "alice", engine_a.clone()).await;
    let mut b = join(&url, "bob", engine_b.clone()).await;

    wait_for(&mut a, state_is(NegotiationState::Connected)).await;
    wait_for(&mut b, state_is(NegotiationState::Connected)).await;

    // exactly one side offered
    let offers = engine_a.count(&MediaCall::CreateOffer) + engine_b.count(&MediaCall::CreateOffer);
    let answers =
        engine_a.count(&MediaCall::CreateAnswer) + engine_b.count(&MediaCall::CreateAnswer);
    assert_eq!((offers, answers), (1, 1));

    assert!(a.send_chat(Some("hello bob".into()), None));
    wait_for(&mut b, |u| {
        matches!(u, SessionUpdate::Chat(entry)
            if entry.origin == ChatOrigin::Remote
                && entry.message.from == "alice"
                && entry.message.text.as_deref() == Some("hello bob"))
    })
    .await;
    assert_eq!(engine_b.applied_candidates().len(), 1);

    a.close().await;
    assert_eq!(engine_a.count(&MediaCall::ReleaseMedia), 1);

    wait_for(&mut b, state_is(NegotiationState::Idle)).await;
    assert_eq!(b.next_update().await, Some(SessionUpdate::RemoteMediaCleared));
    assert_eq!(engine_b.count(&MediaCall::ReleaseMedia), 0);

    b.close().await;
    assert_eq!(engine_b.count(&MediaCall::ReleaseMedia), 1);
}

#[tokio::test]
async fn test_third_client_is_turned_away() {
    init_tracing();

    let (url, _addr) = spawn_test_server().await;

    let mut a = join(&url, "alice", MockMediaEngine::new()).await;
    let mut b = join(&url, "bob", MockMediaEngine::new()).await;
    wait_for(&mut a, state_is(NegotiationState::Connected)).await;
    wait_for(&mut b, state_is(NegotiationState::Connected)).await;

    let engine_c = MockMediaEngine::new();
    let mut c = join(&url, "carol", engine_c.clone()).await;

    wait_for(&mut c, |u| {
        *u == SessionUpdate::Error(SessionError::Rejected(SignalError::RoomFull))
    })
    .await;
    wait_for(&mut c, state_is(NegotiationState::Closed)).await;
    assert_eq!(engine_c.count(&MediaCall::AcquireMedia), 0);

    // the call in progress is untouched
    assert!(a.send_chat(Some("still here".into()), None));
    wait_for(&mut b, |u| matches!(u, SessionUpdate::Chat(_))).await;

    a.close().await;
    b.close().await;
}
