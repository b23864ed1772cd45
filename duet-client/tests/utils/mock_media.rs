use async_trait::async_trait;
use duet_client::{
    MediaConstraints, MediaEngine, PeerConnection, PeerConnectionState, PeerEvent,
    PeerEventSender, SdpKind, SessionDescription, SessionError,
};
use duet_core::{IceCandidate, IceServerConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// One call into the mock engine or one of its peers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaCall {
    AcquireMedia,
    ReleaseMedia,
    CreatePeer { generation: u64 },
    AttachTracks,
    CreateOffer,
    CreateAnswer,
    SetLocal(SdpKind),
    SetRemote(SessionDescription),
    AddCandidate(String),
    ClosePeer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockStream;

/// Records every media call instead of touching devices or the network.
///
/// Peers behave like a browser would in the happy path: setting the local
/// description yields one local candidate, and once both descriptions are
/// set the connection reports a remote video track and `Connected`.
#[derive(Clone, Default)]
pub struct MockMediaEngine {
    calls: Arc<Mutex<Vec<MediaCall>>>,
    last_events: Arc<Mutex<Option<PeerEventSender>>>,
    deny_media: bool,
    reject_candidates: bool,
}

impl MockMediaEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `acquire_local_media` fails like a denied permission prompt.
    pub fn denying_media() -> Self {
        Self {
            deny_media: true,
            ..Self::default()
        }
    }

    /// Every `add_ice_candidate` fails.
    pub fn rejecting_candidates() -> Self {
        Self {
            reject_candidates: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<MediaCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &MediaCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn applied_candidates(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MediaCall::AddCandidate(candidate) => Some(candidate),
                _ => None,
            })
            .collect()
    }

    /// Generation of the most recently created peer connection.
    pub fn last_generation(&self) -> Option<u64> {
        self.last_events
            .lock()
            .unwrap()
            .as_ref()
            .map(|events| events.generation())
    }

    fn record(&self, call: MediaCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MediaEngine for MockMediaEngine {
    type Stream = MockStream;
    type Peer = MockPeer;

    async fn acquire_local_media(
        &self,
        _constraints: &MediaConstraints,
    ) -> Result<MockStream, SessionError> {
        self.record(MediaCall::AcquireMedia);
        if self.deny_media {
            return Err(SessionError::MediaAccessDenied("permission denied".into()));
        }
        Ok(MockStream)
    }

    fn release_local_media(&self, _stream: MockStream) {
        self.record(MediaCall::ReleaseMedia);
    }

    async fn create_peer_connection(
        &self,
        _ice_servers: &[IceServerConfig],
        events: PeerEventSender,
    ) -> Result<MockPeer, SessionError> {
        self.record(MediaCall::CreatePeer {
            generation: events.generation(),
        });
        *self.last_events.lock().unwrap() = Some(events.clone());

        Ok(MockPeer {
            engine: self.clone(),
            events,
            local_set: AtomicBool::new(false),
            remote_set: AtomicBool::new(false),
        })
    }
}

pub struct MockPeer {
    engine: MockMediaEngine,
    events: PeerEventSender,
    local_set: AtomicBool,
    remote_set: AtomicBool,
}

impl MockPeer {
    fn mark(&self, flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
        if self.local_set.load(Ordering::SeqCst) && self.remote_set.load(Ordering::SeqCst) {
            self.events.send(PeerEvent::RemoteTrack {
                kind: "video".into(),
            });
            self.events
                .send(PeerEvent::StateChanged(PeerConnectionState::Connected));
        }
    }
}

#[async_trait]
impl PeerConnection for MockPeer {
    type Stream = MockStream;

    async fn attach_local_tracks(&self, _stream: &MockStream) -> Result<(), SessionError> {
        self.engine.record(MediaCall::AttachTracks);
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription, SessionError> {
        self.engine.record(MediaCall::CreateOffer);
        Ok(SessionDescription::offer(format!(
            "v=0 mock-offer-{}",
            self.events.generation()
        )))
    }

    async fn create_answer(&self) -> Result<SessionDescription, SessionError> {
        self.engine.record(MediaCall::CreateAnswer);
        Ok(SessionDescription::answer(format!(
            "v=0 mock-answer-{}",
            self.events.generation()
        )))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), SessionError> {
        self.engine.record(MediaCall::SetLocal(desc.kind));
        self.events.send(PeerEvent::LocalCandidate(IceCandidate::new(format!(
            "candidate:{} 1 udp 1 127.0.0.1 9 typ host",
            self.events.generation()
        ))));
        self.mark(&self.local_set);
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), SessionError> {
        self.engine.record(MediaCall::SetRemote(desc));
        self.mark(&self.remote_set);
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), SessionError> {
        if self.engine.reject_candidates || !self.remote_set.load(Ordering::SeqCst) {
            return Err(SessionError::IceApplyFailure(candidate.candidate));
        }
        self.engine.record(MediaCall::AddCandidate(candidate.candidate));
        Ok(())
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.engine.record(MediaCall::ClosePeer);
        Ok(())
    }
}
