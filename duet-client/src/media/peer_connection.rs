use crate::config::MediaConstraints;
use crate::error::SessionError;
use async_trait::async_trait;
use duet_core::{IceCandidate, IceServerConfig};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdpKind {
    Offer,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerConnectionState {
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Callbacks of a peer connection, delivered into the owning session's task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    LocalCandidate(IceCandidate),
    /// The remote side started sending a track (`"audio"` / `"video"`).
    RemoteTrack { kind: String },
    StateChanged(PeerConnectionState),
}

/// Hands peer-connection callbacks to the session.
///
/// Every peer connection a session creates gets its own generation, so
/// callbacks of a torn-down connection can be recognised and dropped.
#[derive(Debug, Clone)]
pub struct PeerEventSender {
    generation: u64,
    tx: mpsc::UnboundedSender<(u64, PeerEvent)>,
}

impl PeerEventSender {
    pub fn new(generation: u64, tx: mpsc::UnboundedSender<(u64, PeerEvent)>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns false once the session is gone.
    pub fn send(&self, event: PeerEvent) -> bool {
        self.tx.send((self.generation, event)).is_ok()
    }
}

/// Source of local media and factory of peer connections.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    type Stream: Send + Sync;
    type Peer: PeerConnection<Stream = Self::Stream>;

    async fn acquire_local_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Self::Stream, SessionError>;

    /// Stops every track of the stream and gives the device back.
    fn release_local_media(&self, stream: Self::Stream);

    async fn create_peer_connection(
        &self,
        ice_servers: &[IceServerConfig],
        events: PeerEventSender,
    ) -> Result<Self::Peer, SessionError>;
}

/// The one peer connection object of a call.
#[async_trait]
pub trait PeerConnection: Send + Sync {
    type Stream: Send + Sync;

    async fn attach_local_tracks(&self, stream: &Self::Stream) -> Result<(), SessionError>;

    async fn create_offer(&self) -> Result<SessionDescription, SessionError>;

    async fn create_answer(&self) -> Result<SessionDescription, SessionError>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), SessionError>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), SessionError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), SessionError>;

    async fn close(&self) -> Result<(), SessionError>;
}
