use crate::chat::{ChatEntry, ChatRelay};
use crate::config::{ClientConfig, MediaConstraints};
use crate::error::SessionError;
use crate::media::{
    MediaEngine, PeerConnection, PeerConnectionState, PeerEvent, PeerEventSender, SdpKind,
    SessionDescription,
};
use crate::negotiation::machine::{self, Action};
use crate::negotiation::{IceCandidateBuffer, NegotiationEvent, NegotiationState};
use crate::signaling::SignalingSink;
use duet_core::{IceCandidate, IceServerConfig, PeerId, RoomId, SignalError, SignalMessage};
use std::collections::VecDeque;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// What the embedding UI gets to render.
///
/// `StateChanged` is emitted when a transition is taken, ahead of the
/// updates its effects produce: leaving a call reports `idle` first and
/// `RemoteMediaCleared` right after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    StateChanged(NegotiationState),
    RemoteMediaAvailable { kind: String },
    RemoteMediaCleared,
    Chat(ChatEntry),
    Error(SessionError),
}

/// What the embedding UI can ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    SendChat {
        text: Option<String>,
        image: Option<String>,
    },
    Hangup,
}

/// One call: exclusive owner of the local stream and the peer connection.
///
/// All inputs are processed one at a time, and every suspending step of a
/// transition completes before the next one starts.
pub struct NegotiationSession<E: MediaEngine, S: SignalingSink> {
    room_id: RoomId,
    state: NegotiationState,
    engine: E,
    signaling: S,
    constraints: MediaConstraints,
    ice_servers: Vec<IceServerConfig>,
    local_peer: Option<PeerId>,
    local_media: Option<E::Stream>,
    peer: Option<E::Peer>,
    generation: u64,
    pending_local: Option<SessionDescription>,
    remote_tracks: Vec<String>,
    candidates: IceCandidateBuffer,
    chat: ChatRelay,
    peer_events_tx: mpsc::UnboundedSender<(u64, PeerEvent)>,
    peer_events_rx: Option<mpsc::UnboundedReceiver<(u64, PeerEvent)>>,
    updates: mpsc::UnboundedSender<SessionUpdate>,
}

impl<E: MediaEngine, S: SignalingSink> NegotiationSession<E, S> {
    pub fn new(
        config: &ClientConfig,
        engine: E,
        signaling: S,
        updates: mpsc::UnboundedSender<SessionUpdate>,
    ) -> Self {
        let (peer_events_tx, peer_events_rx) = mpsc::unbounded_channel();

        Self {
            room_id: config.room_id.clone(),
            state: NegotiationState::Idle,
            engine,
            signaling,
            constraints: config.constraints,
            ice_servers: config.ice_servers.clone(),
            local_peer: None,
            local_media: None,
            peer: None,
            generation: 0,
            pending_local: None,
            remote_tracks: Vec::new(),
            candidates: IceCandidateBuffer::new(),
            chat: ChatRelay::new(
                config.room_id.clone(),
                config.display_name.clone().unwrap_or_default(),
            ),
            peer_events_tx,
            peer_events_rx: Some(peer_events_rx),
            updates,
        }
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn local_peer(&self) -> Option<PeerId> {
        self.local_peer
    }

    pub fn ice_servers(&self) -> &[IceServerConfig] {
        &self.ice_servers
    }

    pub fn transcript(&self) -> &[ChatEntry] {
        self.chat.transcript()
    }

    pub fn has_local_media(&self) -> bool {
        self.local_media.is_some()
    }

    pub fn has_peer_connection(&self) -> bool {
        self.peer.is_some()
    }

    pub fn has_remote_media(&self) -> bool {
        !self.remote_tracks.is_empty()
    }

    pub fn buffered_candidates(&self) -> usize {
        self.candidates.len()
    }

    /// Joins the room. The relay answers with a role once a peer is present.
    pub async fn start(&mut self) {
        self.handle(NegotiationEvent::JoinRequested).await;
    }

    /// Drives the session until it is closed.
    ///
    /// `inbound` ending counts as losing the relay; `commands` ending counts
    /// as a local hangup.
    pub async fn run(
        mut self,
        mut inbound: mpsc::UnboundedReceiver<SignalMessage>,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    ) {
        let Some(mut peer_events) = self.peer_events_rx.take() else {
            error!("Session for room '{}' is already running", self.room_id);
            return;
        };

        self.start().await;

        while !self.state.is_closed() {
            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(cmd) => self.on_command(cmd).await,
                    None => self.handle(NegotiationEvent::Hangup).await,
                },
                signal = inbound.recv() => match signal {
                    Some(signal) => self.on_signal(signal).await,
                    None => self.transport_lost().await,
                },
                Some((generation, event)) = peer_events.recv() => {
                    self.on_peer_event(generation, event).await
                }
            }
        }

        info!("Session for room '{}' finished", self.room_id);
    }

    pub async fn on_signal(&mut self, msg: SignalMessage) {
        match msg {
            SignalMessage::Welcome { peer_id } => {
                info!("Relay assigned peer id {}", peer_id);
                self.local_peer = Some(peer_id);
                if self.chat.sender().is_empty() {
                    self.chat.set_sender(peer_id.to_string());
                }
            }
            SignalMessage::IceConfig { ice_servers } => {
                if ice_servers.is_empty() {
                    debug!("Relay sent an empty ICE config, keeping local one");
                } else {
                    info!("Using {} ICE servers from relay", ice_servers.len());
                    self.ice_servers = ice_servers;
                }
            }
            SignalMessage::RoleAssignment { role } => {
                info!("Assigned role {} in room '{}'", role, self.room_id);
                self.handle(NegotiationEvent::RoleAssigned(role)).await;
            }
            SignalMessage::Offer { room_id, sdp } if room_id == self.room_id => {
                self.handle(NegotiationEvent::OfferReceived(sdp)).await;
            }
            SignalMessage::Answer { room_id, sdp } if room_id == self.room_id => {
                self.handle(NegotiationEvent::AnswerReceived(sdp)).await;
            }
            SignalMessage::IceCandidate { room_id, candidate } if room_id == self.room_id => {
                self.handle(NegotiationEvent::RemoteCandidate(candidate)).await;
            }
            SignalMessage::Chat { room_id, message } if room_id == self.room_id => {
                if self.state.is_closed() {
                    return;
                }
                let entry = self.chat.on_receive(message).clone();
                self.notify(SessionUpdate::Chat(entry));
            }
            SignalMessage::PeerLeft => {
                info!("Peer left room '{}'", self.room_id);
                self.handle(NegotiationEvent::PeerLeft).await;
            }
            SignalMessage::Error {
                reason: SignalError::RoomFull,
            } => {
                warn!("Room '{}' is full", self.room_id);
                self.notify(SessionUpdate::Error(SessionError::Rejected(
                    SignalError::RoomFull,
                )));
                self.handle(NegotiationEvent::Hangup).await;
            }
            SignalMessage::Error { reason } => warn!("Relay reported: {}", reason),
            other => warn!(
                "Ignoring {} not addressed to room '{}'",
                other.kind(),
                self.room_id
            ),
        }
    }

    pub async fn on_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::SendChat { text, image } => self.send_chat(text, image).await,
            SessionCommand::Hangup => self.hangup().await,
        }
    }

    pub async fn on_peer_event(&mut self, generation: u64, event: PeerEvent) {
        if generation != self.generation || self.peer.is_none() {
            debug!("Dropping {:?} from a closed peer connection", event);
            return;
        }

        match event {
            PeerEvent::LocalCandidate(candidate) => {
                self.handle(NegotiationEvent::LocalCandidate(candidate)).await;
            }
            PeerEvent::RemoteTrack { kind } => {
                self.remote_tracks.push(kind.clone());
                self.notify(SessionUpdate::RemoteMediaAvailable { kind });
            }
            PeerEvent::StateChanged(PeerConnectionState::Connected) => {
                self.handle(NegotiationEvent::PeerConnected).await;
            }
            PeerEvent::StateChanged(PeerConnectionState::Failed) => {
                warn!("Peer connection failed in room '{}'", self.room_id);
            }
            PeerEvent::StateChanged(state) => debug!("Peer connection is {:?}", state),
        }
    }

    /// Local teardown: closes the peer connection, releases the device and
    /// disconnects from the relay.
    pub async fn hangup(&mut self) {
        self.handle(NegotiationEvent::Hangup).await;
    }

    async fn transport_lost(&mut self) {
        self.notify(SessionUpdate::Error(SessionError::SignalingTransportLost(
            "relay closed the connection".to_owned(),
        )));
        self.handle(NegotiationEvent::TransportLost).await;
    }

    async fn send_chat(&mut self, text: Option<String>, image: Option<String>) {
        if self.state.is_closed() {
            warn!("Chat after hangup dropped");
            return;
        }

        let Some(envelope) = self.chat.send(text, image) else {
            debug!("Empty chat message not sent");
            return;
        };

        if let Some(entry) = self.chat.transcript().last().cloned() {
            self.notify(SessionUpdate::Chat(entry));
        }

        if let Err(e) = self.send(envelope).await {
            if let Some(follow_up) = self.on_failure(e) {
                self.handle(follow_up).await;
            }
        }
    }

    /// Runs `event` and every event its effects produce through the state
    /// machine, in order.
    pub async fn handle(&mut self, event: NegotiationEvent) {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let transition = match machine::apply(self.state, &event) {
                Ok(transition) => transition,
                Err(e) => {
                    warn!("Discarding signal: {}", e);
                    continue;
                }
            };

            self.set_state(transition.next);

            for action in transition.actions {
                match self.execute(action).await {
                    Ok(Some(follow_up)) => queue.push_back(follow_up),
                    Ok(None) => {}
                    Err(e) => {
                        if let Some(follow_up) = self.on_failure(e) {
                            queue.push_back(follow_up);
                        }
                        break;
                    }
                }
            }
        }
    }

    async fn execute(&mut self, action: Action) -> Result<Option<NegotiationEvent>, SessionError> {
        debug!("[{}] {:?}", self.state, action);

        match action {
            Action::SendJoin => {
                let room_id = self.room_id.clone();
                self.send(SignalMessage::Join { room_id }).await?;
            }
            Action::AcquireLocalMedia => {
                if self.local_media.is_none() {
                    let stream = self.engine.acquire_local_media(&self.constraints).await?;
                    self.local_media = Some(stream);
                }
            }
            Action::CreatePeerConnection => {
                self.close_peer().await;
                self.generation += 1;
                let events = PeerEventSender::new(self.generation, self.peer_events_tx.clone());
                let peer = self
                    .engine
                    .create_peer_connection(&self.ice_servers, events)
                    .await?;
                self.peer = Some(peer);
            }
            Action::AttachLocalTracks => {
                let Some(media) = &self.local_media else {
                    return Err(SessionError::MediaAccessDenied(
                        "no local media to attach".to_owned(),
                    ));
                };
                self.peer()?.attach_local_tracks(media).await?;
            }
            Action::CreateOffer => {
                self.pending_local = Some(self.peer()?.create_offer().await?);
            }
            Action::CreateAnswer => {
                self.pending_local = Some(self.peer()?.create_answer().await?);
            }
            Action::SetLocalDescription => {
                let desc = self.pending_local.clone().ok_or_else(no_local_description)?;
                self.peer()?.set_local_description(desc).await?;
            }
            Action::SendLocalDescription => {
                let desc = self.pending_local.take().ok_or_else(no_local_description)?;
                let room_id = self.room_id.clone();
                let (msg, follow_up) = match desc.kind {
                    SdpKind::Offer => (
                        SignalMessage::Offer {
                            room_id,
                            sdp: desc.sdp,
                        },
                        Some(NegotiationEvent::OfferDispatched),
                    ),
                    SdpKind::Answer => (
                        SignalMessage::Answer {
                            room_id,
                            sdp: desc.sdp,
                        },
                        None,
                    ),
                };
                self.send(msg).await?;
                return Ok(follow_up);
            }
            Action::ApplyRemoteDescription(desc) => {
                self.peer()?.set_remote_description(desc).await?;
            }
            Action::DrainCandidates => {
                let ready = self.state.has_remote_description();
                let drained = self.candidates.drain_if_ready(ready);
                if !drained.is_empty() {
                    info!("Applying {} buffered ICE candidates", drained.len());
                }
                for candidate in drained {
                    self.apply_candidate(candidate).await;
                }
            }
            Action::BufferCandidate(candidate) => {
                debug!("No remote description yet, buffering candidate");
                self.candidates.enqueue(candidate);
            }
            Action::ApplyCandidate(candidate) => self.apply_candidate(candidate).await,
            Action::SendCandidate(candidate) => {
                let room_id = self.room_id.clone();
                self.send(SignalMessage::IceCandidate { room_id, candidate })
                    .await?;
            }
            Action::ClosePeerConnection => self.close_peer().await,
            Action::ClearRemoteMedia => {
                if !self.remote_tracks.is_empty() {
                    self.remote_tracks.clear();
                    self.notify(SessionUpdate::RemoteMediaCleared);
                }
            }
            Action::ClearCandidates => self.candidates.clear(),
            Action::ReleaseLocalMedia => {
                if let Some(stream) = self.local_media.take() {
                    self.engine.release_local_media(stream);
                }
            }
            Action::Disconnect => self.signaling.close().await,
        }

        Ok(None)
    }

    fn peer(&self) -> Result<&E::Peer, SessionError> {
        self.peer
            .as_ref()
            .ok_or_else(|| SessionError::PeerConnection("no peer connection".to_owned()))
    }

    async fn apply_candidate(&self, candidate: IceCandidate) {
        let Some(peer) = &self.peer else {
            warn!("Candidate without peer connection dropped");
            return;
        };
        if let Err(e) = peer.add_ice_candidate(candidate).await {
            warn!("Skipping ICE candidate: {}", e);
        }
    }

    async fn close_peer(&mut self) {
        self.pending_local = None;
        let Some(peer) = self.peer.take() else {
            return;
        };
        if let Err(e) = peer.close().await {
            warn!("Error while closing peer connection: {}", e);
        }
    }

    async fn send(&self, msg: SignalMessage) -> Result<(), SessionError> {
        debug!("Sending {}", msg.kind());
        self.signaling.send(msg).await
    }

    fn on_failure(&mut self, error: SessionError) -> Option<NegotiationEvent> {
        error!("Negotiation step failed while {}: {}", self.state, error);

        let follow_up = match &error {
            SessionError::MediaAccessDenied(_) => Some(NegotiationEvent::MediaUnavailable),
            SessionError::SignalingTransportLost(_) => Some(NegotiationEvent::TransportLost),
            SessionError::PeerConnection(_) => Some(NegotiationEvent::NegotiationFailed),
            _ => None,
        };

        if error.is_user_visible() {
            self.notify(SessionUpdate::Error(error));
        }
        follow_up
    }

    fn set_state(&mut self, next: NegotiationState) {
        if self.state == next {
            return;
        }
        info!("Negotiation {} -> {}", self.state, next);
        self.state = next;
        self.notify(SessionUpdate::StateChanged(next));
    }

    fn notify(&self, update: SessionUpdate) {
        let _ = self.updates.send(update);
    }
}

fn no_local_description() -> SessionError {
    SessionError::PeerConnection("no local description to use".to_owned())
}
