use crate::config::MediaConstraints;
use crate::error::SessionError;
use crate::media::{
    MediaEngine, PeerConnection, PeerConnectionState, PeerEvent, PeerEventSender, SdpKind,
    SessionDescription,
};
use anyhow::Result;
use async_trait::async_trait;
use duet_core::{IceCandidate, IceServerConfig};
use std::sync::Arc;
use tracing::{debug, info, warn};
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8, MediaEngine as CodecRegistry};
use webrtc::api::{API, APIBuilder};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

const LOCAL_STREAM_ID: &str = "duet-local";

/// Local camera/microphone tracks.
///
/// Samples are written into the tracks by whatever captures the device;
/// the session only owns their lifetime.
#[derive(Clone)]
pub struct LocalMedia {
    pub audio: Option<Arc<TrackLocalStaticSample>>,
    pub video: Option<Arc<TrackLocalStaticSample>>,
}

impl LocalMedia {
    pub fn tracks(&self) -> Vec<Arc<TrackLocalStaticSample>> {
        self.audio.iter().chain(self.video.iter()).cloned().collect()
    }
}

/// `webrtc`-backed media engine: Opus audio, VP8 video.
pub struct WebRtcMediaEngine {
    api: API,
}

impl WebRtcMediaEngine {
    pub fn new() -> Result<Self> {
        let mut codecs = CodecRegistry::default();
        codecs.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut codecs)?;

        let api = APIBuilder::new()
            .with_media_engine(codecs)
            .with_interceptor_registry(registry)
            .build();

        Ok(Self { api })
    }

    fn rtc_configuration(ice_servers: &[IceServerConfig]) -> RTCConfiguration {
        RTCConfiguration {
            ice_servers: ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    fn local_track(mime_type: &str, id: &str) -> Arc<TrackLocalStaticSample> {
        Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: mime_type.to_owned(),
                ..Default::default()
            },
            id.to_owned(),
            LOCAL_STREAM_ID.to_owned(),
        ))
    }
}

#[async_trait]
impl MediaEngine for WebRtcMediaEngine {
    type Stream = LocalMedia;
    type Peer = WebRtcPeer;

    async fn acquire_local_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<LocalMedia, SessionError> {
        if !constraints.audio && !constraints.video {
            return Err(SessionError::MediaAccessDenied(
                "neither audio nor video requested".to_owned(),
            ));
        }

        let media = LocalMedia {
            audio: constraints
                .audio
                .then(|| Self::local_track(MIME_TYPE_OPUS, "audio")),
            video: constraints
                .video
                .then(|| Self::local_track(MIME_TYPE_VP8, "video")),
        };

        info!("Local media acquired ({} tracks)", media.tracks().len());
        Ok(media)
    }

    fn release_local_media(&self, stream: LocalMedia) {
        info!("Local media released ({} tracks)", stream.tracks().len());
        drop(stream);
    }

    async fn create_peer_connection(
        &self,
        ice_servers: &[IceServerConfig],
        events: PeerEventSender,
    ) -> Result<WebRtcPeer, SessionError> {
        let config = Self::rtc_configuration(ice_servers);
        let pc = self
            .api
            .new_peer_connection(config)
            .await
            .map_err(|e| SessionError::PeerConnection(e.to_string()))?;
        let pc = Arc::new(pc);

        let ice_events = events.clone();
        pc.on_ice_candidate(Box::new(move |candidate: Option<RTCIceCandidate>| {
            let events = ice_events.clone();
            Box::pin(async move {
                let Some(candidate) = candidate else {
                    debug!("ICE gathering complete");
                    return;
                };
                match candidate.to_json() {
                    Ok(init) => {
                        events.send(PeerEvent::LocalCandidate(IceCandidate {
                            candidate: init.candidate,
                            sdp_mid: init.sdp_mid,
                            sdp_m_line_index: init.sdp_mline_index,
                        }));
                    }
                    Err(e) => warn!("Failed to serialize local ICE candidate: {}", e),
                }
            })
        }));

        let track_events = events.clone();
        pc.on_track(Box::new(move |track: Arc<TrackRemote>, _receiver, _transceiver| {
            let events = track_events.clone();
            Box::pin(async move {
                let kind = track.kind().to_string();
                info!("Remote {} track started", kind);
                events.send(PeerEvent::RemoteTrack { kind });
            })
        }));

        let state_events = events;
        pc.on_peer_connection_state_change(Box::new(move |s: RTCPeerConnectionState| {
            let events = state_events.clone();
            Box::pin(async move {
                info!("Peer Connection State changed: {:?}", s);
                let state = match s {
                    RTCPeerConnectionState::Connected => PeerConnectionState::Connected,
                    RTCPeerConnectionState::Disconnected => PeerConnectionState::Disconnected,
                    RTCPeerConnectionState::Failed => PeerConnectionState::Failed,
                    RTCPeerConnectionState::Closed => PeerConnectionState::Closed,
                    _ => PeerConnectionState::Connecting,
                };
                events.send(PeerEvent::StateChanged(state));
            })
        }));

        Ok(WebRtcPeer { pc })
    }
}

pub struct WebRtcPeer {
    pc: Arc<RTCPeerConnection>,
}

impl WebRtcPeer {
    fn to_rtc(desc: SessionDescription) -> Result<RTCSessionDescription, SessionError> {
        let rtc = match desc.kind {
            SdpKind::Offer => RTCSessionDescription::offer(desc.sdp),
            SdpKind::Answer => RTCSessionDescription::answer(desc.sdp),
        };
        rtc.map_err(pc_error)
    }
}

fn pc_error(e: webrtc::Error) -> SessionError {
    SessionError::PeerConnection(e.to_string())
}

#[async_trait]
impl PeerConnection for WebRtcPeer {
    type Stream = LocalMedia;

    async fn attach_local_tracks(&self, stream: &LocalMedia) -> Result<(), SessionError> {
        for track in stream.tracks() {
            self.pc
                .add_track(track as Arc<dyn TrackLocal + Send + Sync>)
                .await
                .map_err(pc_error)?;
        }
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription, SessionError> {
        let offer = self.pc.create_offer(None).await.map_err(pc_error)?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription, SessionError> {
        let answer = self.pc.create_answer(None).await.map_err(pc_error)?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), SessionError> {
        self.pc
            .set_local_description(Self::to_rtc(desc)?)
            .await
            .map_err(pc_error)
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), SessionError> {
        self.pc
            .set_remote_description(Self::to_rtc(desc)?)
            .await
            .map_err(pc_error)
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), SessionError> {
        self.pc
            .add_ice_candidate(RTCIceCandidateInit {
                candidate: candidate.candidate,
                sdp_mid: candidate.sdp_mid,
                sdp_mline_index: candidate.sdp_m_line_index,
                ..Default::default()
            })
            .await
            .map_err(|e| SessionError::IceApplyFailure(e.to_string()))
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.pc.close().await.map_err(pc_error)
    }
}
