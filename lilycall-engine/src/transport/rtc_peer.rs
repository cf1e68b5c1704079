use anyhow::{Context, Result};
use async_trait::async_trait;
use lilycall_core::{IceCandidatePayload, IceServerConfig, SessionDescriptionPayload};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::RTCIceCandidate;
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::offer_answer_options::RTCOfferOptions;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::signaling_state::RTCSignalingState;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;
use webrtc::track::track_remote::TrackRemote;

use lilycall_core::SdpKind;

use super::peer_event::PeerEvent;
use super::peer_link::{PeerFactory, PeerLink};
use super::states::{IceConnectionState, PeerConnectionState, SignalingState};
use crate::media::{MediaTrack, TrackKind};

/// Production [`PeerLink`] over the `webrtc` crate.
pub struct RtcPeer {
    pc: Arc<RTCPeerConnection>,
    video_sender: Mutex<Option<Arc<RTCRtpSender>>>,
}

impl RtcPeer {
    pub async fn connect(
        ice_servers: &[IceServerConfig],
        events: mpsc::Sender<PeerEvent>,
    ) -> Result<Self> {
        let mut media_engine = MediaEngine::default();
        media_engine
            .register_default_codecs()
            .context("failed to register codecs")?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)
            .context("failed to register interceptors")?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let config = RTCConfiguration {
            ice_servers: ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let pc = Arc::new(
            api.new_peer_connection(config)
                .await
                .context("failed to create peer connection")?,
        );

        let candidate_tx = events.clone();
        pc.on_ice_candidate(Box::new(move |candidate: Option<RTCIceCandidate>| {
            let tx = candidate_tx.clone();
            Box::pin(async move {
                let Some(candidate) = candidate else { return };
                match candidate.to_json() {
                    Ok(init) => {
                        let _ = tx
                            .send(PeerEvent::CandidateGenerated(candidate_payload(init)))
                            .await;
                    }
                    Err(e) => warn!("failed to serialize local ICE candidate: {e}"),
                }
            })
        }));

        let state_tx = events.clone();
        pc.on_peer_connection_state_change(Box::new(move |state: RTCPeerConnectionState| {
            let tx = state_tx.clone();
            Box::pin(async move {
                debug!(?state, "peer connection state changed");
                let _ = tx
                    .send(PeerEvent::ConnectionState(connection_state(state)))
                    .await;
            })
        }));

        let ice_tx = events.clone();
        pc.on_ice_connection_state_change(Box::new(move |state: RTCIceConnectionState| {
            let tx = ice_tx.clone();
            Box::pin(async move {
                let _ = tx
                    .send(PeerEvent::IceConnectionState(ice_state(state)))
                    .await;
            })
        }));

        let track_tx = events;
        pc.on_track(Box::new(move |track: Arc<TrackRemote>, _receiver, _transceiver| {
            let tx = track_tx.clone();
            Box::pin(async move {
                let kind = match track.kind() {
                    RTPCodecType::Audio => TrackKind::Audio,
                    _ => TrackKind::Video,
                };
                let _ = tx
                    .send(PeerEvent::RemoteTrack {
                        kind,
                        id: track.id(),
                    })
                    .await;
            })
        }));

        Ok(Self {
            pc,
            video_sender: Mutex::new(None),
        })
    }
}

#[async_trait]
impl PeerLink for RtcPeer {
    async fn create_offer(&self, ice_restart: bool) -> Result<SessionDescriptionPayload> {
        let options = ice_restart.then(|| RTCOfferOptions {
            ice_restart: true,
            ..Default::default()
        });
        let offer = self
            .pc
            .create_offer(options)
            .await
            .context("create_offer failed")?;
        Ok(SessionDescriptionPayload::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescriptionPayload> {
        let answer = self
            .pc
            .create_answer(None)
            .await
            .context("create_answer failed")?;
        Ok(SessionDescriptionPayload::answer(answer.sdp))
    }

    async fn set_local_description(&self, description: SessionDescriptionPayload) -> Result<()> {
        self.pc
            .set_local_description(rtc_description(&description)?)
            .await
            .context("set_local_description failed")
    }

    async fn set_remote_description(&self, description: SessionDescriptionPayload) -> Result<()> {
        self.pc
            .set_remote_description(rtc_description(&description)?)
            .await
            .context("set_remote_description failed")
    }

    async fn local_description(&self) -> Option<SessionDescriptionPayload> {
        self.pc.local_description().await.and_then(payload_from_rtc)
    }

    async fn has_remote_description(&self) -> bool {
        self.pc.remote_description().await.is_some()
    }

    fn signaling_state(&self) -> SignalingState {
        match self.pc.signaling_state() {
            RTCSignalingState::HaveLocalOffer | RTCSignalingState::HaveLocalPranswer => {
                SignalingState::HaveLocalOffer
            }
            RTCSignalingState::HaveRemoteOffer | RTCSignalingState::HaveRemotePranswer => {
                SignalingState::HaveRemoteOffer
            }
            RTCSignalingState::Closed => SignalingState::Closed,
            _ => SignalingState::Stable,
        }
    }

    async fn add_ice_candidate(&self, candidate: IceCandidatePayload) -> Result<()> {
        self.pc
            .add_ice_candidate(RTCIceCandidateInit {
                candidate: candidate.candidate,
                sdp_mid: candidate.sdp_mid,
                sdp_mline_index: candidate.sdp_m_line_index,
                username_fragment: candidate.username_fragment,
            })
            .await
            .context("add_ice_candidate failed")
    }

    async fn attach_track(&self, track: Arc<MediaTrack>) -> Result<()> {
        let sender = self
            .pc
            .add_track(track.rtc())
            .await
            .context("add_track failed")?;
        if track.kind() == TrackKind::Video {
            *self.video_sender.lock().await = Some(sender);
        }
        Ok(())
    }

    async fn replace_video_track(&self, track: Arc<MediaTrack>) -> Result<()> {
        let guard = self.video_sender.lock().await;
        let sender = guard.as_ref().context("no outgoing video sender")?;
        sender
            .replace_track(Some(track.rtc()))
            .await
            .context("replace_track failed")
    }

    async fn sender_count(&self) -> usize {
        self.pc.get_senders().await.len()
    }

    async fn detach_handlers(&self) {
        self.pc.on_ice_candidate(Box::new(|_| Box::pin(async {})));
        self.pc
            .on_peer_connection_state_change(Box::new(|_| Box::pin(async {})));
        self.pc
            .on_ice_connection_state_change(Box::new(|_| Box::pin(async {})));
        self.pc.on_track(Box::new(|_, _, _| Box::pin(async {})));
    }

    async fn close(&self) {
        if let Err(e) = self.pc.close().await {
            warn!("peer connection close failed: {e}");
        }
    }
}

fn rtc_description(description: &SessionDescriptionPayload) -> Result<RTCSessionDescription> {
    let converted = match description.kind {
        SdpKind::Offer => RTCSessionDescription::offer(description.sdp.clone()),
        SdpKind::Answer => RTCSessionDescription::answer(description.sdp.clone()),
    };
    converted.context("malformed session description")
}

fn payload_from_rtc(description: RTCSessionDescription) -> Option<SessionDescriptionPayload> {
    match description.sdp_type {
        RTCSdpType::Offer => Some(SessionDescriptionPayload::offer(description.sdp)),
        RTCSdpType::Answer | RTCSdpType::Pranswer => {
            Some(SessionDescriptionPayload::answer(description.sdp))
        }
        _ => None,
    }
}

fn candidate_payload(init: RTCIceCandidateInit) -> IceCandidatePayload {
    IceCandidatePayload {
        candidate: init.candidate,
        sdp_mid: init.sdp_mid,
        sdp_m_line_index: init.sdp_mline_index,
        username_fragment: init.username_fragment,
    }
}

fn connection_state(state: RTCPeerConnectionState) -> PeerConnectionState {
    match state {
        RTCPeerConnectionState::Connecting => PeerConnectionState::Connecting,
        RTCPeerConnectionState::Connected => PeerConnectionState::Connected,
        RTCPeerConnectionState::Disconnected => PeerConnectionState::Disconnected,
        RTCPeerConnectionState::Failed => PeerConnectionState::Failed,
        RTCPeerConnectionState::Closed => PeerConnectionState::Closed,
        _ => PeerConnectionState::New,
    }
}

fn ice_state(state: RTCIceConnectionState) -> IceConnectionState {
    match state {
        RTCIceConnectionState::Checking => IceConnectionState::Checking,
        RTCIceConnectionState::Connected => IceConnectionState::Connected,
        RTCIceConnectionState::Completed => IceConnectionState::Completed,
        RTCIceConnectionState::Disconnected => IceConnectionState::Disconnected,
        RTCIceConnectionState::Failed => IceConnectionState::Failed,
        RTCIceConnectionState::Closed => IceConnectionState::Closed,
        _ => IceConnectionState::New,
    }
}

/// Builds [`RtcPeer`] links with a fixed ICE configuration.
pub struct RtcPeerFactory {
    ice_servers: Vec<IceServerConfig>,
}

impl RtcPeerFactory {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self { ice_servers }
    }
}

#[async_trait]
impl PeerFactory for RtcPeerFactory {
    async fn create(
        &self,
        events: mpsc::Sender<PeerEvent>,
        tracks: &[Arc<MediaTrack>],
    ) -> Result<Arc<dyn PeerLink>> {
        let peer = RtcPeer::connect(&self.ice_servers, events).await?;
        for track in tracks {
            peer.attach_track(track.clone()).await?;
        }
        Ok(Arc::new(peer))
    }
}
