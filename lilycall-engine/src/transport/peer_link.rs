use anyhow::Result;
use async_trait::async_trait;
use lilycall_core::{IceCandidatePayload, SessionDescriptionPayload};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::peer_event::PeerEvent;
use super::states::SignalingState;
use crate::media::MediaTrack;

/// The slice of the native peer-connection API the engine depends on.
///
/// Exactly one implementation is live per session. Events come back through
/// the [`PeerEvent`] channel handed to the factory, never through callbacks
/// on this trait, so a replaced link can be silenced with `detach_handlers`
/// before it is closed.
#[async_trait]
pub trait PeerLink: Send + Sync {
    async fn create_offer(&self, ice_restart: bool) -> Result<SessionDescriptionPayload>;

    async fn create_answer(&self) -> Result<SessionDescriptionPayload>;

    async fn set_local_description(&self, description: SessionDescriptionPayload) -> Result<()>;

    async fn set_remote_description(&self, description: SessionDescriptionPayload) -> Result<()>;

    async fn local_description(&self) -> Option<SessionDescriptionPayload>;

    async fn has_remote_description(&self) -> bool;

    fn signaling_state(&self) -> SignalingState;

    async fn add_ice_candidate(&self, candidate: IceCandidatePayload) -> Result<()>;

    /// Attach an outgoing track; the link keeps hold of the video sender so
    /// the track can later be substituted in place.
    async fn attach_track(&self, track: Arc<MediaTrack>) -> Result<()>;

    /// In-place substitution on the existing video sender. No SDP exchange.
    async fn replace_video_track(&self, track: Arc<MediaTrack>) -> Result<()>;

    async fn sender_count(&self) -> usize;

    /// Stop forwarding events. Must be called before `close` when the link
    /// is being replaced, so a dying connection cannot fire into the loop.
    async fn detach_handlers(&self);

    async fn close(&self);
}

/// Builds a fresh [`PeerLink`] seeded with the current local tracks.
/// A new link is created on session start and on every remote join/rejoin.
#[async_trait]
pub trait PeerFactory: Send + Sync {
    async fn create(
        &self,
        events: mpsc::Sender<PeerEvent>,
        tracks: &[Arc<MediaTrack>],
    ) -> Result<Arc<dyn PeerLink>>;
}
