use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

use super::devices::{MediaAccessError, MediaConstraints, MediaDevices};
use super::track::{LocalStream, MediaTrack};
use crate::transport::PeerLink;

/// Owns the local capture state: the camera/mic pair, the optional screen
/// track, and which video track currently feeds the single outgoing sender.
///
/// All mutation happens on the session loop, so track substitution can never
/// interleave with an offer/answer exchange.
pub struct LocalMedia {
    stream: LocalStream,
    screen: Option<Arc<MediaTrack>>,
    devices: Arc<dyn MediaDevices>,
    released: bool,
}

impl LocalMedia {
    pub async fn acquire(
        devices: Arc<dyn MediaDevices>,
        constraints: &MediaConstraints,
    ) -> Result<Self, MediaAccessError> {
        let stream = devices.open_capture(constraints).await?;
        info!(
            audio = stream.audio.id(),
            video = stream.video.id(),
            "local media acquired"
        );
        Ok(Self {
            stream,
            screen: None,
            devices,
            released: false,
        })
    }

    pub fn stream(&self) -> &LocalStream {
        &self.stream
    }

    /// Tracks to seed a fresh peer connection with: always the camera pair.
    /// While sharing, the caller swaps the screen track back in afterwards.
    pub fn tracks(&self) -> Vec<Arc<MediaTrack>> {
        self.stream.tracks()
    }

    pub fn toggle_audio(&self) -> bool {
        self.stream.audio.toggle()
    }

    pub fn toggle_video(&self) -> bool {
        self.stream.video.toggle()
    }

    pub fn is_screen_sharing(&self) -> bool {
        self.screen.is_some()
    }

    /// The track currently bound to the outgoing video slot.
    pub fn outgoing_video(&self) -> Arc<MediaTrack> {
        self.screen
            .clone()
            .unwrap_or_else(|| self.stream.video.clone())
    }

    pub async fn start_screen_share(&mut self, peer: &Arc<dyn PeerLink>) -> Result<()> {
        if self.screen.is_some() {
            return Ok(());
        }
        let track = self
            .devices
            .open_display()
            .await
            .context("screen capture not available")?;
        peer.replace_video_track(track.clone()).await?;
        info!(track = track.id(), "screen share started");
        self.screen = Some(track);
        Ok(())
    }

    pub async fn stop_screen_share(&mut self, peer: &Arc<dyn PeerLink>) -> Result<()> {
        let Some(screen) = self.screen.take() else {
            return Ok(());
        };
        screen.stop();
        peer.replace_video_track(self.stream.video.clone()).await?;
        info!(track = self.stream.video.id(), "reverted to camera track");
        Ok(())
    }

    /// Resolves when the active screen track ends underneath us (the OS
    /// "stop sharing" path). Pends forever while no share is active.
    pub async fn screen_ended(&self) {
        match &self.screen {
            Some(screen) => {
                let mut ended = screen.ended();
                let _ = ended.wait_for(|flag| *flag).await;
            }
            None => std::future::pending().await,
        }
    }

    /// Stop every capture track. Safe to call more than once.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Some(screen) = self.screen.take() {
            screen.stop();
        }
        self.stream.audio.stop();
        self.stream.video.stop();
        debug!("local media released");
    }
}
