use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use super::track::{LocalStream, MediaTrack};

/// Capture preferences, mirroring what the web client asks of
/// `getUserMedia`: an ideal resolution plus processing hints.
#[derive(Debug, Clone)]
pub struct MediaConstraints {
    pub width: u32,
    pub height: u32,
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            echo_cancellation: true,
            noise_suppression: true,
        }
    }
}

/// Denied permission or missing hardware. Fatal to the session; the message
/// carries the platform's own explanation for the user-facing layer.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct MediaAccessError {
    pub message: String,
}

impl MediaAccessError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Source of local capture tracks. The host supplies the real device layer;
/// [`super::SyntheticDevices`] feeds generated samples for headless use.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Open camera + microphone. Failure here ends the session before it
    /// starts.
    async fn open_capture(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<LocalStream, MediaAccessError>;

    /// Open a screen-capture video track. Failure is non-fatal (the user
    /// may simply have cancelled the picker).
    async fn open_display(&self) -> Result<Arc<MediaTrack>, MediaAccessError>;
}
