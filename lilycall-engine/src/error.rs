use crate::media::MediaAccessError;
use crate::signaling::TransportError;
use thiserror::Error;

/// Session-level failures surfaced to the embedding application.
///
/// Only `Media` is fatal at startup; everything else the engine swallows
/// internally and retries, so these mostly show up from the builder.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("media access failed: {0}")]
    Media(#[from] MediaAccessError),

    #[error("signaling transport failed: {0}")]
    Transport(#[from] TransportError),

    #[error("peer connection setup failed: {0}")]
    Peer(anyhow::Error),

    #[error("session already closed")]
    Closed,
}

impl From<anyhow::Error> for EngineError {
    fn from(err: anyhow::Error) -> Self {
        EngineError::Peer(err)
    }
}
