use async_trait::async_trait;
use lilycall_core::{BookingId, RoomId, SignalEnvelope, SignalKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),

    #[error("no video room for booking {0}")]
    UnknownBooking(BookingId),
}

/// Room-scoped mailbox access.
///
/// `send` posts one typed message; `poll` drains the messages not yet
/// delivered to this participant, in server order. Delivery is at-least-once
/// and best-effort; callers own the retry/ignore policy.
#[async_trait]
pub trait SignalTransport: Send + Sync {
    async fn send(
        &self,
        room: &RoomId,
        kind: SignalKind,
        payload: String,
    ) -> Result<(), TransportError>;

    async fn poll(&self, room: &RoomId) -> Result<Vec<SignalEnvelope>, TransportError>;
}
