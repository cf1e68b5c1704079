use lilycall_core::{
    IceCandidatePayload, PresencePayload, RoomId, SessionDescriptionPayload, SignalKind,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, warn};

use super::transport::SignalTransport;

/// Room-scoped send half used by the session and the negotiator.
///
/// Send failures are logged and swallowed: the transport is best-effort and
/// a lost signal is recovered by the next join/rejoin cycle.
#[derive(Clone)]
pub struct SignalSender {
    transport: Arc<dyn SignalTransport>,
    room: RoomId,
}

impl SignalSender {
    pub fn new(transport: Arc<dyn SignalTransport>, room: RoomId) -> Self {
        Self { transport, room }
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    pub async fn send_description(&self, kind: SignalKind, description: &SessionDescriptionPayload) {
        self.dispatch(kind, description).await;
    }

    pub async fn send_candidate(&self, candidate: &IceCandidatePayload) {
        self.dispatch(SignalKind::IceCandidate, candidate).await;
    }

    pub async fn send_presence(&self, kind: SignalKind, user_name: &str) {
        self.dispatch(
            kind,
            &PresencePayload {
                user_name: user_name.to_owned(),
            },
        )
        .await;
    }

    pub async fn send_empty(&self, kind: SignalKind) {
        self.dispatch(kind, &serde_json::json!({})).await;
    }

    async fn dispatch<T: Serialize>(&self, kind: SignalKind, payload: &T) {
        let payload = match serde_json::to_string(payload) {
            Ok(payload) => payload,
            Err(e) => {
                error!(kind = %kind, "failed to encode signal payload: {e}");
                return;
            }
        };
        if let Err(e) = self.transport.send(&self.room, kind, payload).await {
            warn!(kind = %kind, room = %self.room, "signal send failed: {e}");
        }
    }
}
