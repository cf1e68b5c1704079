use async_trait::async_trait;
use lilycall_core::{BookingId, RoomId, RoomInfo, SignalEnvelope, SignalKind};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::telemetry::{RoomEvent, TelemetrySink};
use super::transport::{SignalTransport, TransportError};

#[derive(Serialize)]
struct SendBody<'a> {
    #[serde(rename = "type")]
    kind: SignalKind,
    payload: &'a str,
}

#[derive(Serialize)]
struct EventBody {
    event_type: RoomEvent,
}

/// HTTP client for the platform's signaling mailbox and telemetry endpoints.
#[derive(Clone)]
pub struct HttpSignaling {
    http: Client,
    base: Url,
    auth_token: Option<String>,
}

impl HttpSignaling {
    /// `base` is the API root, e.g. `https://api.example.com/api/`.
    pub fn new(mut base: Url) -> Self {
        // Url::join replaces the last segment unless the base ends in '/'.
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Self {
            http: Client::new(),
            base,
            auth_token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    fn get(&self, path: &str) -> Result<RequestBuilder, TransportError> {
        let url = self.base.join(path)?;
        Ok(self.authorized(self.http.get(url)))
    }

    fn post(&self, path: &str) -> Result<RequestBuilder, TransportError> {
        let url = self.base.join(path)?;
        Ok(self.authorized(self.http.post(url)))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Resolve the signaling room for a confirmed booking.
    pub async fn room_for_booking(&self, booking: &BookingId) -> Result<RoomInfo, TransportError> {
        let response = self.get(&format!("video/room/{booking}"))?.send().await?;
        match response.status().as_u16() {
            200 => Ok(response.json().await?),
            404 => Err(TransportError::UnknownBooking(booking.clone())),
            status => Err(TransportError::Status(status)),
        }
    }
}

#[async_trait]
impl SignalTransport for HttpSignaling {
    async fn send(
        &self,
        room: &RoomId,
        kind: SignalKind,
        payload: String,
    ) -> Result<(), TransportError> {
        let body = SendBody {
            kind,
            payload: &payload,
        };
        let response = self
            .post(&format!("video/{room}/signal/send"))?
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }
        Ok(())
    }

    async fn poll(&self, room: &RoomId) -> Result<Vec<SignalEnvelope>, TransportError> {
        let response = self
            .get(&format!("video/{room}/signal/poll"))?
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl TelemetrySink for HttpSignaling {
    /// Fire-and-forget: room events are analytics, never worth failing a call.
    async fn record(&self, room: &RoomId, event: RoomEvent) {
        let request = match self.post(&format!("video/{room}/event")) {
            Ok(request) => request,
            Err(e) => {
                debug!("telemetry endpoint unavailable: {e}");
                return;
            }
        };
        match request.json(&EventBody { event_type: event }).send().await {
            Ok(response) if !response.status().is_success() => {
                debug!(status = response.status().as_u16(), "telemetry rejected");
            }
            Ok(_) => {}
            Err(e) => debug!("telemetry send failed: {e}"),
        }
    }
}
