use async_trait::async_trait;
use lilycall_core::RoomId;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoomEvent {
    Joined,
    Left,
}

/// Join/leave event sink. Implementations must swallow their own failures.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn record(&self, room: &RoomId, event: RoomEvent);
}

/// Sink for embedders that do not report room events.
pub struct NoopTelemetry;

#[async_trait]
impl TelemetrySink for NoopTelemetry {
    async fn record(&self, _room: &RoomId, _event: RoomEvent) {}
}
