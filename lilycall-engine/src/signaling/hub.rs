use async_trait::async_trait;
use dashmap::DashMap;
use lilycall_core::{RoomId, SignalEnvelope, SignalKind};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use super::transport::{SignalTransport, TransportError};

#[derive(Default)]
struct RoomState {
    next_id: i64,
    queues: HashMap<String, VecDeque<SignalEnvelope>>,
}

/// In-process signaling server with the production mailbox semantics:
/// per-room monotonic ids, messages consumed on poll, senders never see
/// their own messages. Used by the integration suite and local harnesses
/// to run two sessions against each other without a network.
#[derive(Default)]
pub struct MemorySignalHub {
    rooms: DashMap<String, RoomState>,
}

impl MemorySignalHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a participant seat in a room and return its transport.
    /// Messages are only delivered to seats registered at send time.
    pub fn seat(self: &Arc<Self>, room: &RoomId, seat: impl Into<String>) -> MemorySignaling {
        let seat = seat.into();
        self.rooms
            .entry(room.to_string())
            .or_default()
            .queues
            .entry(seat.clone())
            .or_default();
        MemorySignaling {
            hub: Arc::clone(self),
            seat,
        }
    }

    fn deliver(&self, room: &RoomId, from: &str, kind: SignalKind, payload: String) {
        let mut state = self.rooms.entry(room.to_string()).or_default();
        state.next_id += 1;
        let envelope = SignalEnvelope {
            id: state.next_id,
            signal_type: kind,
            payload,
            created_at: unix_millis().to_string(),
        };
        for (seat, queue) in state.queues.iter_mut() {
            if seat != from {
                queue.push_back(envelope.clone());
            }
        }
    }

    fn drain(&self, room: &RoomId, seat: &str) -> Vec<SignalEnvelope> {
        let Some(mut state) = self.rooms.get_mut(room.0.as_str()) else {
            return Vec::new();
        };
        match state.queues.get_mut(seat) {
            Some(queue) => queue.drain(..).collect(),
            None => Vec::new(),
        }
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// One seat's view of a [`MemorySignalHub`] room.
#[derive(Clone)]
pub struct MemorySignaling {
    hub: Arc<MemorySignalHub>,
    seat: String,
}

#[async_trait]
impl SignalTransport for MemorySignaling {
    async fn send(
        &self,
        room: &RoomId,
        kind: SignalKind,
        payload: String,
    ) -> Result<(), TransportError> {
        debug!(seat = %self.seat, kind = %kind, "hub send");
        self.hub.deliver(room, &self.seat, kind, payload);
        Ok(())
    }

    async fn poll(&self, room: &RoomId) -> Result<Vec<SignalEnvelope>, TransportError> {
        Ok(self.hub.drain(room, &self.seat))
    }
}
