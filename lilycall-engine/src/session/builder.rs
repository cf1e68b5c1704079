use lilycall_core::{RoomInfo, SessionId, SignalKind};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use super::controller::SessionController;
use super::event::SessionEvent;
use super::handle::SessionHandle;
use crate::config::SessionConfig;
use crate::error::EngineError;
use crate::media::{LocalMedia, MediaDevices};
use crate::negotiation::Negotiator;
use crate::signaling::{NoopTelemetry, RoomEvent, SignalSender, SignalTransport, TelemetrySink};
use crate::transport::PeerFactory;

const PEER_EVENT_BUFFER: usize = 64;
const COMMAND_BUFFER: usize = 16;
const SESSION_EVENT_BUFFER: usize = 64;

/// Assembles a session: local media, the first peer link, the announce
/// signal, and the spawned event loop.
pub struct SessionBuilder {
    config: SessionConfig,
    transport: Arc<dyn SignalTransport>,
    telemetry: Arc<dyn TelemetrySink>,
    devices: Arc<dyn MediaDevices>,
    peers: Arc<dyn PeerFactory>,
    rejoining: bool,
}

impl SessionBuilder {
    pub fn new(
        config: SessionConfig,
        transport: Arc<dyn SignalTransport>,
        devices: Arc<dyn MediaDevices>,
        peers: Arc<dyn PeerFactory>,
    ) -> Self {
        Self {
            config,
            transport,
            telemetry: Arc::new(NoopTelemetry),
            devices,
            peers,
            rejoining: false,
        }
    }

    pub fn telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = sink;
        self
    }

    /// Announce `rejoin` instead of `join`, for a participant returning to a
    /// call it already was in.
    pub fn rejoining(mut self, rejoining: bool) -> Self {
        self.rejoining = rejoining;
        self
    }

    /// Start the session in `room`. Fails only on local media acquisition or
    /// on the very first peer construction; everything after that is handled
    /// inside the loop.
    pub async fn start(
        self,
        room: RoomInfo,
    ) -> Result<(SessionHandle, mpsc::Receiver<SessionEvent>), EngineError> {
        let session_id = SessionId::new();
        info!(
            session = %session_id,
            room = %room.room_id,
            role = ?self.config.role,
            "starting call session"
        );

        let media = LocalMedia::acquire(self.devices.clone(), &self.config.constraints).await?;

        let (peer_events_tx, peer_events_rx) = mpsc::channel(PEER_EVENT_BUFFER);
        let peer = self
            .peers
            .create(peer_events_tx.clone(), &media.tracks())
            .await
            .map_err(EngineError::Peer)?;

        let signals = SignalSender::new(self.transport.clone(), room.room_id.clone());
        let negotiator = Negotiator::new(peer, self.config.role, signals.clone());

        // Fire-and-forget; analytics never hold up the call.
        let telemetry = self.telemetry.clone();
        let telemetry_room = room.room_id.clone();
        tokio::spawn(async move {
            telemetry.record(&telemetry_room, RoomEvent::Joined).await;
        });
        let announce = if self.rejoining {
            SignalKind::Rejoin
        } else {
            SignalKind::Join
        };
        signals
            .send_presence(announce, &self.config.display_name)
            .await;

        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (events_tx, events_rx) = mpsc::channel(SESSION_EVENT_BUFFER);

        let controller = SessionController {
            session_id,
            room,
            config: self.config,
            transport: self.transport,
            telemetry: self.telemetry,
            peers: self.peers,
            media,
            negotiator,
            signals,
            peer_events_tx,
            peer_events: peer_events_rx,
            commands: commands_rx,
            events: events_tx,
            remote_connected: false,
        };
        tokio::spawn(controller.run());

        Ok((SessionHandle::new(commands_tx), events_rx))
    }
}
