use anyhow::Result;
use lilycall_core::{PresencePayload, RoomInfo, SessionId, SignalEnvelope, SignalKind};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::command::SessionCommand;
use super::event::SessionEvent;
use crate::config::SessionConfig;
use crate::media::LocalMedia;
use crate::negotiation::Negotiator;
use crate::signaling::{RoomEvent, SignalSender, SignalTransport, TelemetrySink};
use crate::transport::{IceConnectionState, PeerConnectionState, PeerEvent, PeerFactory};

/// The session event loop. One task owns the peer link, the local media and
/// the polling cadence, so every mutation of negotiation state happens on a
/// single logical timeline — there is nothing for a late callback to race.
pub(crate) struct SessionController {
    pub(crate) session_id: SessionId,
    pub(crate) room: RoomInfo,
    pub(crate) config: SessionConfig,
    pub(crate) transport: Arc<dyn SignalTransport>,
    pub(crate) telemetry: Arc<dyn TelemetrySink>,
    pub(crate) peers: Arc<dyn PeerFactory>,
    pub(crate) media: LocalMedia,
    pub(crate) negotiator: Negotiator,
    pub(crate) signals: SignalSender,
    pub(crate) peer_events_tx: mpsc::Sender<PeerEvent>,
    pub(crate) peer_events: mpsc::Receiver<PeerEvent>,
    pub(crate) commands: mpsc::Receiver<SessionCommand>,
    pub(crate) events: mpsc::Sender<SessionEvent>,
    pub(crate) remote_connected: bool,
}

impl SessionController {
    pub(crate) async fn run(mut self) {
        info!(session = %self.session_id, room = %self.room.room_id, "session loop started");

        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // The poll is awaited inline, so a slow server can never
                // stack a second poll on top of an in-flight one.
                _ = ticker.tick() => self.poll_signals().await,

                Some(event) = self.peer_events.recv() => self.handle_peer_event(event).await,

                _ = self.media.screen_ended(), if self.media.is_screen_sharing() => {
                    debug!("screen capture ended by the system");
                    self.revert_screen_share().await;
                }

                command = self.commands.recv() => {
                    let keep_running = match command {
                        Some(command) => self.handle_command(command).await,
                        // Every handle dropped: treat as hang-up.
                        None => false,
                    };
                    if !keep_running {
                        break;
                    }
                }
            }
        }

        self.teardown().await;
    }

    async fn poll_signals(&mut self) {
        let batch = match self.transport.poll(&self.room.room_id).await {
            Ok(batch) => batch,
            Err(e) => {
                debug!("signal poll failed, retrying next tick: {e}");
                return;
            }
        };
        for envelope in batch {
            // One malformed or stale message must never abort the rest of
            // the batch.
            if let Err(e) = self.dispatch_signal(&envelope).await {
                warn!(
                    id = envelope.id,
                    kind = %envelope.signal_type,
                    "signal handling failed: {e:#}"
                );
            }
        }
    }

    async fn dispatch_signal(&mut self, envelope: &SignalEnvelope) -> Result<()> {
        match envelope.signal_type {
            SignalKind::Offer => {
                self.negotiator.handle_offer(envelope.decode()?).await?;
            }
            SignalKind::Answer => {
                self.negotiator.handle_answer(envelope.decode()?).await?;
            }
            SignalKind::IceCandidate => {
                self.negotiator.handle_candidate(envelope.decode()?).await;
            }
            SignalKind::Join | SignalKind::Rejoin => {
                let who = envelope
                    .decode::<PresencePayload>()
                    .map(|presence| presence.user_name)
                    .unwrap_or_default();
                info!(peer = %who, "remote participant joined, starting fresh negotiation");
                self.reset_remote().await;
                self.rebuild_peer().await?;
                self.negotiator.propose(true).await;
            }
            SignalKind::Leave => {
                info!("remote participant left, waiting for rejoin");
                self.reset_remote().await;
                self.rebuild_peer().await?;
            }
            SignalKind::ScreenStart => {
                self.emit(SessionEvent::RemoteScreenShare(true)).await;
            }
            SignalKind::ScreenStop => {
                self.emit(SessionEvent::RemoteScreenShare(false)).await;
            }
        }
        Ok(())
    }

    async fn handle_peer_event(&mut self, event: PeerEvent) {
        match event {
            PeerEvent::CandidateGenerated(candidate) => {
                self.signals.send_candidate(&candidate).await;
            }
            PeerEvent::ConnectionState(state) => {
                debug!(?state, "connection state changed");
                match state {
                    PeerConnectionState::Connected => {
                        self.remote_connected = true;
                        self.emit(SessionEvent::Connected).await;
                        self.emit(SessionEvent::RemoteConnected(true)).await;
                    }
                    PeerConnectionState::Disconnected | PeerConnectionState::Failed => {
                        // Keep the peer allocated; only a presence signal or
                        // local hang-up tears it down.
                        self.remote_connected = false;
                        self.emit(SessionEvent::RemoteConnected(false)).await;
                    }
                    _ => {}
                }
            }
            PeerEvent::IceConnectionState(state) => {
                if state == IceConnectionState::Failed {
                    self.negotiator.restart_ice().await;
                }
            }
            PeerEvent::RemoteTrack { kind, id } => {
                if !self.remote_connected {
                    self.remote_connected = true;
                    self.emit(SessionEvent::RemoteConnected(true)).await;
                }
                self.emit(SessionEvent::RemoteTrack { kind, id }).await;
            }
        }
    }

    /// Returns false when the loop should stop.
    async fn handle_command(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::ToggleAudio => {
                let enabled = self.media.toggle_audio();
                self.emit(SessionEvent::AudioEnabled(enabled)).await;
            }
            SessionCommand::ToggleVideo => {
                let enabled = self.media.toggle_video();
                self.emit(SessionEvent::VideoEnabled(enabled)).await;
            }
            SessionCommand::StartScreenShare => self.start_screen_share().await,
            SessionCommand::StopScreenShare => self.revert_screen_share().await,
            SessionCommand::HangUp => return false,
        }
        true
    }

    async fn start_screen_share(&mut self) {
        if self.media.is_screen_sharing() {
            return;
        }
        match self.media.start_screen_share(self.negotiator.peer()).await {
            Ok(()) => {
                self.signals.send_empty(SignalKind::ScreenStart).await;
                self.emit(SessionEvent::LocalScreenShare(true)).await;
            }
            Err(e) => warn!("screen share not started: {e:#}"),
        }
    }

    async fn revert_screen_share(&mut self) {
        if !self.media.is_screen_sharing() {
            return;
        }
        if let Err(e) = self.media.stop_screen_share(self.negotiator.peer()).await {
            warn!("screen share revert failed: {e:#}");
        }
        self.signals.send_empty(SignalKind::ScreenStop).await;
        self.emit(SessionEvent::LocalScreenShare(false)).await;
    }

    async fn reset_remote(&mut self) {
        if self.remote_connected {
            self.remote_connected = false;
            self.emit(SessionEvent::RemoteConnected(false)).await;
        }
        self.emit(SessionEvent::RemoteScreenShare(false)).await;
    }

    /// Discard the current peer link and build a fresh one seeded with the
    /// current local tracks.
    async fn rebuild_peer(&mut self) -> Result<()> {
        let peer = self
            .peers
            .create(self.peer_events_tx.clone(), &self.media.tracks())
            .await?;
        self.negotiator.replace_peer(peer).await;
        if self.media.is_screen_sharing() {
            // The fresh link starts on the camera; restore the share.
            self.negotiator
                .peer()
                .replace_video_track(self.media.outgoing_video())
                .await?;
        }
        Ok(())
    }

    /// Notify the remote side first, then release resources: media tracks,
    /// peer connection, and (by returning) the polling loop itself.
    async fn teardown(mut self) {
        info!(session = %self.session_id, "session loop finished, releasing resources");
        self.signals.send_empty(SignalKind::Leave).await;
        self.media.release();
        self.negotiator.shutdown().await;
        self.telemetry
            .record(&self.room.room_id, RoomEvent::Left)
            .await;
        let _ = self.events.send(SessionEvent::Ended).await;
    }

    async fn emit(&self, event: SessionEvent) {
        if self.events.send(event).await.is_err() {
            debug!("session event receiver dropped");
        }
    }
}
