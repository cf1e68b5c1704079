use anyhow::{Context, Result};
use lilycall_core::{IceCandidatePayload, Role, SessionDescriptionPayload, SignalKind};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::signaling::SignalSender;
use crate::transport::{PeerLink, SignalingState};

/// Perfect-negotiation state machine around the live peer link.
///
/// The role is the sole tie-breaker for offer collisions: the impolite side
/// keeps its own in-flight offer and ignores the remote one; the polite side
/// yields, letting `set_remote_description` roll its local offer back, and
/// answers. Arrival order never decides anything, which is what makes the
/// protocol safe over a batching poll transport.
pub struct Negotiator {
    peer: Arc<dyn PeerLink>,
    role: Role,
    signals: SignalSender,
    making_offer: bool,
    /// Candidates that arrived before any remote description; flushed after
    /// each successful `set_remote_description`.
    pending_candidates: Vec<IceCandidatePayload>,
}

impl Negotiator {
    pub fn new(peer: Arc<dyn PeerLink>, role: Role, signals: SignalSender) -> Self {
        Self {
            peer,
            role,
            signals,
            making_offer: false,
            pending_candidates: Vec::new(),
        }
    }

    pub fn peer(&self) -> &Arc<dyn PeerLink> {
        &self.peer
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Swap in a fresh peer link. The old one is silenced before it is
    /// closed, so no two links can ever emit events concurrently.
    pub async fn replace_peer(&mut self, peer: Arc<dyn PeerLink>) {
        let old = std::mem::replace(&mut self.peer, peer);
        old.detach_handlers().await;
        old.close().await;
        self.making_offer = false;
        self.pending_candidates.clear();
        debug!("peer link replaced");
    }

    /// Start a local negotiation round: build an offer (optionally with ICE
    /// restart), set it locally and publish it. Failures are logged, not
    /// fatal; a later join/rejoin restarts negotiation from scratch.
    pub async fn propose(&mut self, ice_restart: bool) {
        self.making_offer = true;
        let outcome = self.try_propose(ice_restart).await;
        self.making_offer = false;
        if let Err(e) = outcome {
            warn!("offer construction failed: {e:#}");
        }
    }

    async fn try_propose(&mut self, ice_restart: bool) -> Result<()> {
        let offer = self.peer.create_offer(ice_restart).await?;
        self.peer.set_local_description(offer).await?;
        let local = self
            .peer
            .local_description()
            .await
            .context("no local description after offer")?;
        self.signals.send_description(SignalKind::Offer, &local).await;
        Ok(())
    }

    /// ICE failed underneath an established exchange: renegotiate the path
    /// without tearing the connection down.
    pub async fn restart_ice(&mut self) {
        info!("ICE connection failed, restarting ICE");
        self.propose(true).await;
    }

    pub async fn handle_offer(&mut self, offer: SessionDescriptionPayload) -> Result<()> {
        let collision =
            self.making_offer || self.peer.signaling_state() != SignalingState::Stable;
        if collision && !self.role.is_polite() {
            debug!("offer collision, impolite side ignores the remote offer");
            return Ok(());
        }
        // Polite side in collision: setting the remote offer implicitly
        // rolls back our own local offer.
        self.peer.set_remote_description(offer).await?;
        self.flush_pending_candidates().await;
        let answer = self.peer.create_answer().await?;
        self.peer.set_local_description(answer).await?;
        let local = self
            .peer
            .local_description()
            .await
            .context("no local description after answer")?;
        self.signals
            .send_description(SignalKind::Answer, &local)
            .await;
        Ok(())
    }

    pub async fn handle_answer(&mut self, answer: SessionDescriptionPayload) -> Result<()> {
        if self.peer.signaling_state() != SignalingState::HaveLocalOffer {
            debug!(
                state = ?self.peer.signaling_state(),
                "dropping answer for a state that has moved on"
            );
            return Ok(());
        }
        self.peer.set_remote_description(answer).await?;
        self.flush_pending_candidates().await;
        Ok(())
    }

    /// Candidates may outrun the offer they belong to; hold them until a
    /// remote description exists instead of dropping them.
    pub async fn handle_candidate(&mut self, candidate: IceCandidatePayload) {
        if !self.peer.has_remote_description().await {
            debug!("buffering ICE candidate ahead of remote description");
            self.pending_candidates.push(candidate);
            return;
        }
        apply_candidate(&self.peer, candidate).await;
    }

    async fn flush_pending_candidates(&mut self) {
        if self.pending_candidates.is_empty() {
            return;
        }
        debug!(
            count = self.pending_candidates.len(),
            "applying buffered ICE candidates"
        );
        for candidate in self.pending_candidates.drain(..).collect::<Vec<_>>() {
            apply_candidate(&self.peer, candidate).await;
        }
    }

    /// Final teardown of the current link.
    pub async fn shutdown(&mut self) {
        self.peer.detach_handlers().await;
        self.peer.close().await;
        self.pending_candidates.clear();
        self.making_offer = false;
    }

    #[cfg(test)]
    pub(crate) fn force_making_offer(&mut self) {
        self.making_offer = true;
    }
}

/// Duplicate and late candidates are routine with at-least-once delivery;
/// a rejected candidate is logged and dropped, never fatal.
async fn apply_candidate(peer: &Arc<dyn PeerLink>, candidate: IceCandidatePayload) {
    if let Err(e) = peer.add_ice_candidate(candidate).await {
        warn!("ICE candidate rejected (non-fatal): {e:#}");
    }
}
