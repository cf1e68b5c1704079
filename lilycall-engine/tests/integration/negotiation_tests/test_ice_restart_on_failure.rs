use lilycall_core::{Role, SessionDescriptionPayload, SignalKind};
use lilycall_engine::signaling::{MemorySignalHub, SignalTransport};
use lilycall_engine::transport::{IceConnectionState, PeerEvent, SignalingState};

use crate::utils::{init_tracing, settle, start_session, test_room};

/// ICE failure regenerates the offer with the restart flag instead of
/// tearing the peer down.
#[tokio::test]
async fn ice_failure_triggers_restart_offer() {
    init_tracing();

    let hub = MemorySignalHub::new();
    let room = test_room();
    let observer = hub.seat(&room.room_id, "observer");

    let session = start_session(&hub, &room, "coach", Role::Impolite).await;
    settle().await;

    // Drain the join announce before provoking the failure.
    let _ = observer.poll(&room.room_id).await.unwrap();

    let peer = session.peers.latest();
    assert!(peer.emit(PeerEvent::IceConnectionState(IceConnectionState::Failed)).await);
    settle().await;

    // Same peer link, now carrying a restart offer.
    assert!(!peer.is_closed());
    assert_eq!(session.peers.created_count(), 1);
    assert_eq!(peer.signaling(), SignalingState::HaveLocalOffer);

    let sent = observer.poll(&room.room_id).await.unwrap();
    let offers: Vec<SessionDescriptionPayload> = sent
        .iter()
        .filter(|envelope| envelope.signal_type == SignalKind::Offer)
        .map(|envelope| envelope.decode().unwrap())
        .collect();
    assert_eq!(offers.len(), 1);
    assert!(
        offers[0].sdp.contains("/restart"),
        "offer should carry ICE restart semantics: {}",
        offers[0].sdp
    );

    session.handle.hang_up().await;
}
