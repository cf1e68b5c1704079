use lilycall_core::{Role, SdpKind};
use lilycall_engine::media::SyntheticDevices;
use lilycall_engine::signaling::MemorySignalHub;
use lilycall_engine::transport::SignalingState;
use std::sync::Arc;

use crate::utils::{init_tracing, settle, start_on, test_room};

/// Both sides see each other's join in the same poll window, so both build
/// an offer. Exactly one offer may win: the impolite coach keeps its own,
/// the polite client rolls back and answers, and both end up stable with
/// matching descriptions.
#[tokio::test]
async fn simultaneous_offers_converge_to_one_winner() {
    init_tracing();

    let hub = MemorySignalHub::new();
    let room = test_room();

    // Register both seats before either session starts, so each side's join
    // is already queued for the other and both propose at the same tick.
    let coach_seat = hub.seat(&room.room_id, "coach");
    let client_seat = hub.seat(&room.room_id, "client");

    let coach = start_on(
        coach_seat,
        &room,
        "coach",
        Role::Impolite,
        Arc::new(SyntheticDevices::new()),
        false,
    )
    .await;
    let client = start_on(
        client_seat,
        &room,
        "client",
        Role::Polite,
        Arc::new(SyntheticDevices::new()),
        false,
    )
    .await;

    settle().await;

    let coach_peer = coach.peers.latest();
    let client_peer = client.peers.latest();

    assert_eq!(coach_peer.signaling(), SignalingState::Stable);
    assert_eq!(client_peer.signaling(), SignalingState::Stable);

    // The impolite offer won; the polite side never re-sent its own offer.
    assert_eq!(coach_peer.local_kind(), Some(SdpKind::Offer));
    assert_eq!(client_peer.local_kind(), Some(SdpKind::Answer));

    // Matching descriptions on both ends.
    assert_eq!(coach_peer.local_sdp(), client_peer.remote_sdp());
    assert_eq!(client_peer.local_sdp(), coach_peer.remote_sdp());

    coach.handle.hang_up().await;
    client.handle.hang_up().await;
}
