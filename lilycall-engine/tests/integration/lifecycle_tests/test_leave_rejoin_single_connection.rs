use lilycall_core::Role;
use lilycall_engine::media::SyntheticDevices;
use lilycall_engine::signaling::MemorySignalHub;
use lilycall_engine::transport::SignalingState;
use std::sync::Arc;

use crate::utils::{init_tracing, settle, start_on, start_session, test_room};

/// A full leave/rejoin cycle: however many times the remote side comes and
/// goes, the local side holds exactly one live peer link, and every replaced
/// link is closed with its handlers detached first.
#[tokio::test]
async fn leave_then_rejoin_leaves_exactly_one_live_peer() {
    init_tracing();

    let hub = MemorySignalHub::new();
    let room = test_room();

    let coach = start_session(&hub, &room, "coach", Role::Impolite).await;
    settle().await;
    let client = start_session(&hub, &room, "client", Role::Polite).await;
    settle().await;

    // Established: coach rebuilt once on the client's join.
    assert_eq!(coach.peers.created_count(), 2);
    assert_eq!(coach.peers.live_count(), 1);

    // Client leaves; the coach discards the negotiated peer and waits.
    client.handle.hang_up().await;
    settle().await;

    assert_eq!(coach.peers.created_count(), 3);
    assert_eq!(coach.peers.live_count(), 1);

    // Client returns to the same seat, announcing a rejoin this time.
    let returning_seat = hub.seat(&room.room_id, "client");
    let client2 = start_on(
        returning_seat,
        &room,
        "client",
        Role::Polite,
        Arc::new(SyntheticDevices::new()),
        true,
    )
    .await;
    settle().await;

    assert_eq!(coach.peers.created_count(), 4);
    assert_eq!(coach.peers.live_count(), 1);

    // Every replaced link was silenced before it was closed.
    for stale in coach.peers.created().iter().rev().skip(1) {
        assert!(stale.is_closed());
        assert!(stale.is_detached());
    }

    // And the surviving pair is fully negotiated again.
    let coach_peer = coach.peers.latest();
    let client_peer = client2.peers.latest();
    assert_eq!(coach_peer.signaling(), SignalingState::Stable);
    assert_eq!(client_peer.signaling(), SignalingState::Stable);
    assert_eq!(coach_peer.local_sdp(), client_peer.remote_sdp());
    assert_eq!(client_peer.local_sdp(), coach_peer.remote_sdp());

    coach.handle.hang_up().await;
    client2.handle.hang_up().await;
}
