use lilycall_core::{IceCandidatePayload, Role};
use lilycall_engine::signaling::MemorySignalHub;
use lilycall_engine::transport::PeerEvent;

use crate::utils::{init_tracing, settle, start_session, test_room};

/// A locally gathered candidate travels through the mailbox and is applied
/// on the far side; the duplicate delivery the transport is allowed to
/// produce stays invisible.
#[tokio::test]
async fn gathered_candidates_reach_the_remote_peer() {
    init_tracing();

    let hub = MemorySignalHub::new();
    let room = test_room();

    let coach = start_session(&hub, &room, "coach", Role::Impolite).await;
    settle().await;
    let client = start_session(&hub, &room, "client", Role::Polite).await;
    settle().await;

    let candidate = IceCandidatePayload {
        candidate: "candidate:1 1 udp 2122260223 192.0.2.10 50000 typ host".to_owned(),
        sdp_mid: Some("0".to_owned()),
        sdp_m_line_index: Some(0),
        username_fragment: None,
    };
    let coach_peer = coach.peers.latest();
    assert!(
        coach_peer
            .emit(PeerEvent::CandidateGenerated(candidate.clone()))
            .await
    );
    // At-least-once delivery: the same candidate can arrive twice.
    assert!(coach_peer.emit(PeerEvent::CandidateGenerated(candidate)).await);
    settle().await;

    let client_peer = client.peers.latest();
    assert_eq!(client_peer.applied_candidates().len(), 1);

    coach.handle.hang_up().await;
    client.handle.hang_up().await;
}
