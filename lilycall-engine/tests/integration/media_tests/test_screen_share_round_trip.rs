use lilycall_core::{Role, SignalKind};
use lilycall_engine::session::SessionEvent;
use lilycall_engine::signaling::{MemorySignalHub, SignalTransport};

use crate::utils::{init_tracing, start_session, test_room, wait_for_event};

/// Screen share start/stop substitutes the outgoing video track in place:
/// no SDP exchange, sender count untouched, and afterwards the very same
/// camera track is back on the sender.
#[tokio::test]
async fn screen_share_swaps_and_restores_the_camera_track() {
    init_tracing();

    let hub = MemorySignalHub::new();
    let room = test_room();
    let observer = hub.seat(&room.room_id, "observer");

    let mut session = start_session(&hub, &room, "coach", Role::Impolite).await;
    let peer = session.peers.latest();
    let camera_id = peer.video_track_id().expect("camera attached at start");
    let senders_before = peer.current_sender_count();

    session.handle.start_screen_share().await;
    wait_for_event(&mut session.events, "share started", |event| {
        *event == SessionEvent::LocalScreenShare(true)
    })
    .await;

    let screen_id = peer.video_track_id().unwrap();
    assert_ne!(screen_id, camera_id);
    assert_eq!(peer.current_sender_count(), senders_before);

    session.handle.stop_screen_share().await;
    wait_for_event(&mut session.events, "share stopped", |event| {
        *event == SessionEvent::LocalScreenShare(false)
    })
    .await;

    // Track identity restored, substitution order recorded, still the same
    // senders.
    assert_eq!(peer.video_track_id().as_deref(), Some(camera_id.as_str()));
    assert_eq!(peer.replace_history(), vec![screen_id, camera_id]);
    assert_eq!(peer.current_sender_count(), senders_before);

    // The wire saw presence signals only — never an offer or answer.
    let kinds: Vec<SignalKind> = observer
        .poll(&room.room_id)
        .await
        .unwrap()
        .iter()
        .map(|envelope| envelope.signal_type)
        .collect();
    assert!(kinds.contains(&SignalKind::ScreenStart));
    assert!(kinds.contains(&SignalKind::ScreenStop));
    assert!(!kinds.contains(&SignalKind::Offer));
    assert!(!kinds.contains(&SignalKind::Answer));

    session.handle.hang_up().await;
}
