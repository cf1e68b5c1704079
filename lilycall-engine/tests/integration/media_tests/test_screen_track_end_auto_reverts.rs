use lilycall_core::{Role, SignalKind};
use lilycall_engine::session::SessionEvent;
use lilycall_engine::signaling::{MemorySignalHub, SignalTransport};

use crate::utils::{init_tracing, start_session, test_room, wait_for_event};

/// The OS "stop sharing" path: the capture track ends underneath the
/// session, which must revert to the camera and tell the remote side on its
/// own — no explicit stop call involved.
#[tokio::test]
async fn externally_ended_screen_track_reverts_to_camera() {
    init_tracing();

    let hub = MemorySignalHub::new();
    let room = test_room();
    let observer = hub.seat(&room.room_id, "observer");

    let mut session = start_session(&hub, &room, "coach", Role::Impolite).await;
    let peer = session.peers.latest();
    let camera_id = peer.video_track_id().unwrap();

    session.handle.start_screen_share().await;
    wait_for_event(&mut session.events, "share started", |event| {
        *event == SessionEvent::LocalScreenShare(true)
    })
    .await;

    // Simulate the system ending the capture out-of-band.
    let screen = session
        .devices
        .last_display()
        .expect("display track was opened");
    screen.stop();

    wait_for_event(&mut session.events, "automatic revert", |event| {
        *event == SessionEvent::LocalScreenShare(false)
    })
    .await;

    assert_eq!(peer.video_track_id().as_deref(), Some(camera_id.as_str()));

    let kinds: Vec<SignalKind> = observer
        .poll(&room.room_id)
        .await
        .unwrap()
        .iter()
        .map(|envelope| envelope.signal_type)
        .collect();
    assert!(kinds.contains(&SignalKind::ScreenStop));

    session.handle.hang_up().await;
}
