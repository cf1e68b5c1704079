use lilycall_core::{Role, SignalKind};
use lilycall_engine::session::SessionEvent;
use lilycall_engine::signaling::{MemorySignalHub, SignalTransport};

use crate::utils::{init_tracing, settle, start_session, test_room, wait_for_event};

/// Hang-up is safe to invoke any number of times — an unmount effect and an
/// explicit button may both fire — and teardown notifies the remote side
/// before local resources go away.
#[tokio::test]
async fn repeated_hang_up_tears_down_once() {
    init_tracing();

    let hub = MemorySignalHub::new();
    let room = test_room();
    let observer = hub.seat(&room.room_id, "observer");

    let mut session = start_session(&hub, &room, "coach", Role::Impolite).await;
    settle().await;

    session.handle.hang_up().await;
    wait_for_event(&mut session.events, "session end", |event| {
        *event == SessionEvent::Ended
    })
    .await;

    // Second (and third) hang-up on a dead loop: silently dropped.
    session.handle.hang_up().await;
    session.handle.hang_up().await;
    settle().await;

    let peer = session.peers.latest();
    assert!(peer.is_closed());
    assert!(peer.is_detached());

    // Exactly one leave went out, after which the channel carries nothing.
    let kinds: Vec<SignalKind> = observer
        .poll(&room.room_id)
        .await
        .unwrap()
        .iter()
        .map(|envelope| envelope.signal_type)
        .collect();
    assert_eq!(
        kinds.iter().filter(|kind| **kind == SignalKind::Leave).count(),
        1
    );

    // The loop is gone, so the event stream is closed for good.
    assert_eq!(session.events.recv().await, None);
}
