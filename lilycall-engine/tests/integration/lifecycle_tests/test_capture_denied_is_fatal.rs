use lilycall_core::Role;
use lilycall_engine::media::SyntheticDevices;
use lilycall_engine::session::SessionBuilder;
use lilycall_engine::signaling::MemorySignalHub;
use lilycall_engine::{EngineError, SessionConfig};
use std::sync::Arc;

use crate::utils::{FakePeerFactory, init_tracing, test_room};

/// Denied camera/microphone access ends the session before it starts, and
/// the platform's own message survives for the user-facing layer.
#[tokio::test]
async fn denied_capture_fails_session_start() {
    init_tracing();

    let hub = MemorySignalHub::new();
    let room = test_room();
    let transport = hub.seat(&room.room_id, "coach");

    let devices = Arc::new(SyntheticDevices::with_capture_error(
        "Permission denied by system settings",
    ));
    let result = SessionBuilder::new(
        SessionConfig::new(Role::Impolite, "coach"),
        Arc::new(transport),
        devices,
        FakePeerFactory::new("coach"),
    )
    .start(room)
    .await;

    match result {
        Err(EngineError::Media(e)) => {
            assert!(e.message.contains("Permission denied"));
        }
        Err(other) => panic!("wrong error kind: {other}"),
        Ok(_) => panic!("session must not start without local media"),
    }
}
