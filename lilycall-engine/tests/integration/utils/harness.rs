use lilycall_core::{Role, RoomInfo};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::Level;

use lilycall_engine::media::SyntheticDevices;
use lilycall_engine::session::{SessionBuilder, SessionEvent, SessionHandle};
use lilycall_engine::signaling::{MemorySignalHub, MemorySignaling};
use lilycall_engine::SessionConfig;

use super::fake_peer::FakePeerFactory;

/// Fast cadence so a whole join/negotiate/converge cycle fits in a test.
pub const TEST_POLL: Duration = Duration::from_millis(25);

pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn test_room() -> RoomInfo {
    RoomInfo {
        room_id: "room-1".into(),
        booking_id: "booking-1".into(),
        session_type: "deep_dive".into(),
    }
}

/// A running session plus every hook the assertions need.
pub struct TestSession {
    pub handle: SessionHandle,
    pub events: mpsc::Receiver<SessionEvent>,
    pub peers: Arc<FakePeerFactory>,
    pub devices: Arc<SyntheticDevices>,
}

/// Start a session on a pre-registered hub seat. Registering both seats
/// before starting either session is what lets a test force the
/// simultaneous-join collision.
pub async fn start_on(
    transport: MemorySignaling,
    room: &RoomInfo,
    name: &str,
    role: Role,
    devices: Arc<SyntheticDevices>,
    rejoining: bool,
) -> TestSession {
    let mut config = SessionConfig::new(role, name);
    config.poll_interval = TEST_POLL;

    let peers = FakePeerFactory::new(name);
    let (handle, events) = SessionBuilder::new(
        config,
        Arc::new(transport),
        devices.clone(),
        peers.clone(),
    )
    .rejoining(rejoining)
    .start(room.clone())
    .await
    .expect("session failed to start");

    TestSession {
        handle,
        events,
        peers,
        devices,
    }
}

/// Seat and start in one step, for tests that do not care about join order.
pub async fn start_session(
    hub: &Arc<MemorySignalHub>,
    room: &RoomInfo,
    name: &str,
    role: Role,
) -> TestSession {
    let transport = hub.seat(&room.room_id, name);
    start_on(
        transport,
        room,
        name,
        role,
        Arc::new(SyntheticDevices::new()),
        false,
    )
    .await
}

/// Let a few polling cycles run.
pub async fn settle() {
    tokio::time::sleep(TEST_POLL * 16).await;
}

pub async fn wait_for_event<F>(
    events: &mut mpsc::Receiver<SessionEvent>,
    description: &str,
    want: F,
) -> SessionEvent
where
    F: Fn(&SessionEvent) -> bool,
{
    tokio::time::timeout(EVENT_TIMEOUT, async {
        loop {
            match events.recv().await {
                Some(event) if want(&event) => return event,
                Some(_) => continue,
                None => panic!("event channel closed while waiting for {description}"),
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {description}"))
}
