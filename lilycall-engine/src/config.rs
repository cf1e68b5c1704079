use crate::media::MediaConstraints;
use lilycall_core::{IceServerConfig, Role, default_ice_servers};
use std::time::Duration;

/// Reference polling cadence of the signaling mailbox.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// Per-session settings. The role comes from the authentication layer:
/// the booking client is the polite side, the coach the impolite one.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub role: Role,
    pub display_name: String,
    pub ice_servers: Vec<IceServerConfig>,
    pub poll_interval: Duration,
    pub constraints: MediaConstraints,
}

impl SessionConfig {
    pub fn new(role: Role, display_name: impl Into<String>) -> Self {
        Self {
            role,
            display_name: display_name.into(),
            ice_servers: default_ice_servers(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            constraints: MediaConstraints::default(),
        }
    }
}
