use serde::{Deserialize, Serialize};

pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_2: &str = "stun:stun1.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_3: &str = "stun:stun2.l.google.com:19302";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

/// Static STUN set used when no explicit ICE configuration is supplied.
/// No TURN relay, so symmetric-NAT traversal is not guaranteed.
pub fn default_ice_servers() -> Vec<IceServerConfig> {
    vec![IceServerConfig {
        urls: vec![
            DEFAULT_STUN_ADDR.to_owned(),
            DEFAULT_STUN_ADDR_2.to_owned(),
            DEFAULT_STUN_ADDR_3.to_owned(),
        ],
        username: None,
        credential: None,
    }]
}
