use serde::{Deserialize, Serialize};
use std::fmt;

/// Booking identifier issued by the scheduling system.
#[derive(Debug, Clone, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub struct BookingId(pub String);

impl From<&str> for BookingId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for BookingId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque room key resolved from a booking. The room itself lives on the
/// signaling server; this is only the mailbox address.
#[derive(Debug, Clone, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub struct RoomId(pub String);

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Response of the room-resolution endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub booking_id: BookingId,
    pub session_type: String,
}
