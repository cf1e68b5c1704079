use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire type of a signaling message.
///
/// `Offer`/`Answer`/`IceCandidate` drive the peer connection; the rest are
/// presence signals interpreted by the session controller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
    Join,
    Rejoin,
    Leave,
    ScreenStart,
    ScreenStop,
}

impl SignalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SignalKind::Offer => "offer",
            SignalKind::Answer => "answer",
            SignalKind::IceCandidate => "ice-candidate",
            SignalKind::Join => "join",
            SignalKind::Rejoin => "rejoin",
            SignalKind::Leave => "leave",
            SignalKind::ScreenStart => "screen-start",
            SignalKind::ScreenStop => "screen-stop",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One mailbox row as returned by the poll endpoint. Write-once and delivered
/// at least once; `id` is monotonic per room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalEnvelope {
    pub id: i64,
    pub signal_type: SignalKind,
    pub payload: String,
    pub created_at: String,
}

impl SignalEnvelope {
    pub fn decode<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.payload)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

/// SDP payload in the browser `RTCSessionDescription` JSON shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionDescriptionPayload {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescriptionPayload {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

/// ICE candidate payload in the browser `RTCIceCandidate.toJSON()` shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidatePayload {
    pub candidate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdp_m_line_index: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

/// Metadata carried by `join`/`rejoin`. Leave and screen signals carry `{}`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PresencePayload {
    #[serde(default)]
    pub user_name: String,
}
