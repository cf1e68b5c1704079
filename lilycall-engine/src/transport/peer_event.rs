use lilycall_core::IceCandidatePayload;

use super::states::{IceConnectionState, PeerConnectionState};
use crate::media::TrackKind;

/// Events the live peer connection feeds into the session loop.
///
/// Native callback APIs are wrapped into this one type so the session and
/// the negotiator can be driven by synthetic events in tests through the
/// same dispatch path as production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    CandidateGenerated(IceCandidatePayload),
    ConnectionState(PeerConnectionState),
    IceConnectionState(IceConnectionState),
    RemoteTrack { kind: TrackKind, id: String },
}
