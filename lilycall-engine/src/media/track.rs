use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use webrtc::track::track_local::TrackLocal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

impl TrackKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TrackKind::Audio => "audio",
            TrackKind::Video => "video",
        }
    }
}

/// A local media track bound to the RTP layer.
///
/// `enabled` is the mute flag: a disabled track stays attached to its sender
/// (the feeder just writes nothing), so muting never renegotiates. `ended`
/// latches once, either from [`MediaTrack::stop`] or when the capture source
/// goes away underneath us (the OS "stop sharing" case).
pub struct MediaTrack {
    id: String,
    kind: TrackKind,
    enabled: AtomicBool,
    ended: watch::Sender<bool>,
    rtc: Arc<dyn TrackLocal + Send + Sync>,
}

impl MediaTrack {
    pub fn new(
        id: impl Into<String>,
        kind: TrackKind,
        rtc: Arc<dyn TrackLocal + Send + Sync>,
    ) -> Self {
        let (ended, _) = watch::channel(false);
        Self {
            id: id.into(),
            kind,
            enabled: AtomicBool::new(true),
            ended,
            rtc,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, on: bool) {
        self.enabled.store(on, Ordering::Relaxed);
    }

    /// Flip the mute flag; returns the new state.
    pub fn toggle(&self) -> bool {
        !self.enabled.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn rtc(&self) -> Arc<dyn TrackLocal + Send + Sync> {
        self.rtc.clone()
    }

    pub fn stop(&self) {
        let _ = self.ended.send(true);
    }

    pub fn is_ended(&self) -> bool {
        *self.ended.borrow()
    }

    /// Watch half of the ended latch; `wait_for(|ended| *ended)` is
    /// level-triggered, so subscribing after the end is still observed.
    pub fn ended(&self) -> watch::Receiver<bool> {
        self.ended.subscribe()
    }
}

/// The camera/microphone pair acquired at session start.
pub struct LocalStream {
    pub audio: Arc<MediaTrack>,
    pub video: Arc<MediaTrack>,
}

impl LocalStream {
    pub fn tracks(&self) -> Vec<Arc<MediaTrack>> {
        vec![self.audio.clone(), self.video.clone()]
    }
}
