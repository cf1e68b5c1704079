use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

use super::devices::{MediaAccessError, MediaConstraints, MediaDevices};
use super::track::{LocalStream, MediaTrack, TrackKind};

const AUDIO_FRAME: Duration = Duration::from_millis(20);
const VIDEO_FRAME: Duration = Duration::from_millis(33);

/// Sample-generator device layer: silence and flat frames, no hardware.
/// Drives the headless probe and the integration suite; capture/display
/// failures can be scripted to exercise the denial paths.
pub struct SyntheticDevices {
    capture_error: Option<String>,
    display_error: Option<String>,
    seq: AtomicU64,
    last_display: Mutex<Option<Arc<MediaTrack>>>,
}

impl SyntheticDevices {
    pub fn new() -> Self {
        Self {
            capture_error: None,
            display_error: None,
            seq: AtomicU64::new(0),
            last_display: Mutex::new(None),
        }
    }

    /// Every `open_capture` fails with `message`, as a denied permission
    /// prompt would.
    pub fn with_capture_error(message: impl Into<String>) -> Self {
        Self {
            capture_error: Some(message.into()),
            ..Self::new()
        }
    }

    /// Every `open_display` fails with `message`, as a cancelled picker
    /// would.
    pub fn with_display_error(message: impl Into<String>) -> Self {
        Self {
            display_error: Some(message.into()),
            ..Self::new()
        }
    }

    /// The most recently opened screen track, for harnesses that need to
    /// end it externally.
    pub fn last_display(&self) -> Option<Arc<MediaTrack>> {
        self.last_display.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn make_track(&self, kind: TrackKind, label: &str) -> Arc<MediaTrack> {
        let id = format!("synth-{label}-{}", self.seq.fetch_add(1, Ordering::Relaxed));
        let (codec, frame, tick) = match kind {
            TrackKind::Audio => (
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_OPUS.to_owned(),
                    clock_rate: 48_000,
                    channels: 2,
                    ..Default::default()
                },
                Bytes::from_static(&[0xf8, 0xff, 0xfe]),
                AUDIO_FRAME,
            ),
            TrackKind::Video => (
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_VP8.to_owned(),
                    clock_rate: 90_000,
                    ..Default::default()
                },
                Bytes::from_static(&[0u8; 128]),
                VIDEO_FRAME,
            ),
        };
        let rtc = Arc::new(TrackLocalStaticSample::new(
            codec,
            id.clone(),
            "lilycall".to_owned(),
        ));
        let track = Arc::new(MediaTrack::new(id, kind, rtc.clone()));
        spawn_feeder(rtc, track.clone(), frame, tick);
        track
    }
}

impl Default for SyntheticDevices {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes one sample per frame interval until the track ends; a muted track
/// stays attached but goes quiet.
fn spawn_feeder(
    rtc: Arc<TrackLocalStaticSample>,
    track: Arc<MediaTrack>,
    frame: Bytes,
    tick: Duration,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick);
        loop {
            interval.tick().await;
            if track.is_ended() {
                debug!(track = track.id(), "feeder stopped");
                break;
            }
            if !track.is_enabled() {
                continue;
            }
            let sample = Sample {
                data: frame.clone(),
                duration: tick,
                ..Default::default()
            };
            let _ = rtc.write_sample(&sample).await;
        }
    });
}

#[async_trait]
impl MediaDevices for SyntheticDevices {
    async fn open_capture(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<LocalStream, MediaAccessError> {
        if let Some(message) = &self.capture_error {
            return Err(MediaAccessError::new(message.clone()));
        }
        debug!(
            width = constraints.width,
            height = constraints.height,
            "opening synthetic capture"
        );
        Ok(LocalStream {
            audio: self.make_track(TrackKind::Audio, "audio"),
            video: self.make_track(TrackKind::Video, "camera"),
        })
    }

    async fn open_display(&self) -> Result<Arc<MediaTrack>, MediaAccessError> {
        if let Some(message) = &self.display_error {
            return Err(MediaAccessError::new(message.clone()));
        }
        let track = self.make_track(TrackKind::Video, "screen");
        *self
            .last_display
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(track.clone());
        Ok(track)
    }
}
