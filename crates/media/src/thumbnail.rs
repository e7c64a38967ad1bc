//! Still-frame thumbnails.
//!
//! An extraction binds one lease to a detached [`MediaProbe`], waits for
//! metadata, seeks to a probe timestamp, captures a downscaled frame and
//! rejects blank ones. Blank frames and decode errors are retried at later
//! timestamps; timeouts and aborted loads give up at once. Whatever happens,
//! [`ThumbnailJob::teardown`] runs exactly once and gives the lease back.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};

use crate::error::MediaError;
use crate::lease::{LeaseRegistry, MediaLease};

pub const MIB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThumbnailSize {
    pub width: u32,
    pub height: u32,
}

impl ThumbnailSize {
    pub const LIST_ROW: ThumbnailSize = ThumbnailSize {
        width: 160,
        height: 90,
    };
    pub const CARD: ThumbnailSize = ThumbnailSize {
        width: 320,
        height: 180,
    };
}

#[derive(Debug, Clone)]
pub struct ThumbnailPolicy {
    /// Sources above this size keep their placeholder.
    pub max_source_bytes: u64,
    /// Attempts after the first one.
    pub max_retries: u32,
    pub attempt_timeout: Duration,
    pub jpeg_quality: u8,
}

impl Default for ThumbnailPolicy {
    fn default() -> Self {
        Self {
            max_source_bytes: 100 * MIB,
            max_retries: 2,
            attempt_timeout: Duration::from_secs(8),
            jpeg_quality: 50,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThumbnailSource {
    pub name: String,
    pub path: PathBuf,
    pub byte_size: u64,
}

#[derive(Debug, Clone)]
pub struct EncodedThumbnail {
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttemptFailure {
    BlankFrame,
    Decode(String),
    TimedOut,
    Aborted,
}

impl AttemptFailure {
    fn is_retryable(&self) -> bool {
        matches!(self, AttemptFailure::BlankFrame | AttemptFailure::Decode(_))
    }
}

#[derive(Debug)]
pub enum ThumbnailOutcome {
    Ready(EncodedThumbnail),
    /// Source too large, the probe was never touched.
    Skipped,
    Placeholder {
        attempts: u32,
        last_failure: AttemptFailure,
    },
}

impl ThumbnailOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, ThumbnailOutcome::Ready(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProbeEvent {
    MetadataLoaded,
    Seeked,
    Error(String),
    Aborted,
}

/// A detached media element used only to pull one frame.
pub trait MediaProbe {
    /// Binds the lease and starts loading metadata.
    fn load(&mut self, lease: &MediaLease) -> Result<(), MediaError>;
    /// Starts loading the bound source again from scratch.
    fn reload(&mut self) -> Result<(), MediaError>;
    fn seek(&mut self, seconds: f64) -> Result<(), MediaError>;
    /// Next event, or `None` when nothing arrived within `timeout`.
    fn wait_event(&mut self, timeout: Duration) -> Option<ProbeEvent>;
    fn capture(&mut self, size: ThumbnailSize) -> Result<RgbaImage, MediaError>;
    /// Stops delivering events and drops decoding resources.
    fn detach(&mut self);
}

pub fn probe_timestamp(attempt: u32) -> f64 {
    match attempt {
        0 => 0.5,
        1 => 1.0,
        _ => 2.0,
    }
}

/// True when any pixel is neither fully transparent nor pure black.
pub fn has_visible_content(rgba: &[u8]) -> bool {
    rgba.chunks_exact(4)
        .any(|px| px[3] > 0 && !(px[0] == 0 && px[1] == 0 && px[2] == 0))
}

pub fn encode_jpeg(frame: &RgbaImage, quality: u8) -> Result<EncodedThumbnail, MediaError> {
    let rgb = DynamicImage::ImageRgba8(frame.clone()).to_rgb8();
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100))
        .encode_image(&rgb)?;
    Ok(EncodedThumbnail {
        width: frame.width(),
        height: frame.height(),
        jpeg,
    })
}

pub fn extract_thumbnail<P: MediaProbe>(
    probe: &mut P,
    leases: &LeaseRegistry,
    source: &ThumbnailSource,
    size: ThumbnailSize,
    policy: &ThumbnailPolicy,
) -> ThumbnailOutcome {
    if source.byte_size > policy.max_source_bytes {
        tracing::debug!(
            name = %source.name,
            bytes = source.byte_size,
            "source too large for a thumbnail, keeping placeholder"
        );
        return ThumbnailOutcome::Skipped;
    }

    let lease = leases.mint(&source.path);
    let mut job = ThumbnailJob {
        probe,
        lease: Some(lease),
        source,
        size,
        policy,
    };
    job.run()
}

#[derive(Debug)]
enum AttemptState {
    AwaitingMetadata,
    Seeking { at: f64 },
    Captured(RgbaImage),
    Failed(AttemptFailure),
}

pub struct ThumbnailJob<'a, P: MediaProbe> {
    probe: &'a mut P,
    lease: Option<MediaLease>,
    source: &'a ThumbnailSource,
    size: ThumbnailSize,
    policy: &'a ThumbnailPolicy,
}

impl<P: MediaProbe> ThumbnailJob<'_, P> {
    fn run(&mut self) -> ThumbnailOutcome {
        let mut attempt = 0;
        loop {
            let failure = match self.run_attempt(attempt) {
                Ok(frame) => match encode_jpeg(&frame, self.policy.jpeg_quality) {
                    Ok(thumb) => {
                        tracing::debug!(name = %self.source.name, attempt, "thumbnail ready");
                        self.teardown();
                        return ThumbnailOutcome::Ready(thumb);
                    }
                    Err(e) => AttemptFailure::Decode(e.to_string()),
                },
                Err(failure) => failure,
            };

            if failure.is_retryable() && attempt < self.policy.max_retries {
                attempt += 1;
                tracing::debug!(
                    name = %self.source.name,
                    ?failure,
                    "retrying thumbnail ({attempt}/{})",
                    self.policy.max_retries
                );
                continue;
            }

            match failure {
                AttemptFailure::TimedOut | AttemptFailure::Aborted => tracing::warn!(
                    name = %self.source.name,
                    ?failure,
                    "thumbnail abandoned, keeping placeholder"
                ),
                _ => tracing::debug!(
                    name = %self.source.name,
                    ?failure,
                    "thumbnail retries exhausted, keeping placeholder"
                ),
            }
            self.teardown();
            return ThumbnailOutcome::Placeholder {
                attempts: attempt + 1,
                last_failure: failure,
            };
        }
    }

    fn run_attempt(&mut self, attempt: u32) -> Result<RgbaImage, AttemptFailure> {
        let deadline = Instant::now() + self.policy.attempt_timeout;

        let started = match (&self.lease, attempt) {
            (Some(lease), 0) => self.probe.load(lease),
            (Some(_), _) => self.probe.reload(),
            (None, _) => return Err(AttemptFailure::Aborted),
        };
        if let Err(e) = started {
            return Err(AttemptFailure::Decode(e.to_string()));
        }

        let mut state = AttemptState::AwaitingMetadata;
        loop {
            state = match state {
                AttemptState::AwaitingMetadata => match self.next_event(deadline) {
                    Some(ProbeEvent::MetadataLoaded) => {
                        let at = probe_timestamp(attempt);
                        match self.probe.seek(at) {
                            Ok(()) => AttemptState::Seeking { at },
                            Err(e) => AttemptState::Failed(AttemptFailure::Decode(e.to_string())),
                        }
                    }
                    Some(ProbeEvent::Seeked) => AttemptState::AwaitingMetadata,
                    Some(ProbeEvent::Error(e)) => AttemptState::Failed(AttemptFailure::Decode(e)),
                    Some(ProbeEvent::Aborted) => AttemptState::Failed(AttemptFailure::Aborted),
                    None => AttemptState::Failed(AttemptFailure::TimedOut),
                },
                AttemptState::Seeking { at } => match self.next_event(deadline) {
                    Some(ProbeEvent::Seeked) => match self.probe.capture(self.size) {
                        Ok(frame) if has_visible_content(frame.as_raw()) => {
                            AttemptState::Captured(frame)
                        }
                        Ok(_) => {
                            tracing::trace!(name = %self.source.name, at, "blank frame");
                            AttemptState::Failed(AttemptFailure::BlankFrame)
                        }
                        Err(e) => AttemptState::Failed(AttemptFailure::Decode(e.to_string())),
                    },
                    Some(ProbeEvent::MetadataLoaded) => AttemptState::Seeking { at },
                    Some(ProbeEvent::Error(e)) => AttemptState::Failed(AttemptFailure::Decode(e)),
                    Some(ProbeEvent::Aborted) => AttemptState::Failed(AttemptFailure::Aborted),
                    None => AttemptState::Failed(AttemptFailure::TimedOut),
                },
                AttemptState::Captured(frame) => return Ok(frame),
                AttemptState::Failed(failure) => return Err(failure),
            };
        }
    }

    fn next_event(&mut self, deadline: Instant) -> Option<ProbeEvent> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return None;
        }
        self.probe.wait_event(remaining)
    }

    /// Single exit routine for every terminal transition.
    fn teardown(&mut self) {
        if let Some(lease) = self.lease.take() {
            self.probe.detach();
            lease.release();
        }
    }
}

impl<P: MediaProbe> Drop for ThumbnailJob<'_, P> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use image::Rgba;

    use super::*;

    #[derive(Default)]
    struct ScriptedProbe {
        frames: VecDeque<Result<RgbaImage, MediaError>>,
        events: VecDeque<ProbeEvent>,
        silent: bool,
        abort_on_load: bool,
        loads: u32,
        reloads: u32,
        seeks: Vec<f64>,
        captures: u32,
        detaches: u32,
        bound_uri: Option<String>,
    }

    impl ScriptedProbe {
        fn with_frames(frames: Vec<RgbaImage>) -> Self {
            Self {
                frames: frames.into_iter().map(Ok).collect(),
                ..Default::default()
            }
        }

        fn queue_load_event(&mut self) {
            if self.silent {
                return;
            }
            if self.abort_on_load {
                self.events.push_back(ProbeEvent::Aborted);
            } else {
                self.events.push_back(ProbeEvent::MetadataLoaded);
            }
        }
    }

    impl MediaProbe for ScriptedProbe {
        fn load(&mut self, lease: &MediaLease) -> Result<(), MediaError> {
            self.loads += 1;
            self.bound_uri = Some(lease.uri().to_string());
            self.queue_load_event();
            Ok(())
        }

        fn reload(&mut self) -> Result<(), MediaError> {
            self.reloads += 1;
            self.queue_load_event();
            Ok(())
        }

        fn seek(&mut self, seconds: f64) -> Result<(), MediaError> {
            self.seeks.push(seconds);
            self.events.push_back(ProbeEvent::Seeked);
            Ok(())
        }

        fn wait_event(&mut self, _timeout: Duration) -> Option<ProbeEvent> {
            self.events.pop_front()
        }

        fn capture(&mut self, size: ThumbnailSize) -> Result<RgbaImage, MediaError> {
            self.captures += 1;
            self.frames
                .pop_front()
                .unwrap_or_else(|| Ok(RgbaImage::new(size.width, size.height)))
        }

        fn detach(&mut self) {
            self.detaches += 1;
            self.events.clear();
        }
    }

    fn source(bytes: u64) -> ThumbnailSource {
        ThumbnailSource {
            name: "clip.mp4".into(),
            path: PathBuf::from("/videos/clip.mp4"),
            byte_size: bytes,
        }
    }

    fn blank() -> RgbaImage {
        RgbaImage::from_pixel(160, 90, Rgba([0, 0, 0, 255]))
    }

    fn picture() -> RgbaImage {
        let mut img = blank();
        img.put_pixel(80, 45, Rgba([200, 120, 40, 255]));
        img
    }

    #[test]
    fn oversized_sources_never_touch_the_probe() {
        let registry = LeaseRegistry::new();
        let mut probe = ScriptedProbe::default();
        let outcome = extract_thumbnail(
            &mut probe,
            &registry,
            &source(100 * MIB + 1),
            ThumbnailSize::LIST_ROW,
            &ThumbnailPolicy::default(),
        );
        assert!(matches!(outcome, ThumbnailOutcome::Skipped));
        assert_eq!(probe.loads, 0);
        assert!(probe.seeks.is_empty());
        assert_eq!(registry.minted(), 0);
    }

    #[test]
    fn exactly_100_mib_is_still_attempted() {
        let registry = LeaseRegistry::new();
        let mut probe = ScriptedProbe::with_frames(vec![picture()]);
        let outcome = extract_thumbnail(
            &mut probe,
            &registry,
            &source(100 * MIB),
            ThumbnailSize::LIST_ROW,
            &ThumbnailPolicy::default(),
        );
        assert!(outcome.is_ready());
    }

    #[test]
    fn first_good_frame_is_encoded_and_lease_released() {
        let registry = LeaseRegistry::new();
        let mut probe = ScriptedProbe::with_frames(vec![picture()]);
        let outcome = extract_thumbnail(
            &mut probe,
            &registry,
            &source(5 * MIB),
            ThumbnailSize::LIST_ROW,
            &ThumbnailPolicy::default(),
        );

        let ThumbnailOutcome::Ready(thumb) = outcome else {
            panic!("expected a thumbnail, got {outcome:?}");
        };
        assert_eq!((thumb.width, thumb.height), (160, 90));
        assert_eq!(&thumb.jpeg[..2], &[0xFF, 0xD8]);
        assert_eq!(probe.seeks, vec![0.5]);
        assert!(probe.bound_uri.as_deref().unwrap().ends_with("clip.mp4"));
        assert_eq!(probe.detaches, 1);
        assert_eq!(registry.minted(), 1);
        assert_eq!(registry.released(), 1);
    }

    #[test]
    fn all_blank_frames_try_three_timestamps_then_placeholder() {
        let registry = LeaseRegistry::new();
        let mut probe = ScriptedProbe::with_frames(vec![blank(), blank(), blank()]);
        let outcome = extract_thumbnail(
            &mut probe,
            &registry,
            &source(60 * MIB),
            ThumbnailSize::LIST_ROW,
            &ThumbnailPolicy::default(),
        );

        assert!(matches!(
            outcome,
            ThumbnailOutcome::Placeholder {
                attempts: 3,
                last_failure: AttemptFailure::BlankFrame
            }
        ));
        assert_eq!(probe.seeks, vec![0.5, 1.0, 2.0]);
        assert_eq!(probe.loads, 1);
        assert_eq!(probe.reloads, 2);
        assert_eq!(probe.detaches, 1);
        assert_eq!(registry.minted(), 1);
        assert_eq!(registry.released(), 1);
        assert_eq!(registry.live(), 0);
    }

    #[test]
    fn retry_recovers_after_blank_and_decode_error() {
        let registry = LeaseRegistry::new();
        let mut probe = ScriptedProbe::default();
        probe.frames.push_back(Ok(blank()));
        probe
            .frames
            .push_back(Err(MediaError::Capture("no sample".into())));
        probe.frames.push_back(Ok(picture()));

        let outcome = extract_thumbnail(
            &mut probe,
            &registry,
            &source(MIB),
            ThumbnailSize::CARD,
            &ThumbnailPolicy::default(),
        );
        assert!(outcome.is_ready());
        assert_eq!(probe.seeks, vec![0.5, 1.0, 2.0]);
        assert_eq!(registry.live(), 0);
    }

    #[test]
    fn timeout_abandons_without_retry() {
        let registry = LeaseRegistry::new();
        let mut probe = ScriptedProbe {
            silent: true,
            ..Default::default()
        };
        let policy = ThumbnailPolicy {
            attempt_timeout: Duration::from_millis(5),
            ..Default::default()
        };
        let outcome = extract_thumbnail(
            &mut probe,
            &registry,
            &source(MIB),
            ThumbnailSize::LIST_ROW,
            &policy,
        );
        assert!(matches!(
            outcome,
            ThumbnailOutcome::Placeholder {
                attempts: 1,
                last_failure: AttemptFailure::TimedOut
            }
        ));
        assert_eq!(probe.reloads, 0);
        assert!(probe.seeks.is_empty());
        assert_eq!(probe.detaches, 1);
        assert_eq!(registry.released(), 1);
    }

    #[test]
    fn aborted_load_gives_up_immediately() {
        let registry = LeaseRegistry::new();
        let mut probe = ScriptedProbe {
            abort_on_load: true,
            ..Default::default()
        };
        let outcome = extract_thumbnail(
            &mut probe,
            &registry,
            &source(MIB),
            ThumbnailSize::LIST_ROW,
            &ThumbnailPolicy::default(),
        );
        assert!(matches!(
            outcome,
            ThumbnailOutcome::Placeholder {
                last_failure: AttemptFailure::Aborted,
                ..
            }
        ));
        assert_eq!(probe.captures, 0);
        assert_eq!(registry.live(), 0);
    }

    #[test]
    fn load_errors_are_retried() {
        let registry = LeaseRegistry::new();
        let mut probe = ScriptedProbe::with_frames(vec![picture()]);
        probe.events.push_back(ProbeEvent::Error("not a video".into()));

        let outcome = extract_thumbnail(
            &mut probe,
            &registry,
            &source(MIB),
            ThumbnailSize::LIST_ROW,
            &ThumbnailPolicy::default(),
        );
        assert!(outcome.is_ready());
        assert_eq!(probe.reloads, 1);
        assert_eq!(registry.released(), 1);
    }

    #[test]
    fn blank_detection_ignores_black_and_transparent_pixels() {
        assert!(!has_visible_content(&[0, 0, 0, 255, 0, 0, 0, 255]));
        assert!(!has_visible_content(&[255, 255, 255, 0, 9, 9, 9, 0]));
        assert!(has_visible_content(&[0, 0, 0, 255, 1, 0, 0, 1]));
        assert!(has_visible_content(&[30, 30, 30, 255]));
        assert!(!has_visible_content(&[]));
    }

    #[test]
    fn probe_timestamps_follow_attempt_number() {
        assert_eq!(probe_timestamp(0), 0.5);
        assert_eq!(probe_timestamp(1), 1.0);
        assert_eq!(probe_timestamp(2), 2.0);
    }
}
