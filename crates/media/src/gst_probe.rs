use std::time::{Duration, Instant};

use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use image::imageops::FilterType;

use crate::error::MediaError;
use crate::gst_init::*;
use crate::lease::MediaLease;
use crate::thumbnail::{MediaProbe, ProbeEvent, ThumbnailSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Nothing,
    Metadata,
    Seek,
}

struct ProbeSession {
    pipeline: gst::Pipeline,
    appsink: gst_app::AppSink,
    bus: gst::Bus,
}

/// Paused `uridecodebin` pipeline that scales decoded video into an RGBA
/// appsink. Prerolling stands in for "metadata loaded" and a flushing seek
/// in PAUSED produces a fresh preroll frame at the probe timestamp.
pub struct GstMediaProbe {
    size: ThumbnailSize,
    uri: Option<String>,
    session: Option<ProbeSession>,
    pending: Pending,
}

impl GstMediaProbe {
    pub fn new(size: ThumbnailSize) -> Self {
        Self {
            size,
            uri: None,
            session: None,
            pending: Pending::Nothing,
        }
    }

    fn start(&mut self) -> Result<(), MediaError> {
        self.teardown_session();
        init_once()?;

        let uri = self
            .uri
            .clone()
            .ok_or_else(|| MediaError::Pipeline("no source bound".into()))?;

        let pipeline = gst::Pipeline::new();
        let uridecodebin = gst::ElementFactory::make("uridecodebin")
            .property("uri", uri.as_str())
            .build()
            .map_err(|e| MediaError::Element {
                factory: "uridecodebin".into(),
                message: e.to_string(),
            })?;
        let videoconvert = make_element("videoconvert")?;
        let videoscale = make_element("videoscale")?;

        let appsink = gst_app::AppSink::builder()
            .caps(&build_video_caps(self.size.width, self.size.height))
            .max_buffers(1)
            .sync(false)
            .build();

        pipeline
            .add_many([
                &uridecodebin,
                &videoconvert,
                &videoscale,
                appsink.upcast_ref::<gst::Element>(),
            ])
            .map_err(|e| MediaError::Pipeline(format!("failed to add elements: {e}")))?;
        gst::Element::link_many([
            &videoconvert,
            &videoscale,
            appsink.upcast_ref::<gst::Element>(),
        ])
        .map_err(|e| MediaError::Pipeline(format!("failed to link video chain: {e}")))?;

        connect_decodebin_video_only(&uridecodebin, &videoconvert);

        let bus = pipeline
            .bus()
            .ok_or_else(|| MediaError::Pipeline("no bus".into()))?;

        if let Err(e) = pipeline.set_state(gst::State::Paused) {
            let _ = pipeline.set_state(gst::State::Null);
            return Err(MediaError::Pipeline(format!("failed to set Paused: {e}")));
        }

        self.session = Some(ProbeSession {
            pipeline,
            appsink,
            bus,
        });
        self.pending = Pending::Metadata;
        Ok(())
    }

    fn teardown_session(&mut self) {
        self.pending = Pending::Nothing;
        if let Some(session) = self.session.take() {
            let _ = session.pipeline.set_state(gst::State::Null);
            let _ = session.pipeline.state(gst::ClockTime::from_seconds(2));
        }
    }
}

impl MediaProbe for GstMediaProbe {
    fn load(&mut self, lease: &MediaLease) -> Result<(), MediaError> {
        self.uri = Some(lease.uri().to_string());
        self.start()
    }

    fn reload(&mut self) -> Result<(), MediaError> {
        self.start()
    }

    fn seek(&mut self, seconds: f64) -> Result<(), MediaError> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| MediaError::Pipeline("probe is not loaded".into()))?;
        session
            .pipeline
            .seek_simple(
                gst::SeekFlags::FLUSH | gst::SeekFlags::ACCURATE,
                clock_time(seconds),
            )
            .map_err(|e| MediaError::Seek {
                seconds,
                message: e.to_string(),
            })?;
        self.pending = Pending::Seek;
        Ok(())
    }

    fn wait_event(&mut self, timeout: Duration) -> Option<ProbeEvent> {
        let Some(session) = self.session.as_ref() else {
            return Some(ProbeEvent::Aborted);
        };
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            let wait = gst::ClockTime::from_nseconds(remaining.as_nanos() as u64);
            let msg = session.bus.timed_pop(wait)?;

            match msg.view() {
                gst::MessageView::AsyncDone(_) => {
                    let pending = std::mem::replace(&mut self.pending, Pending::Nothing);
                    match pending {
                        Pending::Metadata => return Some(ProbeEvent::MetadataLoaded),
                        Pending::Seek => return Some(ProbeEvent::Seeked),
                        Pending::Nothing => {}
                    }
                }
                gst::MessageView::Error(err) => {
                    return Some(ProbeEvent::Error(err.error().to_string()));
                }
                gst::MessageView::Eos(_) => return Some(ProbeEvent::Aborted),
                _ => {}
            }
        }
    }

    fn capture(&mut self, size: ThumbnailSize) -> Result<image::RgbaImage, MediaError> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| MediaError::Capture("probe is not loaded".into()))?;
        let sample = session
            .appsink
            .pull_preroll()
            .map_err(|e| MediaError::Capture(e.to_string()))?;

        let frame = rgba_from_sample(&sample, self.size.width, self.size.height)?;
        if size == self.size {
            return Ok(frame);
        }
        Ok(image::imageops::resize(
            &frame,
            size.width,
            size.height,
            FilterType::Triangle,
        ))
    }

    fn detach(&mut self) {
        self.teardown_session();
    }
}

impl Drop for GstMediaProbe {
    fn drop(&mut self) {
        self.teardown_session();
    }
}
