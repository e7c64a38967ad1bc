use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;

use crate::error::{MediaError, PlayerError};
use crate::gst_init::*;
use crate::lease::MediaLease;
use crate::pipeline::DecodedFrame;
use crate::player::{PlayerEvent, VideoPlayer};

struct PlayerSession {
    playbin: gst::Element,
    appsink: gst_app::AppSink,
    bus: gst::Bus,
    frame_rx: mpsc::Receiver<DecodedFrame>,
    stop_tx: mpsc::Sender<()>,
    bridge: Option<JoinHandle<()>>,
    metadata_reported: bool,
}

/// `playbin` with an RGBA appsink as its video sink. Decoded frames are
/// bridged to the UI thread over a small channel; audio goes to the
/// default output.
#[derive(Default)]
pub struct GstPlayer {
    session: Option<PlayerSession>,
}

impl GstPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    fn open(lease: &MediaLease) -> Result<PlayerSession, MediaError> {
        init_once()?;

        let appsink = gst_app::AppSink::builder()
            .caps(&build_rgba_caps())
            .max_buffers(4)
            .drop(true)
            .sync(true)
            .build();

        let playbin = gst::ElementFactory::make("playbin")
            .property("uri", lease.uri())
            .property("video-sink", appsink.upcast_ref::<gst::Element>())
            .build()
            .map_err(|e| MediaError::Element {
                factory: "playbin".into(),
                message: e.to_string(),
            })?;

        let bus = playbin
            .bus()
            .ok_or_else(|| MediaError::Pipeline("no bus".into()))?;

        if let Err(e) = playbin.set_state(gst::State::Paused) {
            let _ = playbin.set_state(gst::State::Null);
            return Err(MediaError::Pipeline(format!("failed to set Paused: {e}")));
        }

        let (frame_tx, frame_rx) = mpsc::sync_channel::<DecodedFrame>(4);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let bridge = {
            let video_sink = appsink.clone();
            std::thread::Builder::new()
                .name("player-video-bridge".into())
                .spawn(move || loop {
                    if stop_rx.try_recv().is_ok() {
                        return;
                    }

                    let Some(sample) =
                        video_sink.try_pull_sample(gst::ClockTime::from_mseconds(8))
                    else {
                        if video_sink.is_eos() {
                            std::thread::sleep(Duration::from_millis(8));
                        }
                        continue;
                    };

                    let Some((width, height)) = sample_dimensions(&sample) else {
                        continue;
                    };
                    let pts_seconds = sample
                        .buffer()
                        .and_then(|b| b.pts())
                        .map(seconds)
                        .unwrap_or(0.0);
                    let Ok(image) = rgba_from_sample(&sample, width, height) else {
                        continue;
                    };

                    let frame = DecodedFrame {
                        pts_seconds,
                        width,
                        height,
                        rgba_data: image.into_raw(),
                    };
                    match frame_tx.try_send(frame) {
                        Ok(()) | Err(mpsc::TrySendError::Full(_)) => {}
                        Err(mpsc::TrySendError::Disconnected(_)) => return,
                    }
                })
                .map_err(|e| MediaError::Pipeline(format!("failed to spawn bridge: {e}")))?
        };

        Ok(PlayerSession {
            playbin,
            appsink,
            bus,
            frame_rx,
            stop_tx,
            bridge: Some(bridge),
            metadata_reported: false,
        })
    }

    fn metadata_event(session: &PlayerSession) -> PlayerEvent {
        let duration = session
            .playbin
            .query_duration::<gst::ClockTime>()
            .map(seconds);
        let resolution = session
            .appsink
            .static_pad("sink")
            .and_then(|pad| pad.current_caps())
            .and_then(|caps| gstreamer_video::VideoInfo::from_caps(&caps).ok())
            .map(|info| (info.width(), info.height()));
        PlayerEvent::MetadataLoaded {
            duration,
            resolution,
        }
    }
}

impl VideoPlayer for GstPlayer {
    fn detach_handlers(&mut self) {
        if let Some(session) = &self.session {
            while session.bus.pop().is_some() {}
            while session.frame_rx.try_recv().is_ok() {}
        }
    }

    fn pause(&mut self) {
        if let Some(session) = &self.session {
            let _ = session.playbin.set_state(gst::State::Paused);
        }
    }

    fn set_source(&mut self, lease: &MediaLease) -> Result<(), PlayerError> {
        self.stop();
        self.session = Some(Self::open(lease)?);
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        let session = self.session.as_ref().ok_or(PlayerError::NoSource)?;
        session
            .playbin
            .set_state(gst::State::Playing)
            .map(|_| ())
            .map_err(|e| PlayerError::Rejected(e.to_string()))
    }

    fn stop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        let _ = session.stop_tx.send(());
        let _ = session.playbin.set_state(gst::State::Null);
        let _ = session.playbin.state(gst::ClockTime::from_seconds(2));
        if let Some(handle) = session.bridge.take() {
            let _ = handle.join();
        }
    }

    fn poll_events(&mut self) -> Vec<PlayerEvent> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };

        let mut events = Vec::new();
        while let Some(msg) = session.bus.pop() {
            match msg.view() {
                gst::MessageView::Eos(_) => events.push(PlayerEvent::Ended),
                gst::MessageView::Error(err) => {
                    let detail = err.debug().map(|d| d.to_string()).unwrap_or_default();
                    events.push(PlayerEvent::Error(format!("{} {detail}", err.error())));
                }
                gst::MessageView::AsyncDone(_) if !session.metadata_reported => {
                    session.metadata_reported = true;
                    events.push(Self::metadata_event(session));
                }
                _ => {}
            }
        }
        events
    }

    fn latest_frame(&mut self) -> Option<DecodedFrame> {
        let session = self.session.as_ref()?;
        let mut latest = None;
        while let Ok(frame) = session.frame_rx.try_recv() {
            latest = Some(frame);
        }
        latest
    }
}

impl Drop for GstPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}
