use std::sync::OnceLock;

use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_video as gst_video;

use crate::error::MediaError;

pub fn init_once() -> Result<(), MediaError> {
    static INIT: OnceLock<Result<(), String>> = OnceLock::new();
    INIT.get_or_init(|| gst::init().map_err(|e| e.to_string()))
        .clone()
        .map_err(MediaError::Init)
}

pub(crate) fn make_element(factory_name: &str) -> Result<gst::Element, MediaError> {
    gst::ElementFactory::make(factory_name)
        .build()
        .map_err(|e| MediaError::Element {
            factory: factory_name.to_string(),
            message: e.to_string(),
        })
}

pub(crate) fn build_video_caps(target_w: u32, target_h: u32) -> gst::Caps {
    gst_video::VideoCapsBuilder::new()
        .format(gst_video::VideoFormat::Rgba)
        .width(target_w as i32)
        .height(target_h as i32)
        .build()
}

pub(crate) fn build_rgba_caps() -> gst::Caps {
    gst_video::VideoCapsBuilder::new()
        .format(gst_video::VideoFormat::Rgba)
        .build()
}

pub(crate) fn connect_decodebin_video_only(decodebin: &gst::Element, videoconvert: &gst::Element) {
    let videoconvert_weak = videoconvert.downgrade();
    decodebin.connect_pad_added(move |_dbin, src_pad| {
        let caps = match src_pad.current_caps() {
            Some(c) => c,
            None => src_pad.query_caps(None),
        };
        let Some(structure) = caps.structure(0) else {
            return;
        };
        if !structure.name().as_str().starts_with("video/") {
            return;
        }
        let Some(vc) = videoconvert_weak.upgrade() else {
            return;
        };
        let Some(sink_pad) = vc.static_pad("sink") else {
            return;
        };
        if !sink_pad.is_linked() {
            if let Err(e) = src_pad.link(&sink_pad) {
                tracing::debug!("failed to link decoded video pad: {e:?}");
            }
        }
    });
}

pub(crate) fn clock_time(seconds: f64) -> gst::ClockTime {
    gst::ClockTime::from_nseconds((seconds.max(0.0) * 1_000_000_000.0) as u64)
}

pub(crate) fn seconds(time: gst::ClockTime) -> f64 {
    time.nseconds() as f64 / 1_000_000_000.0
}

/// Copies an RGBA sample into an image, padding or truncating to the
/// expected size.
pub(crate) fn rgba_from_sample(
    sample: &gst::Sample,
    width: u32,
    height: u32,
) -> Result<image::RgbaImage, MediaError> {
    let buffer = sample
        .buffer()
        .ok_or_else(|| MediaError::Capture("sample has no buffer".into()))?;
    let map = buffer
        .map_readable()
        .map_err(|e| MediaError::Capture(e.to_string()))?;
    let data = map.as_slice();

    let expected_size = (width as usize) * (height as usize) * 4;
    let mut rgba = Vec::with_capacity(expected_size);
    if data.len() >= expected_size {
        rgba.extend_from_slice(&data[..expected_size]);
    } else {
        rgba.extend_from_slice(data);
        rgba.resize(expected_size, 0);
    }

    image::RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| MediaError::Capture("frame size mismatch".into()))
}

/// Width and height negotiated on a sample.
pub(crate) fn sample_dimensions(sample: &gst::Sample) -> Option<(u32, u32)> {
    let caps = sample.caps()?;
    let info = gst_video::VideoInfo::from_caps(caps).ok()?;
    Some((info.width(), info.height()))
}
