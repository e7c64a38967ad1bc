use crate::error::PlayerError;
use crate::lease::MediaLease;
use crate::pipeline::DecodedFrame;

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    MetadataLoaded {
        duration: Option<f64>,
        resolution: Option<(u32, u32)>,
    },
    Ended,
    Error(String),
}

/// The single visible player. Only the playback controller drives it.
pub trait VideoPlayer {
    /// Forgets events queued for the previous source.
    fn detach_handlers(&mut self);
    fn pause(&mut self);
    fn set_source(&mut self, lease: &MediaLease) -> Result<(), PlayerError>;
    fn play(&mut self) -> Result<(), PlayerError>;
    /// Drops the current source and returns to idle.
    fn stop(&mut self);
    fn poll_events(&mut self) -> Vec<PlayerEvent>;
    fn latest_frame(&mut self) -> Option<DecodedFrame>;
}
