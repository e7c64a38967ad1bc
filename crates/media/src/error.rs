use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("GStreamer initialization failed: {0}")]
    Init(String),

    #[error("failed to create {factory}: {message}")]
    Element { factory: String, message: String },

    #[error("pipeline error: {0}")]
    Pipeline(String),

    #[error("seek to {seconds:.2}s failed: {message}")]
    Seek { seconds: f64, message: String },

    #[error("frame capture failed: {0}")]
    Capture(String),

    #[error("thumbnail encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("cannot read folder {}: {source}", path.display())]
    ReadFolder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("no source is bound to the player")]
    NoSource,

    #[error("playback was rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Media(#[from] MediaError),
}
