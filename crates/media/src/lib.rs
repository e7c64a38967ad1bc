pub mod error;
pub mod gst_init;
pub mod gst_player;
pub mod gst_probe;
pub mod import;
pub mod lease;
pub mod pipeline;
pub mod player;
pub mod thumbnail;
