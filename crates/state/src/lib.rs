pub mod entry;
pub mod intake;
pub mod library;
pub mod playback;
pub mod project;
pub mod recommend;
pub mod thumbnail;
