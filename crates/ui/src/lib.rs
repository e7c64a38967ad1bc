pub mod constants;
pub mod library;
pub mod player;
pub mod recommend;
pub mod theme;

use vidshelf_state::thumbnail::ThumbnailTarget;

pub trait ThumbnailLookup {
    fn thumbnail(&self, target: &ThumbnailTarget) -> Option<&egui::TextureHandle>;
    fn is_pending(&self, target: &ThumbnailTarget) -> bool;
    fn playback_frame(&self) -> Option<&egui::TextureHandle>;
}
