use std::collections::{HashMap, HashSet};

use vidshelf_media::thumbnail::EncodedThumbnail;
use vidshelf_state::thumbnail::ThumbnailTarget;

#[derive(Default)]
pub struct ThumbnailCache {
    pub thumbnails: HashMap<ThumbnailTarget, egui::TextureHandle>,
    pub pending: HashSet<ThumbnailTarget>,
    pub playback_texture: Option<egui::TextureHandle>,
}

impl ThumbnailCache {
    pub fn mark_pending(&mut self, target: ThumbnailTarget) {
        self.pending.insert(target);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn insert_ready(
        &mut self,
        ctx: &egui::Context,
        target: ThumbnailTarget,
        thumb: &EncodedThumbnail,
    ) -> Result<(), image::ImageError> {
        self.pending.remove(&target);
        let image = decode_thumbnail(thumb)?;
        let texture = ctx.load_texture(
            format!("thumb_{target:?}"),
            image,
            egui::TextureOptions::LINEAR,
        );
        self.thumbnails.insert(target, texture);
        Ok(())
    }

    /// Extraction finished without a frame; the placeholder becomes final.
    pub fn settle(&mut self, target: &ThumbnailTarget) {
        self.pending.remove(target);
    }

    pub fn forget(&mut self, target: &ThumbnailTarget) {
        self.pending.remove(target);
        self.thumbnails.remove(target);
    }

    pub fn clear_thumbnails(&mut self) {
        self.pending.clear();
        self.thumbnails.clear();
    }

    pub fn update_playback_texture(
        &mut self,
        ctx: &egui::Context,
        width: usize,
        height: usize,
        rgba_data: &[u8],
    ) {
        let image = egui::ColorImage::from_rgba_unmultiplied([width, height], rgba_data);
        if let Some(ref mut handle) = self.playback_texture {
            let [tw, th] = handle.size();
            if tw == width && th == height {
                handle.set(image, egui::TextureOptions::LINEAR);
                return;
            }
        }
        let texture = ctx.load_texture("playback_frame", image, egui::TextureOptions::LINEAR);
        self.playback_texture = Some(texture);
    }
}

pub fn decode_thumbnail(thumb: &EncodedThumbnail) -> Result<egui::ColorImage, image::ImageError> {
    let rgba =
        image::load_from_memory_with_format(&thumb.jpeg, image::ImageFormat::Jpeg)?.to_rgba8();
    Ok(egui::ColorImage::from_rgba_unmultiplied(
        [rgba.width() as usize, rgba.height() as usize],
        rgba.as_raw(),
    ))
}

impl vidshelf_ui::ThumbnailLookup for ThumbnailCache {
    fn thumbnail(&self, target: &ThumbnailTarget) -> Option<&egui::TextureHandle> {
        self.thumbnails.get(target)
    }

    fn is_pending(&self, target: &ThumbnailTarget) -> bool {
        self.pending.contains(target)
    }

    fn playback_frame(&self) -> Option<&egui::TextureHandle> {
        self.playback_texture.as_ref()
    }
}
