use vidshelf_media::thumbnail::ThumbnailOutcome;
use vidshelf_state::thumbnail::ThumbnailTarget;

use crate::VidshelfApp;

impl VidshelfApp {
    pub fn poll_thumbnail_results(&mut self, ctx: &egui::Context) {
        let mut received = false;

        while let Ok(result) = self.thumbnails.result_rx.try_recv() {
            let still_shown = match &result.target {
                ThumbnailTarget::Row(id) => self.state.library.contains(id),
                ThumbnailTarget::Card(card) => self.card_liveness.contains_key(card),
            };
            if !still_shown {
                tracing::trace!(slot = ?result.target, "dropping thumbnail for removed slot");
                continue;
            }

            match result.outcome {
                ThumbnailOutcome::Ready(thumb) => {
                    if let Err(e) = self.textures.insert_ready(ctx, result.target, &thumb) {
                        tracing::warn!("could not decode thumbnail: {e}");
                        self.textures.settle(&result.target);
                    }
                }
                ThumbnailOutcome::Skipped | ThumbnailOutcome::Placeholder { .. } => {
                    self.textures.settle(&result.target);
                }
            }
            received = true;
        }

        if received {
            ctx.request_repaint();
        }
    }

    pub fn poll_playback(&mut self, ctx: &egui::Context) {
        self.playback.poll();
        if let Some(frame) = self.playback.latest_frame() {
            self.textures.update_playback_texture(
                ctx,
                frame.width as usize,
                frame.height as usize,
                &frame.rgba_data,
            );
        }
    }
}
