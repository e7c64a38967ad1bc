pub mod channel_polling;
pub mod config;
pub mod import;
pub mod logging;
pub mod playback;
pub mod texture_cache;

pub mod workers {
    pub mod keyboard;
    pub mod thumbnail_worker;
}

use std::collections::HashMap;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use vidshelf_media::gst_player::GstPlayer;
use vidshelf_media::gst_probe::GstMediaProbe;
use vidshelf_media::lease::LeaseRegistry;
use vidshelf_state::entry::EntryId;
use vidshelf_state::project::AppState;
use vidshelf_state::recommend::CardId;
use vidshelf_state::thumbnail::Liveness;
use vidshelf_ui::library::LibraryAction;
use vidshelf_ui::player::PlayerAction;
use vidshelf_ui::recommend::RecommendAction;

use crate::config::AppConfig;
use crate::playback::{PlayRequest, PlaybackController};
use crate::texture_cache::ThumbnailCache;
use crate::workers::thumbnail_worker::{spawn_thumbnail_workers, ThumbnailWorkerChannels};

pub struct VidshelfApp {
    state: AppState,
    config: AppConfig,
    rng: StdRng,
    textures: ThumbnailCache,
    thumbnails: ThumbnailWorkerChannels,
    card_liveness: HashMap<CardId, Liveness>,
    playback: PlaybackController<GstPlayer>,
}

impl VidshelfApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        vidshelf_ui::theme::apply_theme(&cc.egui_ctx);

        let leases = LeaseRegistry::new();
        let thumbnails = spawn_thumbnail_workers(
            config.thumbnail_workers,
            config.thumbnail_policy(),
            leases.clone(),
            GstMediaProbe::new,
        );
        let playback = PlaybackController::new(GstPlayer::new(), leases);

        let state = AppState {
            recommendation_count: config.recommendation_count,
            ..AppState::default()
        };

        Self {
            state,
            config,
            rng: StdRng::from_entropy(),
            textures: ThumbnailCache::default(),
            thumbnails,
            card_liveness: HashMap::new(),
            playback,
        }
    }

    fn play_row(&mut self, id: EntryId) {
        let Some(entry) = self.state.library.entry(&id) else {
            return;
        };
        let request = PlayRequest {
            row: Some(id),
            name: entry.name.clone(),
            path: entry.path.clone(),
        };
        self.playback.select(request);
    }

    fn play_card(&mut self, card: CardId) {
        let Some(rec) = self.state.recommendation(&card) else {
            return;
        };
        match self.state.resolve_card_row(rec) {
            Some(row) => self.play_row(row),
            None => {
                tracing::debug!(title = %rec.title, "card has no matching row, playing file");
                let request = PlayRequest {
                    row: None,
                    name: rec.title.clone(),
                    path: rec.path.clone(),
                };
                self.playback.select(request);
            }
        }
    }
}

impl eframe::App for VidshelfApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_thumbnail_results(ctx);
        self.poll_playback(ctx);
        workers::keyboard::handle_keyboard(ctx, &mut self.playback);

        let mut library_action = LibraryAction::None;
        let mut recommend_action = RecommendAction::None;
        let mut player_action = PlayerAction::None;

        egui::SidePanel::left("library_panel")
            .resizable(true)
            .default_width(vidshelf_ui::constants::SIDE_PANEL_WIDTH)
            .width_range(240.0..=720.0)
            .show(ctx, |ui| {
                library_action = vidshelf_ui::library::library_panel(
                    ui,
                    &self.state,
                    self.playback.active_row(),
                    &self.textures,
                );
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let player_height = (ui.available_height() * 0.6).max(200.0);
            player_action = vidshelf_ui::player::player_panel(
                ui,
                self.playback.now_playing(),
                self.playback.state(),
                &self.textures,
                player_height,
            );
            ui.add_space(8.0);
            egui::ScrollArea::vertical()
                .id_salt("recommend_scroll")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    recommend_action =
                        vidshelf_ui::recommend::recommend_panel(ui, &self.state, &self.textures);
                });
        });

        match library_action {
            LibraryAction::None => {}
            LibraryAction::OpenFolder(path) => self.open_folder(path),
            LibraryAction::Play(id) => self.play_row(id),
            LibraryAction::Delete(id) => self.confirm_and_delete(id),
        }
        if let RecommendAction::Play(card) = recommend_action {
            self.play_card(card);
        }
        match player_action {
            PlayerAction::None => {}
            PlayerAction::TogglePause => self.playback.toggle_pause(),
            PlayerAction::Stop => self.playback.stop(),
        }

        if self.playback.state().is_active() {
            ctx.request_repaint();
        } else if self.textures.has_pending() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}

impl Drop for VidshelfApp {
    fn drop(&mut self) {
        self.playback.shutdown();
        for liveness in self.card_liveness.values() {
            liveness.kill();
        }
        self.state.library.retire();
    }
}
