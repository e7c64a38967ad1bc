use vidshelf_state::playback::PlaybackState;

use crate::constants;
use crate::theme;
use crate::ThumbnailLookup;

pub enum PlayerAction {
    None,
    TogglePause,
    Stop,
}

pub fn player_panel(
    ui: &mut egui::Ui,
    now_playing: Option<&str>,
    state: PlaybackState,
    textures: &dyn ThumbnailLookup,
    max_height: f32,
) -> PlayerAction {
    let mut action = PlayerAction::None;
    let available = egui::vec2(ui.available_width(), max_height);
    let transport_height = 36.0;
    let video_area = egui::vec2(available.x, (available.y - transport_height).max(0.0));

    match textures.playback_frame() {
        Some(tex) if state.is_active() => show_frame_texture(ui, tex, video_area),
        _ => {
            let (rect, _) = ui.allocate_exact_size(video_area, egui::Sense::hover());
            ui.painter().rect_filled(rect, theme::ROUNDING, theme::BG_DARK);
            let message = match now_playing {
                Some(name) if !state.is_active() => format!("{name} is not playing"),
                _ => "Select a video to play".to_string(),
            };
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                message,
                egui::FontId::proportional(14.0),
                theme::TEXT_DIM,
            );
        }
    }

    ui.horizontal(|ui| {
        let btn = constants::TRANSPORT_BTN_SIZE;
        let is_playing = state == PlaybackState::Playing;

        let play_label = if is_playing { "\u{23F8}" } else { "\u{25B6}" };
        if ui
            .add_enabled(state.is_active(), egui::Button::new(play_label).min_size(btn))
            .on_hover_text(if is_playing { "Pause" } else { "Resume" })
            .clicked()
        {
            action = PlayerAction::TogglePause;
        }

        if ui
            .add_enabled(state.is_active(), egui::Button::new("\u{25FC}").min_size(btn))
            .on_hover_text("Stop")
            .clicked()
        {
            action = PlayerAction::Stop;
        }

        ui.add_space(8.0);
        if let Some(name) = now_playing {
            ui.label(
                egui::RichText::new(name)
                    .font(egui::FontId::proportional(13.0))
                    .color(theme::TEXT_PRIMARY),
            );
        }
    });

    action
}

fn show_frame_texture(ui: &mut egui::Ui, tex: &egui::TextureHandle, available: egui::Vec2) {
    let tex_size = tex.size_vec2();
    let scale = (available.x / tex_size.x).min(available.y / tex_size.y);
    let display_size = tex_size * scale;

    let (rect, _) = ui.allocate_exact_size(available, egui::Sense::hover());
    ui.painter().rect_filled(rect, egui::CornerRadius::ZERO, egui::Color32::BLACK);
    let frame_rect = egui::Rect::from_center_size(rect.center(), display_size);
    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    ui.painter()
        .image(tex.id(), frame_rect, uv, egui::Color32::WHITE);
}
