use egui::{vec2, Rect, Sense, Stroke, StrokeKind};
use vidshelf_state::project::AppState;
use vidshelf_state::recommend::{CardId, Recommendation};
use vidshelf_state::thumbnail::ThumbnailTarget;

use crate::constants;
use crate::library::paint_thumbnail;
use crate::theme;
use crate::ThumbnailLookup;

pub enum RecommendAction {
    None,
    Play(CardId),
}

pub fn recommend_panel(
    ui: &mut egui::Ui,
    state: &AppState,
    textures: &dyn ThumbnailLookup,
) -> RecommendAction {
    let mut action = RecommendAction::None;

    ui.heading("Recommended");
    ui.separator();

    if state.recommendations.is_empty() {
        ui.colored_label(theme::TEXT_DIM, "Nothing to recommend yet.");
        return action;
    }

    let available_width = ui.available_width().max(1.0);
    let cols = ((available_width + constants::GRID_SPACING)
        / (constants::MIN_CARD_W + constants::GRID_SPACING))
        .floor()
        .max(1.0) as usize;
    let cols = cols.min(state.recommendations.len());
    let card_w = (available_width - constants::GRID_SPACING * (cols.saturating_sub(1) as f32))
        / cols as f32;
    let thumb_size = vec2(
        card_w,
        card_w * (constants::CARD_THUMB_SIZE.y / constants::CARD_THUMB_SIZE.x),
    );

    egui::Grid::new(egui::Id::new("recommend_grid").with(cols))
        .spacing(vec2(constants::GRID_SPACING, constants::GRID_SPACING))
        .show(ui, |ui| {
            for (i, rec) in state.recommendations.iter().enumerate() {
                if recommendation_card(ui, rec, thumb_size, textures) {
                    action = RecommendAction::Play(rec.card);
                }
                if (i + 1) % cols == 0 {
                    ui.end_row();
                }
            }
        });

    action
}

fn recommendation_card(
    ui: &mut egui::Ui,
    rec: &Recommendation,
    thumb_size: egui::Vec2,
    textures: &dyn ThumbnailLookup,
) -> bool {
    let (rect, response) =
        ui.allocate_exact_size(thumb_size + vec2(0.0, 40.0), Sense::click());
    if !ui.is_rect_visible(rect) {
        return response.clicked();
    }

    let thumb_rect = Rect::from_min_size(rect.min, thumb_size);
    paint_thumbnail(ui, thumb_rect, &ThumbnailTarget::Card(rec.card), textures, 36.0);

    let badge_text = rec.duration.to_string();
    let badge_rect = Rect::from_min_size(
        thumb_rect.right_bottom() - vec2(44.0, 20.0),
        vec2(40.0, 16.0),
    );
    ui.painter()
        .rect_filled(badge_rect, theme::ROUNDING_SM, theme::BADGE_BG);
    ui.painter().text(
        badge_rect.center(),
        egui::Align2::CENTER_CENTER,
        badge_text,
        egui::FontId::monospace(10.0),
        egui::Color32::WHITE,
    );

    if response.hovered() {
        ui.painter().rect_stroke(
            thumb_rect,
            theme::ROUNDING_SM,
            Stroke::new(2.0, theme::ACCENT),
            StrokeKind::Outside,
        );
    }

    let title = if rec.title.chars().count() > 28 {
        let head: String = rec.title.chars().take(25).collect();
        format!("{head}...")
    } else {
        rec.title.clone()
    };
    ui.painter().text(
        egui::pos2(rect.min.x, thumb_rect.max.y + 4.0),
        egui::Align2::LEFT_TOP,
        title,
        egui::FontId::proportional(12.0),
        theme::TEXT_PRIMARY,
    );
    ui.painter().text(
        egui::pos2(rect.min.x, thumb_rect.max.y + 22.0),
        egui::Align2::LEFT_TOP,
        rec.meta_line(),
        egui::FontId::proportional(10.0),
        theme::TEXT_DIM,
    );

    response.on_hover_text(rec.title.as_str()).clicked()
}
