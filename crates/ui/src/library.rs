use std::path::PathBuf;

use egui::{vec2, Color32, Rect, Sense, Stroke, StrokeKind};
use vidshelf_state::entry::{EntryId, VideoEntry};
use vidshelf_state::intake::folder_label;
use vidshelf_state::project::{AppState, LibraryStatus};
use vidshelf_state::thumbnail::ThumbnailTarget;

use crate::constants;
use crate::theme;
use crate::ThumbnailLookup;

pub enum LibraryAction {
    None,
    OpenFolder(PathBuf),
    Play(EntryId),
    Delete(EntryId),
}

pub fn library_panel(
    ui: &mut egui::Ui,
    state: &AppState,
    active_row: Option<EntryId>,
    textures: &dyn ThumbnailLookup,
) -> LibraryAction {
    let mut action = LibraryAction::None;

    ui.horizontal(|ui| {
        ui.heading("Library");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Open Folder").clicked() {
                if let Some(path) = rfd::FileDialog::new().pick_folder() {
                    action = LibraryAction::OpenFolder(path);
                }
            }
        });
    });
    ui.separator();

    match &state.status {
        LibraryStatus::AwaitingSelection => {
            ui.colored_label(theme::TEXT_DIM, "Open a folder to load videos");
            return action;
        }
        LibraryStatus::NoSupportedFiles => {
            ui.colored_label(
                theme::TEXT_DIM,
                "No supported video files in the selected folder",
            );
            return action;
        }
        LibraryStatus::ScanFailed(reason) => {
            ui.colored_label(
                theme::ACCENT,
                "Could not read the selected folder, please retry",
            )
            .on_hover_text(reason.as_str());
            return action;
        }
        LibraryStatus::Loaded => {}
    }

    ui.colored_label(
        theme::TEXT_DIM,
        format!("{} videos", state.library.len()),
    );

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for group in state.library.groups() {
                ui.add_space(4.0);
                ui.label(
                    egui::RichText::new(format!("\u{1F4C1} {}", folder_label(&group.folder)))
                        .strong()
                        .color(theme::TEXT_PRIMARY),
                );
                for id in &group.entries {
                    let Some(entry) = state.library.entry(id) else {
                        continue;
                    };
                    let is_active = active_row == Some(*id);
                    match video_row(ui, entry, is_active, textures) {
                        LibraryAction::None => {}
                        row_action => action = row_action,
                    }
                }
            }
        });

    action
}

fn video_row(
    ui: &mut egui::Ui,
    entry: &VideoEntry,
    is_active: bool,
    textures: &dyn ThumbnailLookup,
) -> LibraryAction {
    let width = ui.available_width().max(constants::ROW_THUMB_SIZE.x * 2.0);
    let (rect, response) =
        ui.allocate_exact_size(vec2(width, constants::ROW_HEIGHT), Sense::click());

    if !ui.is_rect_visible(rect) {
        return LibraryAction::None;
    }

    if is_active {
        ui.painter()
            .rect_filled(rect, theme::ROUNDING, theme::BG_ROW_ACTIVE);
        ui.painter().rect_stroke(
            rect,
            theme::ROUNDING,
            Stroke::new(1.0, theme::ACCENT),
            StrokeKind::Inside,
        );
    } else if response.hovered() {
        ui.painter()
            .rect_filled(rect, theme::ROUNDING, theme::BG_SURFACE);
    }

    let delete_rect = Rect::from_center_size(
        egui::pos2(
            rect.right() - constants::DELETE_BTN_SIZE.x / 2.0 - 6.0,
            rect.center().y,
        ),
        constants::DELETE_BTN_SIZE,
    );
    let delete = ui
        .put(delete_rect, egui::Button::new("\u{1F5D1}"))
        .on_hover_text("Remove from list");

    let thumb_rect = Rect::from_min_size(
        rect.min + vec2(4.0, (rect.height() - constants::ROW_THUMB_SIZE.y) / 2.0),
        constants::ROW_THUMB_SIZE,
    );
    let target = ThumbnailTarget::Row(entry.id);
    paint_thumbnail(ui, thumb_rect, &target, textures, 20.0);

    let text_x = thumb_rect.right() + 10.0;
    ui.painter().text(
        egui::pos2(text_x, rect.center().y - 9.0),
        egui::Align2::LEFT_CENTER,
        &entry.name,
        egui::FontId::proportional(13.0),
        theme::TEXT_PRIMARY,
    );
    ui.painter().text(
        egui::pos2(text_x, rect.center().y + 10.0),
        egui::Align2::LEFT_CENTER,
        entry.display_size(),
        egui::FontId::proportional(11.0),
        theme::TEXT_DIM,
    );

    if delete.clicked() {
        LibraryAction::Delete(entry.id)
    } else if response.clicked() {
        LibraryAction::Play(entry.id)
    } else {
        LibraryAction::None
    }
}

/// Draws the texture for `target`, an hourglass while extraction is queued,
/// or the final placeholder glyph.
pub(crate) fn paint_thumbnail(
    ui: &egui::Ui,
    rect: Rect,
    target: &ThumbnailTarget,
    textures: &dyn ThumbnailLookup,
    glyph_size: f32,
) {
    let uv = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    if let Some(tex) = textures.thumbnail(target) {
        ui.painter().image(tex.id(), rect, uv, Color32::WHITE);
    } else if textures.is_pending(target) {
        ui.painter().rect_filled(rect, theme::ROUNDING_SM, theme::BG_SURFACE);
        ui.painter().text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "\u{23F3}",
            egui::FontId::proportional(glyph_size),
            theme::TEXT_DIM,
        );
    } else {
        ui.painter().rect_filled(rect, theme::ROUNDING_SM, theme::BG_SURFACE);
        ui.painter().text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "\u{1F4FA}",
            egui::FontId::proportional(glyph_size),
            theme::TEXT_DIM,
        );
    }
    ui.painter().rect_stroke(
        rect,
        theme::ROUNDING_SM,
        Stroke::new(1.0, theme::BORDER),
        StrokeKind::Outside,
    );
}
