use egui::{Color32, CornerRadius, Stroke, Style, Visuals};

pub const BG_DARK: Color32 = Color32::from_rgb(24, 24, 28);
pub const BG_PANEL: Color32 = Color32::from_rgb(33, 33, 38);
pub const BG_SURFACE: Color32 = Color32::from_rgb(48, 48, 56);
pub const BG_ROW_ACTIVE: Color32 = Color32::from_rgb(70, 34, 40);
pub const ACCENT: Color32 = Color32::from_rgb(229, 57, 53);
pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(232, 232, 232);
pub const TEXT_DIM: Color32 = Color32::from_rgb(150, 150, 160);
pub const BORDER: Color32 = Color32::from_rgb(64, 64, 72);
pub const BADGE_BG: Color32 = Color32::from_black_alpha(200);

pub const ROUNDING: CornerRadius = CornerRadius::same(6);
pub const ROUNDING_SM: CornerRadius = CornerRadius::same(3);

pub fn apply_theme(ctx: &egui::Context) {
    let mut style = Style::default();
    let mut visuals = Visuals::dark();

    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_DARK;
    visuals.extreme_bg_color = BG_DARK;
    visuals.faint_bg_color = BG_SURFACE;

    visuals.widgets.noninteractive.bg_fill = BG_SURFACE;
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);

    visuals.widgets.inactive.bg_fill = BG_SURFACE;
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);

    visuals.widgets.hovered.bg_fill = Color32::from_rgb(64, 64, 76);
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, Color32::WHITE);

    visuals.widgets.active.bg_fill = ACCENT;
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, Color32::WHITE);

    visuals.selection.bg_fill = ACCENT.gamma_multiply(0.4);
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    style.visuals = visuals;
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.window_margin = egui::Margin::same(12);

    ctx.set_style(style);
}
