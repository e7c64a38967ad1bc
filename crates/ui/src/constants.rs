use egui::vec2;

pub const ROW_THUMB_SIZE: egui::Vec2 = vec2(96.0, 54.0);
pub const ROW_HEIGHT: f32 = 62.0;
pub const DELETE_BTN_SIZE: egui::Vec2 = vec2(28.0, 24.0);

pub const CARD_THUMB_SIZE: egui::Vec2 = vec2(200.0, 112.5);
pub const GRID_SPACING: f32 = 10.0;
pub const MIN_CARD_W: f32 = 180.0;

pub const TRANSPORT_BTN_SIZE: egui::Vec2 = vec2(32.0, 26.0);
pub const SIDE_PANEL_WIDTH: f32 = 360.0;
