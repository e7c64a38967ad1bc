use vidshelf_media::player::VideoPlayer;

use crate::playback::PlaybackController;

pub fn handle_keyboard<P: VideoPlayer>(ctx: &egui::Context, playback: &mut PlaybackController<P>) {
    if ctx.wants_keyboard_input() {
        return;
    }
    let (toggle, stop) = ctx.input_mut(take_shortcuts);
    if toggle {
        playback.toggle_pause();
    }
    if stop {
        playback.stop();
    }
}

/// Consumes Space and Escape so a focused button does not also react to
/// them later in the frame.
fn take_shortcuts(input: &mut egui::InputState) -> (bool, bool) {
    (
        input.consume_key(egui::Modifiers::NONE, egui::Key::Space),
        input.consume_key(egui::Modifiers::NONE, egui::Key::Escape),
    )
}
