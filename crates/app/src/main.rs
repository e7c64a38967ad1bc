use vidshelf_app::config::AppConfig;

fn main() -> eframe::Result {
    vidshelf_app::logging::init_tracing();
    let config = AppConfig::load();
    tracing::debug!(?config, "starting");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([800.0, 560.0])
            .with_title("Vidshelf"),
        vsync: true,
        renderer: eframe::Renderer::Wgpu,
        ..Default::default()
    };

    eframe::run_native(
        "Vidshelf",
        options,
        Box::new(move |cc| Ok(Box::new(vidshelf_app::VidshelfApp::new(cc, config)))),
    )
}
