mod api;
mod app;
mod models;
mod session_store;

fn main() -> Result<(), eframe::Error> {
    env_logger::init();
    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([600.0, 800.0])
            .with_min_inner_size([420.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Murmur",
        native_options,
        Box::new(|cc| Ok(Box::new(app::MurmurApp::new(cc)))),
    )
}
