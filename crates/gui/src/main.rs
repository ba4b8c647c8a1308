mod app;
mod ui;
mod viewport;

// Re-export library modules so that `crate::measure`, `crate::state`, etc.
// resolve to the lib crate types everywhere in the binary.
pub use tapeline_gui_lib::export;
pub use tapeline_gui_lib::i18n;
pub use tapeline_gui_lib::measure;
pub use tapeline_gui_lib::model;
pub use tapeline_gui_lib::persistence;
pub use tapeline_gui_lib::state;

use app::TapelineApp;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tapeline_gui=info,tapeline_gui_lib=info".into()),
        )
        .init();

    // Parse --model <path> argument
    let initial_model = parse_model_arg();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Tapeline")
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "tapeline-gui",
        native_options,
        Box::new(move |cc| Ok(Box::new(TapelineApp::new(cc, initial_model)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}

fn parse_model_arg() -> Option<model::LoadedModel> {
    let args: Vec<String> = std::env::args().collect();
    let path = args
        .windows(2)
        .find(|pair| pair[0] == "--model")
        .map(|pair| pair[1].clone())?;

    match model::load_obj(std::path::Path::new(&path)) {
        Ok(loaded) => {
            tracing::info!("Loaded model from {path} ({} triangles)", loaded.triangle_count());
            Some(loaded)
        }
        Err(e) => {
            tracing::error!("Failed to load model {path}: {e}");
            None
        }
    }
}
