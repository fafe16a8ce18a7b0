use anyhow::Result;
use eframe::egui;
use equipment_visualizer::logging::init_logging;
use equipment_visualizer::{Dashboard, Settings};
use tracing::info;

fn main() -> Result<()> {
    let settings = Settings::load()?;
    init_logging(&settings.logging.level)?;
    info!("Loaded settings from {}", Settings::default_path().display());

    let mut dashboard = Dashboard::new(&settings)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 800.0])
            .with_min_inner_size([720.0, 560.0])
            .with_title("Chemical Equipment Visualizer"),
        ..Default::default()
    };

    eframe::run_native(
        "Chemical Equipment Visualizer",
        options,
        Box::new(move |cc| {
            dashboard.attach_context(cc.egui_ctx.clone());
            dashboard.load_history();
            Box::new(dashboard)
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run application: {}", e))
}
