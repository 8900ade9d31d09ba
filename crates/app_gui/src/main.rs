mod app;
mod worker;

use app::UiApp;
use classifier_core::{Settings, load_settings};
use eframe::{NativeOptions, egui};
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let (settings, startup_warning) = match load_settings() {
        Ok(settings) => (settings, None),
        Err(e) => {
            tracing::error!("Falling back to default settings: {e:#}");
            (Settings::default(), Some(format!("Config error: {e:#}")))
        }
    };
    tracing::info!("Prediction endpoint: {}", settings.predict_url());

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("CIFAR-10 Classifier")
            .with_inner_size([960.0, 820.0])
            .with_min_inner_size([640.0, 560.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    if let Err(e) = eframe::run_native(
        "CIFAR-10 Classifier",
        options,
        Box::new(move |cc| Ok(Box::new(UiApp::new(cc, settings, startup_warning)))),
    ) {
        eprintln!("Application stopped with error: {e}");
    }
}
