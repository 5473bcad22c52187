//! Oyatoi Dashboard - Hired Foreigners in Meiji Japan
//!
//! Interactive viewer for where, when and for how much foreign
//! specialists were employed between 1868 and 1912.

use anyhow::Context;
use eframe::egui;
use oyatoi_dashboard::config::AppConfig;
use oyatoi_dashboard::gui::DashboardApp;
use oyatoi_dashboard::store::store_from_config;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_default_sources().context("failed to load configuration")?;
    let store = store_from_config(&config).context("failed to set up data source")?;
    log::info!("Reading data from {}", store.describe());

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Hired Foreigners in Meiji Japan"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Oyatoi Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, config, store)))),
    )
    .map_err(|e| anyhow::anyhow!("window closed with error: {e}"))
}
