//! CityScope - City Cluster Analysis & Interactive Dashboard
//!
//! Visualizes pre-computed city clustering results: a projected 3D scatter
//! of the t-SNE embedding and a radar profile of per-cluster feature
//! averages, joined by city name from two CSV inputs.

mod charts;
mod config;
mod data;
mod gui;
mod profile;

use eframe::egui;
use gui::CityscopeApp;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt::init();

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("CityScope"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "CityScope",
        options,
        Box::new(|cc| Ok(Box::new(CityscopeApp::new(cc)))),
    )
}
