//! Covid Charts - COVID-19 confirmed-case CSV analysis & interactive chart viewer
//!
//! Loads the JHU global confirmed-case CSV, aggregates the time series by
//! country or sub-region, and displays interactive line charts aligned on
//! "days since outbreak start".

mod charts;
mod data;
mod gui;

use eframe::egui;
use gui::CovidApp;

fn main() -> eframe::Result<()> {
    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1100.0, 650.0])
            .with_title("Covid Charts"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Covid Charts",
        options,
        Box::new(|cc| Ok(Box::new(CovidApp::new(cc)))),
    )
}
