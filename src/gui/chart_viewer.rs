//! Chart Viewer Widget
//! Central panel hosting the interactive confirmed-case chart.

use crate::charts::ChartPlotter;
use crate::data::Dataset;
use egui::RichText;

/// Central chart display area.
pub struct ChartViewer;

impl ChartViewer {
    pub fn new() -> Self {
        Self
    }

    /// Draw the chart for the current dataset, if any.
    pub fn show(
        &self,
        ui: &mut egui::Ui,
        dataset: Option<&Dataset>,
        subtitle: Option<&str>,
        threshold: u64,
        log_scale: bool,
    ) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("COVID-19 Trend Comparison").size(18.0).strong());
            if let Some(country) = subtitle {
                ui.label(RichText::new(format!("> {}", country)).size(16.0));
            }
        });
        ui.add_space(5.0);

        match dataset {
            Some(ds) if !ds.is_empty() => {
                ChartPlotter::draw_line_chart(ui, ds, threshold, log_scale);
            }
            Some(_) => {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        RichText::new("No series crossed the threshold").size(20.0),
                    );
                });
            }
            None => {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("No Data").size(20.0));
                });
            }
        }
    }
}

impl Default for ChartViewer {
    fn default() -> Self {
        Self::new()
    }
}
