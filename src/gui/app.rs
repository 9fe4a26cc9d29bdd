//! Covid Charts Main Application
//! Main window with control panel and chart viewer.

use crate::charts::StaticChartRenderer;
use crate::data::{aggregate_by_country, aggregate_by_region, CsvLoader, Dataset, RawRow};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::SidePanel;
use std::path::Path;
use std::sync::mpsc::{channel, Receiver};
use std::thread;

/// Pre-selected countries for the default chart after a CSV load.
const DEFAULT_VISIBLE: [&str; 4] = ["Italy", "Spain", "Germany", "Switzerland"];

/// Exported PNG dimensions
const EXPORT_WIDTH: u32 = 1400;
const EXPORT_HEIGHT: u32 = 1000;

/// CSV loading result from background thread
enum LoadResult {
    Progress(String),
    Complete { rows: Vec<RawRow> },
    Error(String),
}

/// Which aggregation the chart currently shows.
enum View {
    Countries,
    Region(String),
}

/// Main application window.
pub struct CovidApp {
    rows: Vec<RawRow>,
    dataset: Option<Dataset>,
    view: View,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl CovidApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            rows: Vec::new(),
            dataset: None,
            view: View::Countries,
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
        }
    }

    /// Handle CSV file selection - parses on a background thread.
    fn handle_browse_csv(&mut self) {
        if self.is_loading {
            return; // Already loading
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.dataset = None;
            self.rows.clear();
            self.control_panel.settings.csv_path = Some(path.clone());
            self.control_panel.set_progress(0.0, "Loading CSV file...");
            self.is_loading = true;

            let (tx, rx) = channel();
            self.load_rx = Some(rx);

            let path_str = path.to_string_lossy().to_string();

            thread::spawn(move || {
                let _ = tx.send(LoadResult::Progress("Reading CSV file...".to_string()));

                match CsvLoader::load_csv(&path_str) {
                    Ok(rows) => {
                        let _ = tx.send(LoadResult::Complete { rows });
                    }
                    Err(e) => {
                        let _ = tx.send(LoadResult::Error(e.to_string()));
                    }
                }
            });
        }
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(status) => {
                        self.control_panel.set_progress(0.0, &status);
                    }
                    LoadResult::Complete { rows } => {
                        let count = rows.len();
                        self.rows = rows;
                        self.view = View::Countries;
                        self.rebuild_dataset(false);
                        self.control_panel
                            .set_progress(100.0, &format!("Loaded {} locations", count));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(error) => {
                        self.control_panel
                            .set_progress(0.0, &format!("Error: {}", error));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Recompute the aggregated dataset for the current view and threshold.
    ///
    /// The dataset is rebuilt wholesale; `keep_visibility` carries the
    /// current selection over (threshold tweaks), otherwise the view's
    /// default selection applies.
    fn rebuild_dataset(&mut self, keep_visibility: bool) {
        if self.rows.is_empty() {
            self.dataset = None;
            return;
        }

        let previous: Option<Vec<String>> = if keep_visibility {
            self.dataset.as_ref().map(|ds| {
                ds.locations
                    .iter()
                    .filter(|l| l.visible)
                    .map(|l| l.location.clone())
                    .collect()
            })
        } else {
            None
        };

        let threshold = self.control_panel.settings.threshold;
        let mut ds = match &self.view {
            View::Countries => aggregate_by_country(&self.rows, threshold),
            View::Region(country) => aggregate_by_region(&self.rows, country, threshold),
        };

        if let Some(previous) = previous {
            let visible: Vec<&str> = previous.iter().map(String::as_str).collect();
            ds.set_visible_locations(&visible);
        } else if matches!(self.view, View::Countries) {
            ds.set_visible_locations(&DEFAULT_VISIBLE);
        }

        self.control_panel.select_all = !ds.locations.is_empty()
            && ds.locations.iter().all(|l| l.visible);
        self.dataset = Some(ds);
    }

    /// Handle PNG export - render the visible series off-screen and save.
    fn handle_export_png(&mut self) {
        let Some(dataset) = &self.dataset else {
            self.control_panel.set_progress(0.0, "No chart to export");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name("covid_chart.png")
            .save_file()
        else {
            return; // User cancelled
        };

        let settings = &self.control_panel.settings;
        let result = Self::export_png(dataset, settings.threshold, settings.log_scale, &path);
        match result {
            Ok(()) => {
                self.control_panel
                    .set_progress(100.0, &format!("Chart exported to {}", path.display()));
            }
            Err(e) => {
                self.control_panel
                    .set_progress(0.0, &format!("Error: {}", e));
            }
        }
    }

    fn export_png(
        dataset: &Dataset,
        threshold: u64,
        log_scale: bool,
        path: &Path,
    ) -> anyhow::Result<()> {
        let png = StaticChartRenderer::render_chart_to_bytes(
            dataset,
            threshold,
            log_scale,
            EXPORT_WIDTH,
            EXPORT_HEIGHT,
        )?;
        std::fs::write(path, png)?;
        Ok(())
    }

    /// Handle JSON export of the aggregated dataset.
    fn handle_export_json(&mut self) {
        let Some(dataset) = &self.dataset else {
            self.control_panel.set_progress(0.0, "No data to export");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name("covid_dataset.json")
            .save_file()
        else {
            return; // User cancelled
        };

        match Self::export_json(dataset, &path) {
            Ok(()) => {
                self.control_panel
                    .set_progress(100.0, &format!("Dataset exported to {}", path.display()));
            }
            Err(e) => {
                self.control_panel
                    .set_progress(0.0, &format!("Error: {}", e));
            }
        }
    }

    fn export_json(dataset: &Dataset, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(dataset)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl eframe::App for CovidApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let in_region_view = matches!(self.view, View::Region(_));
                    let has_data = self
                        .dataset
                        .as_ref()
                        .is_some_and(|ds| ds.visible_series().next().is_some());
                    let locations = self
                        .dataset
                        .as_ref()
                        .map(|ds| ds.locations.clone())
                        .unwrap_or_default();

                    let action =
                        self.control_panel
                            .show(ui, &locations, in_region_view, has_data);

                    match action {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::ThresholdChanged => self.rebuild_dataset(true),
                        ControlPanelAction::SetAllVisible(show) => {
                            if let Some(ds) = &mut self.dataset {
                                ds.set_visibility_for_all(show);
                            }
                        }
                        ControlPanelAction::ToggleLocation(location, show) => {
                            if let Some(ds) = &mut self.dataset {
                                ds.set_visibility_for_location(&location, show);
                                self.control_panel.select_all =
                                    ds.locations.iter().all(|l| l.visible);
                            }
                        }
                        ControlPanelAction::OpenRegion(country) => {
                            self.view = View::Region(country);
                            self.rebuild_dataset(false);
                        }
                        ControlPanelAction::BackToCountries => {
                            self.view = View::Countries;
                            self.rebuild_dataset(false);
                        }
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::ExportJson => self.handle_export_json(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            let subtitle = match &self.view {
                View::Countries => None,
                View::Region(country) => Some(country.as_str()),
            };
            let settings = &self.control_panel.settings;
            self.chart_viewer.show(
                ui,
                self.dataset.as_ref(),
                subtitle,
                settings.threshold,
                settings.log_scale,
            );
        });
    }
}
