//! Control Panel Widget
//! Left side panel with data source, view settings and the location list.

use crate::charts::ChartPlotter;
use crate::data::{LocationSummary, DEFAULT_THRESHOLD};
use egui::{Color32, RichText, ScrollArea};
use std::path::PathBuf;

/// User settings for the current view
#[derive(Clone)]
pub struct UserSettings {
    pub csv_path: Option<PathBuf>,
    pub threshold: u64,
    pub log_scale: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            csv_path: None,
            threshold: DEFAULT_THRESHOLD,
            log_scale: false,
        }
    }
}

/// Left side control panel with file selection and view controls.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub select_all: bool,
    pub progress: f32,
    pub status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: UserSettings::default(),
            select_all: false,
            progress: 0.0,
            status: "Ready".to_string(),
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the control panel
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        locations: &[LocationSummary],
        in_region_view: bool,
        has_data: bool,
    ) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🦠 Covid Charts")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Confirmed-case trends")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== CSV File Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .settings
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.settings.csv_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== View Section =====
        ui.label(RichText::new("⚙️ View").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.label("Threshold:");
            let response = ui.add(
                egui::DragValue::new(&mut self.settings.threshold)
                    .speed(1)
                    .range(0..=1_000_000),
            );
            if response.changed() {
                action = ControlPanelAction::ThresholdChanged;
            }
        });

        ui.checkbox(&mut self.settings.log_scale, "Logarithmic scale");

        if in_region_view {
            ui.add_space(5.0);
            if ui.button("⬅ All countries").clicked() {
                action = ControlPanelAction::BackToCountries;
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Location List Section =====
        let heading = if in_region_view {
            "📍 States / Provinces"
        } else {
            "🌍 Countries"
        };
        ui.label(RichText::new(heading).size(14.0).strong());
        ui.add_space(5.0);

        if locations.is_empty() {
            ui.label(RichText::new("Load a CSV to see locations").color(Color32::GRAY));
        } else {
            if ui.checkbox(&mut self.select_all, "Select all").changed() {
                action = ControlPanelAction::SetAllVisible(self.select_all);
            }
            ui.add_space(5.0);

            egui::Frame::none()
                .fill(ui.visuals().widgets.noninteractive.bg_fill)
                .rounding(5.0)
                .inner_margin(5.0)
                .show(ui, |ui| {
                    ScrollArea::vertical()
                        .id_salt("location_list")
                        .max_height(320.0)
                        .show(ui, |ui| {
                            for (i, loc) in locations.iter().enumerate() {
                                ui.horizontal(|ui| {
                                    let (rect, _) = ui.allocate_exact_size(
                                        egui::vec2(12.0, 12.0),
                                        egui::Sense::hover(),
                                    );
                                    ui.painter().rect_filled(
                                        rect,
                                        2.0,
                                        ChartPlotter::location_color(i),
                                    );

                                    let mut visible = loc.visible;
                                    if ui.checkbox(&mut visible, "").changed() {
                                        action = ControlPanelAction::ToggleLocation(
                                            loc.location.clone(),
                                            visible,
                                        );
                                    }

                                    let label = format!(
                                        "{} ({})",
                                        loc.location, loc.max_confirmed
                                    );
                                    if ui.selectable_label(false, label).clicked()
                                        && !in_region_view
                                    {
                                        action = ControlPanelAction::OpenRegion(
                                            loc.location.clone(),
                                        );
                                    }
                                });
                            }
                        });
                });
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Section =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(has_data, |ui| {
                let png_button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(png_button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }

                ui.add_space(8.0);

                let json_button = egui::Button::new(RichText::new("📄 Export JSON").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(json_button).clicked() {
                    action = ControlPanelAction::ExportJson;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("📊 Progress").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );

        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Loaded") || self.status.contains("exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    ThresholdChanged,
    SetAllVisible(bool),
    ToggleLocation(String, bool),
    OpenRegion(String),
    BackToCountries,
    ExportPng,
    ExportJson,
}
