//! Chart Plotter Module
//! Interactive confirmed-case line chart using egui_plot.

use crate::data::Dataset;
use egui::{Color32, RichText};
use egui_plot::{GridInput, GridMark, Legend, Line, Plot, PlotPoints, Points};
use std::collections::HashMap;

/// Color palette for locations, assigned by rank in the location list.
pub const PALETTE: [Color32; 12] = [
    Color32::from_rgb(166, 206, 227), // Light Blue
    Color32::from_rgb(31, 120, 180),  // Blue
    Color32::from_rgb(178, 223, 138), // Light Green
    Color32::from_rgb(51, 160, 44),   // Green
    Color32::from_rgb(251, 154, 153), // Light Red
    Color32::from_rgb(227, 26, 28),   // Red
    Color32::from_rgb(253, 191, 111), // Light Orange
    Color32::from_rgb(255, 127, 0),   // Orange
    Color32::from_rgb(202, 178, 214), // Light Purple
    Color32::from_rgb(106, 61, 154),  // Purple
    Color32::from_rgb(255, 255, 153), // Yellow
    Color32::from_rgb(177, 89, 40),   // Brown
];

/// Creates the interactive line chart using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Color for a location, keyed by its position in the location list.
    pub fn location_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Draw the line chart of all visible series.
    ///
    /// In log mode the y values are plotted as log10 with an axis formatter
    /// printing the real counts; egui_plot has no native log axis.
    pub fn draw_line_chart(ui: &mut egui::Ui, dataset: &Dataset, threshold: u64, log_scale: bool) {
        let visible: Vec<_> = dataset.visible_series().collect();
        if visible.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No locations selected").size(20.0));
            });
            return;
        }

        let color_index: HashMap<&str, usize> = dataset
            .locations
            .iter()
            .enumerate()
            .map(|(i, l)| (l.location.as_str(), i))
            .collect();

        // Tooltip lookup keyed by (location, day), so hover can show the
        // calendar date and delta behind each plotted point.
        let mut lookup = HashMap::new();
        for s in &visible {
            for p in &s.points {
                lookup.insert(
                    (s.location.clone(), p.day as i64),
                    (p.date, p.confirmed, p.delta),
                );
            }
        }

        let y_of = move |confirmed: u64| {
            if log_scale {
                (confirmed.max(1) as f64).log10()
            } else {
                confirmed as f64
            }
        };

        let mut plot = Plot::new("confirmed_chart")
            .x_axis_label(format!(
                "Days since confirmed cases higher than {} in that location",
                threshold
            ))
            .y_axis_label("Confirmed cases")
            .allow_scroll(false)
            .legend(Legend::default())
            .include_x(0.0)
            .include_y(y_of(threshold.max(1)))
            .label_formatter(move |name, value| {
                if name.is_empty() {
                    return String::new();
                }
                let day = value.x.round() as i64;
                match lookup.get(&(name.to_string(), day)) {
                    Some(&(date, confirmed, delta)) => format!(
                        "{}\n{}\nConfirmed: {}\nDiff: {:+}",
                        name,
                        date.format("%Y-%m-%d %a"),
                        confirmed,
                        delta
                    ),
                    None => name.to_string(),
                }
            });

        if log_scale {
            plot = plot
                .y_grid_spacer(|input: GridInput| {
                    // One grid line per decade.
                    let (min, max) = input.bounds;
                    let mut marks = Vec::new();
                    let mut exp = min.floor() as i64;
                    while (exp as f64) <= max {
                        marks.push(GridMark {
                            value: exp as f64,
                            step_size: 1.0,
                        });
                        exp += 1;
                    }
                    marks
                })
                .y_axis_formatter(|mark, _range| {
                    let count = 10f64.powf(mark.value);
                    if count >= 1.0 {
                        format!("{}", count.round() as u64)
                    } else {
                        String::new()
                    }
                });
        }

        plot.show(ui, |plot_ui| {
            for s in &visible {
                let color =
                    Self::location_color(*color_index.get(s.location.as_str()).unwrap_or(&0));
                let pts: Vec<[f64; 2]> = s
                    .points
                    .iter()
                    .map(|p| [p.day as f64, y_of(p.confirmed)])
                    .collect();

                plot_ui.line(
                    Line::new(PlotPoints::from(pts.clone()))
                        .color(color)
                        .width(1.5)
                        .name(&s.location),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(pts))
                        .radius(3.0)
                        .color(color)
                        .name(&s.location),
                );
            }
        });
    }
}
