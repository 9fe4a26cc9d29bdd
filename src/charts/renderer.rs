//! Static Chart Renderer
//! Renders the current line chart to in-memory PNG bytes with plotters,
//! mirroring the interactive view (same palette, same linear/log choice).

use crate::charts::ChartPlotter;
use crate::data::Dataset;
use anyhow::{anyhow, Result};
use plotters::prelude::*;
use std::collections::HashMap;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render all visible series to PNG bytes.
    pub fn render_chart_to_bytes(
        dataset: &Dataset,
        threshold: u64,
        log_scale: bool,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>> {
        let visible: Vec<_> = dataset.visible_series().collect();
        if visible.is_empty() {
            return Err(anyhow!("no visible locations to render"));
        }

        let color_index: HashMap<&str, usize> = dataset
            .locations
            .iter()
            .enumerate()
            .map(|(i, l)| (l.location.as_str(), i))
            .collect();

        let y_of = |confirmed: u64| {
            if log_scale {
                (confirmed.max(1) as f64).log10()
            } else {
                confirmed as f64
            }
        };

        let max_day = visible
            .iter()
            .filter_map(|s| s.points.last())
            .map(|p| p.day)
            .max()
            .unwrap_or(0) as f64;
        let max_confirmed = visible
            .iter()
            .flat_map(|s| s.points.iter())
            .map(|p| p.confirmed)
            .max()
            .unwrap_or(1);

        let y_bottom = y_of(threshold.max(1));
        let y_top = if log_scale {
            y_of(max_confirmed) + 0.1
        } else {
            max_confirmed as f64 * 1.05
        };

        let mut buf = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| anyhow!("failed to clear canvas: {e}"))?;

            let mut chart = ChartBuilder::on(&root)
                .caption("COVID-19 confirmed cases", ("sans-serif", 28))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(75)
                .build_cartesian_2d(0f64..max_day.max(1.0), y_bottom..y_top.max(y_bottom + 1.0))
                .map_err(|e| anyhow!("failed to build chart: {e}"))?;

            chart
                .configure_mesh()
                .x_desc(format!(
                    "Days since confirmed cases higher than {} in that location",
                    threshold
                ))
                .y_desc("Confirmed cases")
                .y_label_formatter(&|v| {
                    if log_scale {
                        format!("{}", 10f64.powf(*v).round() as u64)
                    } else {
                        format!("{}", v.round() as u64)
                    }
                })
                .draw()
                .map_err(|e| anyhow!("failed to draw mesh: {e}"))?;

            for s in &visible {
                let c = ChartPlotter::location_color(
                    *color_index.get(s.location.as_str()).unwrap_or(&0),
                );
                let color = RGBColor(c.r(), c.g(), c.b());

                chart
                    .draw_series(LineSeries::new(
                        s.points.iter().map(|p| (p.day as f64, y_of(p.confirmed))),
                        color.stroke_width(2),
                    ))
                    .map_err(|e| anyhow!("failed to draw series: {e}"))?
                    .label(s.location.clone())
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
                    });

                chart
                    .draw_series(s.points.iter().map(|p| {
                        Circle::new((p.day as f64, y_of(p.confirmed)), 3, color.filled())
                    }))
                    .map_err(|e| anyhow!("failed to draw points: {e}"))?;
            }

            chart
                .configure_series_labels()
                .border_style(&BLACK)
                .background_style(&WHITE.mix(0.8))
                .draw()
                .map_err(|e| anyhow!("failed to draw legend: {e}"))?;

            root.present()
                .map_err(|e| anyhow!("failed to finalize chart: {e}"))?;
        }

        let img = image::RgbImage::from_raw(width, height, buf)
            .ok_or_else(|| anyhow!("rendered buffer has unexpected size"))?;
        let mut png = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)?;
        Ok(png)
    }
}
