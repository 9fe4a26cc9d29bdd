//! Charts module - Chart rendering

mod plotter;
mod renderer;

pub use plotter::{ChartPlotter, PALETTE};
pub use renderer::StaticChartRenderer;
