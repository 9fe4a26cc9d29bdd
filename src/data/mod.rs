//! Data module - CSV loading and aggregation

mod dataset;
mod loader;

pub use dataset::{
    aggregate_by_country, aggregate_by_region, filter_by_threshold, AggregatedSeries, Dataset,
    LocationSummary, SeriesPoint, DEFAULT_THRESHOLD,
};
pub use loader::{CsvLoader, LoaderError, RawRow};
