//! CSV Data Loader Module
//! Loads the JHU confirmed-case CSV with Polars and reshapes the wide
//! per-date columns into per-location time series.

use chrono::NaiveDate;
use polars::prelude::*;
use thiserror::Error;

/// Column holding the country name.
pub const COUNTRY_COL: &str = "Country/Region";
/// Column holding the optional state/province name.
pub const STATE_COL: &str = "Province/State";

/// Date format used by the CSV header, e.g. `1/22/20`.
const HEADER_DATE_FORMAT: &str = "%m/%d/%y";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Missing column '{0}'")]
    MissingColumn(String),
    #[error("No date columns found in header")]
    NoDateColumns,
    #[error("Column '{0}' looks like a date but cannot be parsed")]
    BadDateColumn(String),
    #[error("Row {row}: missing country name")]
    MissingCountry { row: usize },
    #[error("Row {row}: non-numeric or negative count in column '{column}'")]
    BadCount { row: usize, column: String },
}

/// One CSV row reshaped into a cumulative time series for a single location.
/// The series is sorted ascending by date and counts are never negative.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub country: String,
    pub state: Option<String>,
    pub series: Vec<(NaiveDate, u64)>,
}

/// A date column of the source frame, pre-cast to f64 for row iteration.
struct DateColumn {
    date: NaiveDate,
    name: String,
    values: Float64Chunked,
}

/// Loads the confirmed-case CSV and converts it into raw time series rows.
pub struct CsvLoader;

impl CsvLoader {
    /// Load a CSV file using Polars and parse it into raw rows.
    pub fn load_csv(file_path: &str) -> Result<Vec<RawRow>, LoaderError> {
        let df = LazyCsvReader::new(file_path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        Self::parse_rows(&df)
    }

    /// Reshape a wide DataFrame into one `RawRow` per source row.
    ///
    /// Every header column starting with a digit must parse as `M/D/YY`.
    /// Rows whose latest count is zero are dropped (no confirmed cases ever).
    pub fn parse_rows(df: &DataFrame) -> Result<Vec<RawRow>, LoaderError> {
        let date_cols = Self::date_columns(df)?;

        let country_col = df
            .column(COUNTRY_COL)
            .map_err(|_| LoaderError::MissingColumn(COUNTRY_COL.to_string()))?;
        let state_col = df.column(STATE_COL).ok();

        let mut rows = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let country = match country_col.get(i) {
                Ok(v) if !v.is_null() => v.to_string().trim_matches('"').to_string(),
                _ => String::new(),
            };
            if country.is_empty() {
                return Err(LoaderError::MissingCountry { row: i });
            }

            let state = state_col
                .and_then(|col| col.get(i).ok())
                .filter(|v| !v.is_null())
                .map(|v| v.to_string().trim_matches('"').to_string())
                .filter(|s| !s.is_empty());

            let mut series = Vec::with_capacity(date_cols.len());
            for dc in &date_cols {
                let confirmed = match dc.values.get(i) {
                    Some(v) if v.is_finite() && v >= 0.0 => v as u64,
                    _ => {
                        return Err(LoaderError::BadCount {
                            row: i,
                            column: dc.name.clone(),
                        })
                    }
                };
                series.push((dc.date, confirmed));
            }

            // The header may list dates out of order; the series must not.
            series.sort_by_key(|&(date, _)| date);

            // A location whose latest cumulative count is zero never had a
            // confirmed case and carries no signal.
            if series.last().is_some_and(|&(_, confirmed)| confirmed > 0) {
                rows.push(RawRow {
                    country,
                    state,
                    series,
                });
            }
        }

        Ok(rows)
    }

    /// Identify the date columns of the frame and pre-cast them to f64.
    fn date_columns(df: &DataFrame) -> Result<Vec<DateColumn>, LoaderError> {
        let mut cols = Vec::new();

        for name in df.get_column_names() {
            let name = name.to_string();
            if !name.starts_with(|c: char| c.is_ascii_digit()) {
                continue;
            }

            let date = NaiveDate::parse_from_str(&name, HEADER_DATE_FORMAT)
                .map_err(|_| LoaderError::BadDateColumn(name.clone()))?;

            let values = df.column(&name)?.cast(&DataType::Float64)?.f64()?.clone();
            cols.push(DateColumn { date, name, values });
        }

        if cols.is_empty() {
            return Err(LoaderError::NoDateColumns);
        }
        cols.sort_by_key(|dc| dc.date);
        Ok(cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_frame() -> DataFrame {
        df!(
            COUNTRY_COL => ["Italy", "Italy", "Nowhere"],
            STATE_COL => [Some("North"), Some("South"), None::<&str>],
            "1/22/20" => [1i64, 2, 0],
            "1/23/20" => [3i64, 4, 0],
        )
        .unwrap()
    }

    #[test]
    fn parses_rows_with_sorted_series() {
        let rows = CsvLoader::parse_rows(&sample_frame()).unwrap();
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(first.country, "Italy");
        assert_eq!(first.state.as_deref(), Some("North"));
        assert_eq!(
            first.series,
            vec![(date(2020, 1, 22), 1), (date(2020, 1, 23), 3)]
        );
    }

    #[test]
    fn drops_rows_with_zero_final_count() {
        let rows = CsvLoader::parse_rows(&sample_frame()).unwrap();
        assert!(rows.iter().all(|r| r.country != "Nowhere"));
    }

    #[test]
    fn sorts_series_when_header_dates_are_unordered() {
        let df = df!(
            COUNTRY_COL => ["Italy"],
            "1/23/20" => [5i64],
            "1/22/20" => [2i64],
        )
        .unwrap();

        let rows = CsvLoader::parse_rows(&df).unwrap();
        assert_eq!(
            rows[0].series,
            vec![(date(2020, 1, 22), 2), (date(2020, 1, 23), 5)]
        );
    }

    #[test]
    fn missing_state_column_is_tolerated() {
        let df = df!(
            COUNTRY_COL => ["Italy"],
            "1/22/20" => [7i64],
        )
        .unwrap();

        let rows = CsvLoader::parse_rows(&df).unwrap();
        assert_eq!(rows[0].state, None);
    }

    #[test]
    fn rejects_unparsable_date_header() {
        let df = df!(
            COUNTRY_COL => ["Italy"],
            "13/99/20" => [1i64],
        )
        .unwrap();

        let err = CsvLoader::parse_rows(&df).unwrap_err();
        assert!(matches!(err, LoaderError::BadDateColumn(name) if name == "13/99/20"));
    }

    #[test]
    fn rejects_non_numeric_count() {
        let df = df!(
            COUNTRY_COL => ["Italy"],
            "1/22/20" => ["not a number"],
        )
        .unwrap();

        let err = CsvLoader::parse_rows(&df).unwrap_err();
        assert!(matches!(
            err,
            LoaderError::BadCount { row: 0, ref column } if column == "1/22/20"
        ));
    }

    #[test]
    fn rejects_negative_count() {
        let df = df!(
            COUNTRY_COL => ["Italy"],
            "1/22/20" => [-3i64],
        )
        .unwrap();

        assert!(matches!(
            CsvLoader::parse_rows(&df).unwrap_err(),
            LoaderError::BadCount { .. }
        ));
    }

    #[test]
    fn rejects_missing_country() {
        let df = df!(
            COUNTRY_COL => [None::<&str>],
            "1/22/20" => [1i64],
        )
        .unwrap();

        assert!(matches!(
            CsvLoader::parse_rows(&df).unwrap_err(),
            LoaderError::MissingCountry { row: 0 }
        ));
    }

    #[test]
    fn rejects_frame_without_date_columns() {
        let df = df!(COUNTRY_COL => ["Italy"]).unwrap();
        assert!(matches!(
            CsvLoader::parse_rows(&df).unwrap_err(),
            LoaderError::NoDateColumns
        ));
    }
}
