//! CSV Data Loader Module
//! Parses the Oyatoi employment table with Polars and validates it against
//! the typed schema.

use crate::data::schema::{
    required_columns, EmploymentRecord, FlagSet, Industry, Nationality, COL_DURATION, COL_ID,
    COL_LATITUDE, COL_LONGITUDE, COL_REGION, COL_START_DATE, COL_WAGE,
};
use chrono::NaiveDate;
use polars::prelude::*;
use std::io::Cursor;
use thiserror::Error;

/// Rows used for CSV schema inference.
const INFER_SCHEMA_ROWS: usize = 10_000;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Dataset does not match the employment schema, missing columns: {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },
    #[error("Failed to parse region boundaries: {0}")]
    Boundaries(String),
}

/// Loaded employment records plus the raw lower-cased table they came from.
#[derive(Clone, Debug)]
pub struct EmploymentTable {
    pub records: Vec<EmploymentRecord>,
    pub raw: DataFrame,
}

impl EmploymentTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Handles CSV parsing with Polars for high performance.
pub struct DataLoader;

impl DataLoader {
    /// Parse delimited text into a DataFrame with lower-cased column names.
    pub fn read_csv(bytes: Vec<u8>) -> Result<DataFrame, LoaderError> {
        let mut df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .with_ignore_errors(true)
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;

        let lowered: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_lowercase())
            .collect();
        df.set_column_names(lowered)?;

        Ok(df)
    }

    /// Check that every schema column is present, reporting all missing ones at once.
    pub fn validate_schema(df: &DataFrame) -> Result<(), LoaderError> {
        let present: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let missing: Vec<String> = required_columns()
            .into_iter()
            .filter(|col| !present.iter().any(|p| p == col))
            .map(str::to_string)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(LoaderError::SchemaMismatch { missing })
        }
    }

    /// Parse, validate and extract typed employment records.
    pub fn load_records(bytes: Vec<u8>) -> Result<EmploymentTable, LoaderError> {
        let df = Self::read_csv(bytes)?;
        Self::validate_schema(&df)?;

        let ids = string_values(&df, COL_ID)?;
        let regions = string_values(&df, COL_REGION)?;
        let latitudes = float_values(&df, COL_LATITUDE)?;
        let longitudes = float_values(&df, COL_LONGITUDE)?;
        let start_dates: Vec<Option<NaiveDate>> = string_values(&df, COL_START_DATE)?
            .into_iter()
            .map(|v| v.as_deref().and_then(parse_date))
            .collect();
        let durations = float_values(&df, COL_DURATION)?;
        let wages = float_values(&df, COL_WAGE)?;

        let nationality_flags = Nationality::ALL
            .iter()
            .map(|n| flag_values(&df, n.column()))
            .collect::<Result<Vec<_>, _>>()?;
        let industry_flags = Industry::ALL
            .iter()
            .map(|i| flag_values(&df, i.column()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::with_capacity(df.height());
        let mut skipped = 0usize;

        for row in 0..df.height() {
            let Some(id) = ids[row].clone() else {
                skipped += 1;
                continue;
            };

            let mut nationalities = FlagSet::default();
            for (idx, flags) in nationality_flags.iter().enumerate() {
                if flags[row] {
                    nationalities.insert(idx);
                }
            }
            let mut industries = FlagSet::default();
            for (idx, flags) in industry_flags.iter().enumerate() {
                if flags[row] {
                    industries.insert(idx);
                }
            }

            records.push(EmploymentRecord {
                id,
                region: regions[row].clone(),
                latitude: latitudes[row],
                longitude: longitudes[row],
                start_date: start_dates[row],
                duration_days: durations[row],
                wage_yen: wages[row],
                nationalities,
                industries,
            });
        }

        if skipped > 0 {
            log::warn!("Skipped {} rows without an identifier", skipped);
        }
        log::info!(
            "Loaded {} employment records ({} columns)",
            records.len(),
            df.width()
        );

        Ok(EmploymentTable { records, raw: df })
    }
}

/// Best-effort date parsing; anything unparseable becomes `None`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y/%m/%d"))
        .ok()
        .or_else(|| {
            // Datetime strings: keep the date part.
            value
                .get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        })
}

fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, LoaderError> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let values = series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect();
    Ok(values)
}

fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, LoaderError> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let values = series
        .str()?
        .into_iter()
        .map(|v| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .collect();
    Ok(values)
}

fn flag_values(df: &DataFrame, name: &str) -> Result<Vec<bool>, LoaderError> {
    Ok(float_values(df, name)?
        .into_iter()
        .map(|v| v.is_some_and(|x| x > 0.0))
        .collect())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::data::schema::required_columns;

    /// Build CSV text with the full schema header; `rows` supply only the
    /// listed columns, everything else is left empty.
    pub fn csv_with(rows: &[&[(&str, &str)]]) -> Vec<u8> {
        let columns = required_columns();
        let mut out = columns.join(",");
        out.push('\n');
        for row in rows {
            let line: Vec<&str> = columns
                .iter()
                .map(|col| {
                    row.iter()
                        .find(|(name, _)| name == col)
                        .map(|(_, v)| *v)
                        .unwrap_or("")
                })
                .collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }
        out.into_bytes()
    }
}
