//! Data Processor Module
//! Row filtering and deduplication over the immutable employment table.

use crate::data::schema::{EmploymentRecord, Industry};
use polars::prelude::*;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Field a view needs to be present before a record can contribute to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Coordinates,
    Region,
    StartDate,
    Duration,
    Wage,
}

impl RequiredField {
    fn is_present(self, record: &EmploymentRecord) -> bool {
        match self {
            RequiredField::Coordinates => record.coordinates().is_some(),
            RequiredField::Region => record.region.is_some(),
            RequiredField::StartDate => record.start_date.is_some(),
            RequiredField::Duration => record.duration_days.is_some(),
            RequiredField::Wage => record.wage_yen.is_some(),
        }
    }
}

/// User-selected filter parameters, re-applied from scratch on every interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParams {
    pub industry: Option<Industry>,
    pub duration_upper_limit: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            industry: None,
            duration_upper_limit: 10_000.0,
        }
    }
}

/// Handles record selection for each view.
pub struct DataProcessor;

impl DataProcessor {
    /// Records matching the selected industry that carry every required field.
    pub fn filter<'a>(
        records: &'a [EmploymentRecord],
        industry: Option<Industry>,
        required: &[RequiredField],
    ) -> Vec<&'a EmploymentRecord> {
        records
            .iter()
            .filter(|r| industry.map_or(true, |i| r.has_industry(i)))
            .filter(|r| required.iter().all(|field| field.is_present(r)))
            .collect()
    }

    /// Keep the first record per identifier, in original order.
    pub fn dedupe_by_id<'a>(records: &[&'a EmploymentRecord]) -> Vec<&'a EmploymentRecord> {
        let mut seen: HashSet<&str> = HashSet::new();
        records
            .iter()
            .copied()
            .filter(|r| seen.insert(r.id.as_str()))
            .collect()
    }

    /// Keep the first record per (identifier, location), in original order.
    pub fn dedupe_by_id_and_location<'a>(
        records: &[&'a EmploymentRecord],
    ) -> Vec<&'a EmploymentRecord> {
        let mut seen: HashSet<(&str, Option<u64>, Option<u64>, Option<&str>)> = HashSet::new();
        records
            .iter()
            .copied()
            .filter(|r| {
                seen.insert((
                    r.id.as_str(),
                    r.latitude.map(f64::to_bits),
                    r.longitude.map(f64::to_bits),
                    r.region.as_deref(),
                ))
            })
            .collect()
    }

    /// Raw table rows for display, restricted to the selected industry.
    pub fn raw_view(
        df: &DataFrame,
        industry: Option<Industry>,
        limit: usize,
    ) -> Result<DataFrame, ProcessorError> {
        let lazy = df.clone().lazy();
        let lazy = match industry {
            Some(industry) => lazy.filter(
                col(industry.column())
                    .cast(DataType::Float64)
                    .gt(lit(0.0)),
            ),
            None => lazy,
        };
        Ok(lazy.limit(limit as IdxSize).collect()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{fixtures::csv_with, DataLoader};

    fn record(id: &str, industry: Option<Industry>, coords: Option<(f64, f64)>) -> EmploymentRecord {
        let mut r = EmploymentRecord::new(id);
        if let Some(industry) = industry {
            r.industries.insert(industry as usize);
        }
        if let Some((lat, lon)) = coords {
            r.latitude = Some(lat);
            r.longitude = Some(lon);
        }
        r
    }

    #[test]
    fn filters_by_industry_and_required_fields() {
        let records = vec![
            record("1", Some(Industry::Education), Some((35.0, 135.0))),
            record("2", Some(Industry::Military), Some((35.0, 135.0))),
            record("3", Some(Industry::Education), None),
        ];

        let all = DataProcessor::filter(&records, None, &[]);
        assert_eq!(all.len(), 3);

        let located = DataProcessor::filter(&records, None, &[RequiredField::Coordinates]);
        assert_eq!(located.len(), 2);

        let education = DataProcessor::filter(
            &records,
            Some(Industry::Education),
            &[RequiredField::Coordinates],
        );
        assert_eq!(education.len(), 1);
        assert_eq!(education[0].id, "1");
    }

    #[test]
    fn dedupe_keeps_first_occurrence_and_is_idempotent() {
        let records = vec![
            record("a", None, Some((35.0, 135.0))),
            record("b", None, Some((36.0, 136.0))),
            record("a", None, Some((36.0, 136.0))),
            record("a", None, Some((35.0, 135.0))),
        ];
        let refs: Vec<&EmploymentRecord> = records.iter().collect();

        let by_id = DataProcessor::dedupe_by_id(&refs);
        assert_eq!(by_id.len(), 2);
        assert!(std::ptr::eq(by_id[0], &records[0]));
        assert!(std::ptr::eq(by_id[1], &records[1]));
        assert_eq!(DataProcessor::dedupe_by_id(&by_id).len(), by_id.len());

        let by_location = DataProcessor::dedupe_by_id_and_location(&refs);
        assert_eq!(by_location.len(), 3);
        assert!(std::ptr::eq(by_location[2], &records[2]));
        assert_eq!(
            DataProcessor::dedupe_by_id_and_location(&by_location).len(),
            3
        );
    }

    #[test]
    fn raw_view_filters_and_truncates() {
        let csv = csv_with(&[
            &[("id", "1"), ("trade", "1")],
            &[("id", "2"), ("trade", "0")],
            &[("id", "3"), ("trade", "1")],
        ]);
        let table = DataLoader::load_records(csv).unwrap();

        let traders = DataProcessor::raw_view(&table.raw, Some(Industry::Trade), 10).unwrap();
        assert_eq!(traders.height(), 2);

        let first = DataProcessor::raw_view(&table.raw, None, 1).unwrap();
        assert_eq!(first.height(), 1);
    }
}
