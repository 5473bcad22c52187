//! Stats module - aggregation and numeric summaries

mod aggregate;
mod calculator;

pub use aggregate::{
    industry_totals, location_frequency, log_power, nationality_totals, CategoryCount,
    LocationFrequency,
};
pub use calculator::{Histogram, HistogramSpec, StatsCalculator, SummaryStats, ValidRange};
