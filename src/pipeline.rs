//! Dashboard pipeline: filter, aggregate and describe every view from the
//! immutable base dataset and the current user selections.

use crate::charts::{BarChartSpec, ColumnLayer, DeckSpec, GeoJsonLayer, Layer, ViewState};
use crate::config::DisplayConfig;
use crate::data::{
    DataProcessor, EmploymentRecord, EmploymentTable, FilterParams, RegionBoundary, RequiredField,
};
use crate::stats::{
    industry_totals, location_frequency, nationality_totals, CategoryCount, Histogram,
    HistogramSpec, LocationFrequency, StatsCalculator, SummaryStats, ValidRange,
};

/// Employment start years, 1867 to 1912.
pub const YEAR_HISTOGRAM: HistogramSpec = HistogramSpec::linear(20, 1867.0, 1912.0);
/// Natural log of employment duration in days.
pub const DURATION_HISTOGRAM: HistogramSpec = HistogramSpec::log(10, 0.0, 10.0);
/// Natural log of wage in yen.
pub const WAGE_HISTOGRAM: HistogramSpec = HistogramSpec::log(10, 0.0, 10.0);

/// Everything loaded from the object store for one session.
pub struct Dataset {
    pub table: EmploymentTable,
    pub boundaries: Vec<RegionBoundary>,
}

/// All derived views for one set of filter parameters.
#[derive(Debug, Clone)]
pub struct DashboardViews {
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub unique_individuals: usize,
    pub locations: Vec<LocationFrequency>,
    pub deck: DeckSpec,
    pub hires_per_period: Histogram,
    pub duration_histogram: Histogram,
    pub duration_summary: Option<SummaryStats>,
    pub wage_histogram: Histogram,
    pub wage_summary: Option<SummaryStats>,
    pub nationality_totals: Vec<CategoryCount>,
    pub industry_totals: Vec<CategoryCount>,
}

impl DashboardViews {
    pub fn hires_chart(&self) -> BarChartSpec {
        BarChartSpec::from_histogram(
            "Number of Oyatoi Hired in a Given Period",
            "Year",
            "Hired foreigners",
            &self.hires_per_period,
        )
    }

    pub fn duration_chart(&self) -> BarChartSpec {
        BarChartSpec::from_histogram(
            "Distribution of Log Employment Duration (in Days) among Hired Foreigners",
            "ln(days)",
            "Employments",
            &self.duration_histogram,
        )
    }

    pub fn wage_chart(&self) -> BarChartSpec {
        BarChartSpec::from_histogram(
            "Distribution of Log Wages among Hired Foreigners",
            "ln(yen)",
            "Employments",
            &self.wage_histogram,
        )
    }

    pub fn nationality_chart(&self) -> BarChartSpec {
        BarChartSpec::from_categories(
            "Hired Foreigners by Nationality",
            "Individuals",
            &self.nationality_totals,
        )
    }

    pub fn industry_chart(&self) -> BarChartSpec {
        BarChartSpec::from_categories(
            "Hired Foreigners by Industry",
            "Individuals",
            &self.industry_totals,
        )
    }
}

fn values<'a>(
    records: &'a [&'a EmploymentRecord],
    field: impl Fn(&EmploymentRecord) -> Option<f64> + 'a,
) -> impl Iterator<Item = f64> + 'a {
    records.iter().filter_map(move |&r| field(r))
}

/// Recompute every view from scratch.
///
/// The map counts each person once per named location while the viewport
/// midpoint averages every located row; histograms and summaries
/// count appointments; category totals count individuals. The industry
/// breakdown ignores the industry selection.
pub fn compute_views(
    dataset: &Dataset,
    params: &FilterParams,
    display: &DisplayConfig,
) -> DashboardViews {
    let records = &dataset.table.records;
    let industry = params.industry;

    let selected = DataProcessor::filter(records, industry, &[]);
    let individuals = DataProcessor::dedupe_by_id(&selected);

    let located = DataProcessor::filter(records, industry, &[RequiredField::Coordinates]);
    let view_state =
        ViewState::for_policy(display.viewport, located.iter().filter_map(|r| r.coordinates()));

    let mapped = DataProcessor::filter(
        records,
        industry,
        &[RequiredField::Coordinates, RequiredField::Region],
    );
    let mapped = DataProcessor::dedupe_by_id_and_location(&mapped);
    let locations = location_frequency(&mapped, display.log_power);
    let mut layers = vec![Layer::ColumnLayer(ColumnLayer::from_locations(&locations))];
    if !dataset.boundaries.is_empty() {
        layers.push(Layer::GeoJsonLayer(GeoJsonLayer::from_boundaries(
            &dataset.boundaries,
            industry,
        )));
    }
    let deck = DeckSpec::new(view_state, layers);

    let dated = DataProcessor::filter(records, industry, &[RequiredField::StartDate]);
    let hires_per_period = StatsCalculator::histogram(
        values(&dated, |r| r.start_year().map(f64::from)),
        &YEAR_HISTOGRAM,
    );

    let timed = DataProcessor::filter(records, industry, &[RequiredField::Duration]);
    let duration_histogram =
        StatsCalculator::histogram(values(&timed, |r| r.duration_days), &DURATION_HISTOGRAM);
    let duration_summary = StatsCalculator::summarize(
        values(&timed, |r| r.duration_days),
        ValidRange::positive_up_to(params.duration_upper_limit),
    );

    let paid = DataProcessor::filter(records, industry, &[RequiredField::Wage]);
    let wage_histogram = StatsCalculator::histogram(values(&paid, |r| r.wage_yen), &WAGE_HISTOGRAM);
    let wage_summary =
        StatsCalculator::summarize(values(&paid, |r| r.wage_yen), ValidRange::positive());

    let everyone = DataProcessor::dedupe_by_id(&DataProcessor::filter(records, None, &[]));

    log::debug!(
        "Computed views for {:?}: {} rows, {} locations",
        industry,
        selected.len(),
        locations.len()
    );

    DashboardViews {
        total_rows: records.len(),
        filtered_rows: selected.len(),
        unique_individuals: individuals.len(),
        locations,
        deck,
        hires_per_period,
        duration_histogram,
        duration_summary,
        wage_histogram,
        wage_summary,
        nationality_totals: nationality_totals(&individuals, display.log_category_counts),
        industry_totals: industry_totals(&everyone, display.log_category_counts),
    }
}
