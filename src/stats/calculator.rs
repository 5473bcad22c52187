//! Statistics Calculator Module
//! Fixed-range histograms and mean/variance summaries over numeric columns.

use serde::Serialize;
use statrs::statistics::Statistics;

/// Binning specification for a fixed-range histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramSpec {
    pub bins: usize,
    pub min: f64,
    pub max: f64,
    /// Apply the natural log to every value before binning.
    pub log_transform: bool,
}

impl HistogramSpec {
    pub const fn linear(bins: usize, min: f64, max: f64) -> Self {
        Self {
            bins,
            min,
            max,
            log_transform: false,
        }
    }

    pub const fn log(bins: usize, min: f64, max: f64) -> Self {
        Self {
            bins,
            min,
            max,
            log_transform: true,
        }
    }
}

/// Equal-width bin counts. `edges` has one more entry than `counts`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl Histogram {
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// `(left edge, count)` pairs, the layout bar charts are drawn from.
    pub fn bars(&self) -> impl Iterator<Item = (f64, u64)> + '_ {
        self.edges.iter().copied().zip(self.counts.iter().copied())
    }
}

/// Mean and population variance of a filtered sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    pub variance: f64,
}

impl SummaryStats {
    /// Square root of the population variance. Shown under the
    /// "Standard error" label; it is the sample's standard deviation.
    pub fn standard_error(&self) -> f64 {
        self.variance.sqrt()
    }
}

/// Validity range applied before summarising. Bounds are optional;
/// `exclusive_min` rejects values equal to `min`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidRange {
    pub min: Option<f64>,
    pub exclusive_min: bool,
    pub max: Option<f64>,
}

impl ValidRange {
    pub const ANY: ValidRange = ValidRange {
        min: None,
        exclusive_min: false,
        max: None,
    };

    /// Strictly positive values.
    pub const fn positive() -> Self {
        Self {
            min: Some(0.0),
            exclusive_min: true,
            max: None,
        }
    }

    /// Values in `(0, upper]`.
    pub const fn positive_up_to(upper: f64) -> Self {
        Self {
            min: Some(0.0),
            exclusive_min: true,
            max: Some(upper),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        let above = match self.min {
            Some(min) if self.exclusive_min => value > min,
            Some(min) => value >= min,
            None => true,
        };
        above && self.max.map_or(true, |max| value <= max)
    }
}

/// Handles numeric reductions over extracted column values.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Bin values into `spec.bins` equal-width bins over `[min, max]`.
    ///
    /// The last bin is closed on the right. Values outside the range and
    /// non-finite values (including `ln(0)`) are not counted.
    pub fn histogram(values: impl IntoIterator<Item = f64>, spec: &HistogramSpec) -> Histogram {
        let bins = spec.bins.max(1);
        let width = (spec.max - spec.min) / bins as f64;
        let edges: Vec<f64> = (0..=bins)
            .map(|i| {
                if i == bins {
                    spec.max
                } else {
                    spec.min + width * i as f64
                }
            })
            .collect();
        let mut counts = vec![0u64; bins];

        for raw in values {
            let value = if spec.log_transform { raw.ln() } else { raw };
            if !value.is_finite() || value < spec.min || value > spec.max {
                continue;
            }

            let mut idx = (((value - spec.min) / width) as usize).min(bins - 1);
            // Float rounding can land a value one bin off its edges.
            if value < edges[idx] && idx > 0 {
                idx -= 1;
            } else if idx + 1 < bins && value >= edges[idx + 1] {
                idx += 1;
            }
            counts[idx] += 1;
        }

        Histogram { edges, counts }
    }

    /// Mean and population variance of the values inside `range`.
    pub fn summarize(values: impl IntoIterator<Item = f64>, range: ValidRange) -> Option<SummaryStats> {
        let sample: Vec<f64> = values.into_iter().filter(|v| range.contains(*v)).collect();
        if sample.is_empty() {
            return None;
        }

        let mean = sample.iter().mean();
        let variance = if sample.len() == 1 {
            0.0
        } else {
            sample.iter().population_variance().max(0.0)
        };

        Some(SummaryStats {
            count: sample.len(),
            mean,
            variance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn histogram_excludes_out_of_range_values() {
        let spec = HistogramSpec::linear(20, 1867.0, 1912.0);
        let years = [1866.0, 1867.0, 1870.0, 1890.5, 1912.0, 1913.0, f64::NAN];
        let hist = StatsCalculator::histogram(years, &spec);

        assert_eq!(hist.counts.len(), 20);
        assert_eq!(hist.edges.len(), 21);
        assert_eq!(hist.total(), 4);
        assert_eq!(hist.counts[0], 1);
        assert_eq!(hist.counts[1], 1);
        assert_eq!(hist.counts[10], 1);
        assert_eq!(hist.counts[19], 1);
        assert!(approx(hist.edges[1], 1869.25));
    }

    #[test]
    fn log_histogram_drops_zero_and_negative_values() {
        let spec = HistogramSpec::log(10, 0.0, 10.0);
        let durations = [0.0, -3.0, 1.0, 3.0, 365.0];
        let hist = StatsCalculator::histogram(durations, &spec);

        assert_eq!(hist.total(), 3);
        assert_eq!(hist.counts[0], 1);
        assert_eq!(hist.counts[1], 1);
        assert_eq!(hist.counts[5], 1);
    }

    #[test]
    fn histogram_bars_pair_left_edges_with_counts() {
        let hist = StatsCalculator::histogram([0.5, 1.5, 1.7], &HistogramSpec::linear(2, 0.0, 2.0));
        let bars: Vec<(f64, u64)> = hist.bars().collect();
        assert_eq!(bars, vec![(0.0, 1), (1.0, 2)]);
    }

    #[test]
    fn summary_uses_population_variance() {
        let wages = [100.0, 200.0, -5.0];
        let stats = StatsCalculator::summarize(wages, ValidRange::positive()).unwrap();

        assert_eq!(stats.count, 2);
        assert!(approx(stats.mean, 150.0));
        assert!(approx(stats.variance, 2500.0));
        assert!(approx(stats.standard_error(), 50.0));
    }

    #[test]
    fn summary_of_single_value_has_zero_variance() {
        let stats = StatsCalculator::summarize([42.0], ValidRange::ANY).unwrap();
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.mean, 42.0);
    }

    #[test]
    fn summary_respects_upper_bound_and_empty_samples() {
        let durations = [0.0, 10.0, 20.0, 5000.0];
        let stats =
            StatsCalculator::summarize(durations, ValidRange::positive_up_to(20.0)).unwrap();
        assert_eq!(stats.count, 2);
        assert!(approx(stats.mean, 15.0));
        assert!(stats.variance >= 0.0);

        assert!(StatsCalculator::summarize([-1.0, 0.0], ValidRange::positive()).is_none());
        assert!(StatsCalculator::summarize(Vec::new(), ValidRange::ANY).is_none());
    }
}
