//! Grouped aggregations: location frequency and category totals.

use crate::data::{EmploymentRecord, Industry, Nationality};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Hire count at one (latitude, longitude, region) location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationFrequency {
    pub latitude: f64,
    pub longitude: f64,
    pub region: String,
    pub records: u64,
    /// `ln(records + 1)^p`, a display scaling only.
    pub log_frequency: f64,
    /// `log_frequency` divided by the largest `log_frequency`, in `[0, 1]`.
    pub max_percentage: f64,
}

/// Summed indicator count for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: u64,
    /// `ln(count + 1)` when the log display transform is requested.
    pub display_value: f64,
}

/// Cosmetic `ln(count + 1)^power` scaling applied before visual encoding.
pub fn log_power(count: u64, power: f64) -> f64 {
    (count as f64 + 1.0).ln().powf(power)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct OrdF64(f64);

impl Eq for OrdF64 {}

impl PartialOrd for OrdF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Group located records by (latitude, longitude, region) and count them.
///
/// Records missing coordinates or region are ignored. Output is ordered by key.
pub fn location_frequency(records: &[&EmploymentRecord], power: f64) -> Vec<LocationFrequency> {
    let mut groups: BTreeMap<(OrdF64, OrdF64, &str), u64> = BTreeMap::new();
    for record in records {
        if let (Some((lat, lon)), Some(region)) = (record.coordinates(), record.region.as_deref()) {
            *groups.entry((OrdF64(lat), OrdF64(lon), region)).or_default() += 1;
        }
    }

    let mut table: Vec<LocationFrequency> = groups
        .into_iter()
        .map(|((lat, lon, region), records)| LocationFrequency {
            latitude: lat.0,
            longitude: lon.0,
            region: region.to_string(),
            records,
            log_frequency: log_power(records, power),
            max_percentage: 0.0,
        })
        .collect();

    let max = table
        .iter()
        .map(|row| row.log_frequency)
        .fold(0.0_f64, f64::max);
    if max > 0.0 {
        for row in &mut table {
            row.max_percentage = row.log_frequency / max;
        }
    }

    table
}

fn sorted_totals(mut totals: Vec<CategoryCount>, log_display: bool) -> Vec<CategoryCount> {
    for total in &mut totals {
        total.display_value = if log_display {
            (total.count as f64 + 1.0).ln()
        } else {
            total.count as f64
        };
    }
    // Stable sort keeps enum order among equal counts.
    totals.sort_by_key(|t| t.count);
    totals
}

/// Per-nationality indicator sums, ascending by count.
pub fn nationality_totals(records: &[&EmploymentRecord], log_display: bool) -> Vec<CategoryCount> {
    let totals = Nationality::ALL
        .iter()
        .map(|&n| CategoryCount {
            label: n.label().to_string(),
            count: records.iter().filter(|r| r.has_nationality(n)).count() as u64,
            display_value: 0.0,
        })
        .collect();
    sorted_totals(totals, log_display)
}

/// Per-industry indicator sums, ascending by count.
pub fn industry_totals(records: &[&EmploymentRecord], log_display: bool) -> Vec<CategoryCount> {
    let totals = Industry::ALL
        .iter()
        .map(|&i| CategoryCount {
            label: i.label().to_string(),
            count: records.iter().filter(|r| r.has_industry(i)).count() as u64,
            display_value: 0.0,
        })
        .collect();
    sorted_totals(totals, log_display)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(id: &str, lat: f64, lon: f64, region: &str) -> EmploymentRecord {
        let mut r = EmploymentRecord::new(id);
        r.latitude = Some(lat);
        r.longitude = Some(lon);
        r.region = Some(region.to_string());
        r
    }

    #[test]
    fn groups_and_normalizes_locations() {
        let records = vec![
            at("1", 35.0, 135.0, "Kyoto"),
            at("2", 35.0, 135.0, "Kyoto"),
            at("3", 35.0, 135.0, "Kyoto"),
            at("4", 36.0, 136.0, "Fukui"),
            EmploymentRecord::new("5"),
        ];
        let refs: Vec<&EmploymentRecord> = records.iter().collect();
        let table = location_frequency(&refs, 2.0);

        assert_eq!(table.len(), 2);
        assert_eq!(table[0].region, "Kyoto");
        assert_eq!(table[0].records, 3);
        assert_eq!(table[0].max_percentage, 1.0);
        assert_eq!(table[1].records, 1);
        assert!(table[1].max_percentage > 0.0 && table[1].max_percentage < 1.0);

        let total: u64 = table.iter().map(|row| row.records).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn records_without_region_are_not_grouped() {
        let mut unnamed = at("2", 36.0, 136.0, "");
        unnamed.region = None;
        let records = [at("1", 35.0, 135.0, "Kyoto"), unnamed];
        let refs: Vec<&EmploymentRecord> = records.iter().collect();

        let table = location_frequency(&refs, 2.0);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].region, "Kyoto");
        assert_eq!(table[0].max_percentage, 1.0);
    }

    #[test]
    fn log_power_is_monotonic() {
        for power in [2.0, 2.5] {
            let mut previous = log_power(0, power);
            assert_eq!(previous, 0.0);
            for count in 1..500 {
                let current = log_power(count, power);
                assert!(current > previous);
                previous = current;
            }
        }
    }

    #[test]
    fn empty_input_yields_empty_table() {
        assert!(location_frequency(&[], 2.5).is_empty());
    }

    #[test]
    fn category_totals_sort_ascending() {
        let mut a = EmploymentRecord::new("a");
        a.nationalities.insert(Nationality::British as usize);
        a.industries.insert(Industry::Engineering as usize);
        let mut b = EmploymentRecord::new("b");
        b.nationalities.insert(Nationality::British as usize);
        b.industries.insert(Industry::Trade as usize);
        let mut c = EmploymentRecord::new("c");
        c.nationalities.insert(Nationality::French as usize);
        c.industries.insert(Industry::Engineering as usize);
        let records = [a, b, c];
        let refs: Vec<&EmploymentRecord> = records.iter().collect();

        let nationalities = nationality_totals(&refs, false);
        assert_eq!(nationalities.len(), 25);
        let last = nationalities.last().unwrap();
        assert_eq!(last.label, "British");
        assert_eq!(last.count, 2);
        assert!(nationalities
            .windows(2)
            .all(|pair| pair[0].count <= pair[1].count));

        let industries = industry_totals(&refs, true);
        let engineering = industries.last().unwrap();
        assert_eq!(engineering.label, "Engineering");
        assert!((engineering.display_value - 3.0_f64.ln()).abs() < 1e-12);
        assert_eq!(industries[0].display_value, 0.0);
    }
}
