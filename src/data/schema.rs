//! Employment Record Schema
//! Typed fields of the Oyatoi dataset, resolved once at load time.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;

pub const COL_ID: &str = "id";
pub const COL_REGION: &str = "region_eng";
pub const COL_LATITUDE: &str = "latitude";
pub const COL_LONGITUDE: &str = "longitude";
pub const COL_START_DATE: &str = "employment_start_date_converted";
pub const COL_DURATION: &str = "time_employed_converted";
pub const COL_WAGE: &str = "wage_converted_into_yen";

/// Scalar columns every dataset must carry.
pub const SCALAR_COLUMNS: [&str; 7] = [
    COL_ID,
    COL_REGION,
    COL_LATITUDE,
    COL_LONGITUDE,
    COL_START_DATE,
    COL_DURATION,
    COL_WAGE,
];

/// Nationality of a hired foreigner, one-hot encoded in the source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Nationality {
    American,
    Austrian,
    Belgian,
    British,
    Canadian,
    Chinese,
    Danish,
    Dutch,
    French,
    German,
    Hungarian,
    Indian,
    Irish,
    Italian,
    Korean,
    Norwegian,
    Polish,
    Portuguese,
    Russian,
    Scottish,
    Spanish,
    Swedish,
    Swiss,
    Turkish,
    Other,
}

impl Nationality {
    pub const ALL: [Nationality; 25] = [
        Nationality::American,
        Nationality::Austrian,
        Nationality::Belgian,
        Nationality::British,
        Nationality::Canadian,
        Nationality::Chinese,
        Nationality::Danish,
        Nationality::Dutch,
        Nationality::French,
        Nationality::German,
        Nationality::Hungarian,
        Nationality::Indian,
        Nationality::Irish,
        Nationality::Italian,
        Nationality::Korean,
        Nationality::Norwegian,
        Nationality::Polish,
        Nationality::Portuguese,
        Nationality::Russian,
        Nationality::Scottish,
        Nationality::Spanish,
        Nationality::Swedish,
        Nationality::Swiss,
        Nationality::Turkish,
        Nationality::Other,
    ];

    /// Source column holding this nationality's indicator.
    pub fn column(self) -> &'static str {
        match self {
            Nationality::American => "american",
            Nationality::Austrian => "austrian",
            Nationality::Belgian => "belgian",
            Nationality::British => "british",
            Nationality::Canadian => "canadian",
            Nationality::Chinese => "chinese",
            Nationality::Danish => "danish",
            Nationality::Dutch => "dutch",
            Nationality::French => "french",
            Nationality::German => "german",
            Nationality::Hungarian => "hungarian",
            Nationality::Indian => "indian",
            Nationality::Irish => "irish",
            Nationality::Italian => "italian",
            Nationality::Korean => "korean",
            Nationality::Norwegian => "norwegian",
            Nationality::Polish => "polish",
            Nationality::Portuguese => "portuguese",
            Nationality::Russian => "russian",
            Nationality::Scottish => "scottish",
            Nationality::Spanish => "spanish",
            Nationality::Swedish => "swedish",
            Nationality::Swiss => "swiss",
            Nationality::Turkish => "turkish",
            Nationality::Other => "other_nationality",
        }
    }

    pub fn label(self) -> &'static str {
        NATIONALITY_LABELS[self as usize]
    }
}

const NATIONALITY_LABELS: [&str; 25] = [
    "American",
    "Austrian",
    "Belgian",
    "British",
    "Canadian",
    "Chinese",
    "Danish",
    "Dutch",
    "French",
    "German",
    "Hungarian",
    "Indian",
    "Irish",
    "Italian",
    "Korean",
    "Norwegian",
    "Polish",
    "Portuguese",
    "Russian",
    "Scottish",
    "Spanish",
    "Swedish",
    "Swiss",
    "Turkish",
    "Other",
];

impl fmt::Display for Nationality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Industry an appointment belongs to, one-hot encoded in the source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Industry {
    Education,
    Government,
    Military,
    Engineering,
    Medicine,
    Trade,
    Mining,
    Other,
}

impl Industry {
    pub const ALL: [Industry; 8] = [
        Industry::Education,
        Industry::Government,
        Industry::Military,
        Industry::Engineering,
        Industry::Medicine,
        Industry::Trade,
        Industry::Mining,
        Industry::Other,
    ];

    /// Source column holding this industry's indicator. Region boundary
    /// documents use the same names for their per-industry counts.
    pub fn column(self) -> &'static str {
        match self {
            Industry::Education => "education",
            Industry::Government => "government",
            Industry::Military => "military",
            Industry::Engineering => "engineering",
            Industry::Medicine => "medicine",
            Industry::Trade => "trade",
            Industry::Mining => "mining",
            Industry::Other => "other_industry",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Industry::Education => "Education",
            Industry::Government => "Government",
            Industry::Military => "Military",
            Industry::Engineering => "Engineering",
            Industry::Medicine => "Medicine",
            Industry::Trade => "Trade",
            Industry::Mining => "Mining",
            Industry::Other => "Other",
        }
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Set of one-hot flags stored as a bitmask indexed by enum discriminant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FlagSet(u32);

impl FlagSet {
    pub fn insert(&mut self, index: usize) {
        self.0 |= 1 << index;
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0 & (1 << index) != 0
    }
}

/// One row of the source dataset: a single (person, work period, location) engagement.
#[derive(Debug, Clone, PartialEq)]
pub struct EmploymentRecord {
    pub id: String,
    pub region: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub duration_days: Option<f64>,
    pub wage_yen: Option<f64>,
    pub nationalities: FlagSet,
    pub industries: FlagSet,
}

impl EmploymentRecord {
    /// Record with only an identifier set; mostly useful for building fixtures.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            region: None,
            latitude: None,
            longitude: None,
            start_date: None,
            duration_days: None,
            wage_yen: None,
            nationalities: FlagSet::default(),
            industries: FlagSet::default(),
        }
    }

    pub fn has_nationality(&self, nationality: Nationality) -> bool {
        self.nationalities.contains(nationality as usize)
    }

    pub fn has_industry(&self, industry: Industry) -> bool {
        self.industries.contains(industry as usize)
    }

    /// Both coordinates, when present and finite.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }

    pub fn start_year(&self) -> Option<i32> {
        self.start_date.map(|d| d.year())
    }
}

/// All schema columns in source order: scalars, nationalities, industries.
pub fn required_columns() -> Vec<&'static str> {
    SCALAR_COLUMNS
        .iter()
        .copied()
        .chain(Nationality::ALL.iter().map(|n| n.column()))
        .chain(Industry::ALL.iter().map(|i| i.column()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_set_tracks_inserted_indices() {
        let mut flags = FlagSet::default();
        assert_eq!(flags, FlagSet::default());
        assert!(!flags.contains(0));
        flags.insert(Nationality::Other as usize);
        flags.insert(Nationality::American as usize);
        assert!(flags.contains(24));
        assert!(flags.contains(0));
        assert!(!flags.contains(3));
    }

    #[test]
    fn column_names_are_unique() {
        let mut columns = required_columns();
        let total = columns.len();
        columns.sort_unstable();
        columns.dedup();
        assert_eq!(columns.len(), total);
        assert_eq!(total, 7 + 25 + 8);
    }

    #[test]
    fn labels_follow_enum_order() {
        assert_eq!(Nationality::Scottish.label(), "Scottish");
        assert_eq!(Nationality::Other.to_string(), "Other");
        assert_eq!(Industry::Medicine.to_string(), "Medicine");
    }

    #[test]
    fn coordinates_require_both_finite_values() {
        let mut record = EmploymentRecord::new("1");
        record.latitude = Some(35.0);
        assert_eq!(record.coordinates(), None);
        record.longitude = Some(f64::NAN);
        assert_eq!(record.coordinates(), None);
        record.longitude = Some(135.0);
        assert_eq!(record.coordinates(), Some((35.0, 135.0)));
    }
}
