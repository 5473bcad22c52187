//! Data module - dataset loading, schema and row selection

mod boundary;
mod loader;
mod processor;
mod schema;

pub use boundary::{load_boundaries, RegionBoundary, Ring};
pub use loader::{parse_date, DataLoader, EmploymentTable, LoaderError};
pub use processor::{DataProcessor, FilterParams, ProcessorError, RequiredField};
pub use schema::{
    required_columns, EmploymentRecord, FlagSet, Industry, Nationality, COL_DURATION, COL_ID,
    COL_LATITUDE, COL_LONGITUDE, COL_REGION, COL_START_DATE, COL_WAGE,
};
