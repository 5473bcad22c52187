//! Oyatoi Dashboard - hired foreigners in Meiji-era Japan
//!
//! Loads the employment dataset from object storage, filters it by the
//! user's selections and turns it into map and chart views.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod pipeline;
pub mod stats;
pub mod store;
