//! Rate table configuration for the payroll engine.
//!
//! This module provides functionality to load per-tax-year rate tables from
//! YAML files: named thresholds and limits, income tax bands, and National
//! Insurance contribution rates by category.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::RateTableLoader;
//!
//! let loader = RateTableLoader::load("./config/rates").unwrap();
//! println!("Loaded tax years: {:?}", loader.tax_years().collect::<Vec<_>>());
//! ```

mod loader;
mod types;

pub use loader::RateTableLoader;
pub use types::{
    NI_APPRENTICE_UPPER_SECONDARY_THRESHOLD, NI_LOWER_EARNINGS_LIMIT, NI_PRIMARY_THRESHOLD,
    NI_SECONDARY_THRESHOLD, NI_UPPER_EARNINGS_LIMIT, NI_UPPER_SECONDARY_THRESHOLD,
    NiCategoryRates, PAYE_REGULATORY_LIMIT, RateTable, TaxBand,
};
