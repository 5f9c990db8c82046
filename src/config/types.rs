//! Rate table types.
//!
//! This module contains the strongly-typed rate table structures that are
//! deserialized from the per-tax-year YAML files.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{EngineError, EngineResult};
use crate::models::NiCategory;

/// Percentage of the period's pay that PAYE deductions may not exceed.
pub const PAYE_REGULATORY_LIMIT: &str = "paye_regulatory_limit";
/// Lower Earnings Limit.
pub const NI_LOWER_EARNINGS_LIMIT: &str = "ni_lower_earnings_limit";
/// Primary (employee) threshold.
pub const NI_PRIMARY_THRESHOLD: &str = "ni_primary_threshold";
/// Secondary (employer) threshold.
pub const NI_SECONDARY_THRESHOLD: &str = "ni_secondary_threshold";
/// Upper Earnings Limit.
pub const NI_UPPER_EARNINGS_LIMIT: &str = "ni_upper_earnings_limit";
/// Upper Secondary Threshold for employees under 21.
pub const NI_UPPER_SECONDARY_THRESHOLD: &str = "ni_upper_secondary_threshold";
/// Apprentice Upper Secondary Threshold.
pub const NI_APPRENTICE_UPPER_SECONDARY_THRESHOLD: &str = "ni_apprentice_upper_secondary_threshold";

/// One income tax band.
///
/// Bands are listed from the lowest rate upwards. Every band except the last
/// has an annual width; the last band is open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBand {
    /// Annual width of the band, or `None` for the open top band.
    #[serde(default)]
    pub width: Option<Decimal>,
    /// Percentage rate charged on pay within the band.
    pub rate: Decimal,
}

/// Contribution rates for one National Insurance category.
///
/// All rates are percentages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NiCategoryRates {
    /// Employee rate between the primary threshold and the UEL.
    pub employee_main: Decimal,
    /// Employee rate above the UEL.
    pub employee_additional: Decimal,
    /// Employer rate between the secondary threshold and the employer's
    /// upper threshold.
    pub employer_main: Decimal,
    /// Employer rate above the employer's upper threshold.
    pub employer_additional: Decimal,
}

/// The resolved constants for one tax year.
///
/// A rate table is read-only for the duration of a calculation and may be
/// shared between concurrent calculations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    /// The tax year these constants apply to.
    pub tax_year: i32,
    /// Named numeric constants (thresholds, limits).
    #[serde(default)]
    pub constants: BTreeMap<String, Decimal>,
    /// Income tax bands, lowest rate first.
    pub income_tax_bands: Vec<TaxBand>,
    /// Contribution rates by category letter.
    #[serde(default)]
    pub ni_categories: BTreeMap<NiCategory, NiCategoryRates>,
}

impl RateTable {
    fn missing(&self, name: impl Into<String>) -> EngineError {
        EngineError::ConfigurationMissing {
            name: name.into(),
            tax_year: self.tax_year,
        }
    }

    /// Looks up a named constant.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigurationMissing`] naming the constant when
    /// the table does not define it.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::{RateTable, PAYE_REGULATORY_LIMIT};
    /// use rust_decimal::Decimal;
    ///
    /// let mut table = RateTable::new(2017);
    /// table.constants.insert(PAYE_REGULATORY_LIMIT.to_string(), Decimal::from(50));
    ///
    /// assert_eq!(table.constant(PAYE_REGULATORY_LIMIT).unwrap(), Decimal::from(50));
    /// assert!(table.constant("ni_upper_earnings_limit_weekly").is_err());
    /// ```
    pub fn constant(&self, name: &str) -> EngineResult<Decimal> {
        self.constants
            .get(name)
            .copied()
            .ok_or_else(|| self.missing(name))
    }

    /// Looks up the income tax band at `index` (0 is the basic rate band).
    pub fn band(&self, index: usize) -> EngineResult<&TaxBand> {
        self.income_tax_bands
            .get(index)
            .ok_or_else(|| self.missing(format!("income_tax_bands[{}]", index)))
    }

    /// Looks up the contribution rates for a category.
    pub fn ni_rates(&self, category: NiCategory) -> EngineResult<&NiCategoryRates> {
        self.ni_categories
            .get(&category)
            .ok_or_else(|| self.missing(format!("ni_categories.{}", category)))
    }

    /// Creates an empty table for a tax year.
    pub fn new(tax_year: i32) -> Self {
        Self {
            tax_year,
            constants: BTreeMap::new(),
            income_tax_bands: Vec::new(),
            ni_categories: BTreeMap::new(),
        }
    }

    /// Checks the structural rules a loaded table must satisfy.
    ///
    /// Returns a description of the first problem found.
    pub fn check(&self) -> Result<(), String> {
        if self.income_tax_bands.is_empty() {
            return Err("at least one income tax band is required".to_string());
        }

        let last = self.income_tax_bands.len() - 1;
        for (index, band) in self.income_tax_bands.iter().enumerate() {
            if band.rate.is_sign_negative() {
                return Err(format!("income tax band {} has a negative rate", index));
            }
            match band.width {
                None if index != last => {
                    return Err(format!("only the last income tax band may be open (band {})", index));
                }
                Some(width) if width <= Decimal::ZERO => {
                    return Err(format!("income tax band {} must have a positive width", index));
                }
                _ => {}
            }
        }

        for (name, value) in &self.constants {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(format!("constant '{}' must not be negative", name));
            }
        }

        Ok(())
    }
}
