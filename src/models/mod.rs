//! Core data models for the payroll engine.
//!
//! This module contains the domain models used throughout the engine: the
//! request and result of a calculation, tax codes, National Insurance
//! categories, pay frequencies and tax period coordinates.

mod calculation_request;
mod calculation_result;
mod ni_category;
mod pay_frequency;
mod tax_code;
mod tax_period;

pub use calculation_request::{CalculationRequest, MAX_PAY_FIGURE};
pub use calculation_result::{AuditStep, CalculationResult, NiSubtotals, PayeSubtotals};
pub use ni_category::NiCategory;
pub use pay_frequency::{PayFrequency, PeriodFactoring};
pub use tax_code::{TaxCode, TaxCodeKind};
pub use tax_period::{
    TAX_YEAR_START_DAY, TAX_YEAR_START_MONTH, TaxPeriod, tax_year_end, tax_year_start,
};
