//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while resolving rate tables and
//! running a deduction calculation.

use thiserror::Error;

/// The main error type for the payroll engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::ConfigurationMissing {
///     name: "ni_upper_earnings_limit_weekly".to_string(),
///     tax_year: 2017,
/// };
/// assert_eq!(
///     error.to_string(),
///     "Rate table for tax year 2017 is missing 'ni_upper_earnings_limit_weekly'"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A request field was malformed or out of range.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// No calculation variant is registered for the tax year.
    #[error("No calculation variant is defined for tax year {tax_year}")]
    UnsupportedTaxYear {
        /// The tax year that was requested.
        tax_year: i32,
    },

    /// A pipeline step needed a constant the rate table does not define.
    #[error("Rate table for tax year {tax_year} is missing '{name}'")]
    ConfigurationMissing {
        /// The name of the missing constant.
        name: String,
        /// The tax year of the rate table.
        tax_year: i32,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for building an [`EngineError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true for errors caused by the caller's request rather than
    /// by configuration or engine state.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidInput { .. } | EngineError::UnsupportedTaxYear { .. }
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
