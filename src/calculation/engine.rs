//! The deduction engine entry point.
//!
//! [`PayrollEngine`] resolves the tax period and rule variant for a request,
//! runs the variant's pipeline against the rate table, and assembles the
//! result.

use std::time::Instant;

use tracing::{error, info, warn};

use crate::config::{RateTable, RateTableLoader};
use crate::error::{EngineError, EngineResult};
use crate::models::{CalculationRequest, CalculationResult, TaxPeriod};

use super::assembly::assemble_result;
use super::pipeline::{CalculationContainer, StepContext};
use super::variants::VariantRegistry;

/// Calculates PAYE and National Insurance deductions for pay events.
///
/// The engine holds no per-request state. A single instance can serve any
/// number of calculations, including concurrent ones.
///
/// # Example
///
/// ```no_run
/// use payroll_engine::calculation::PayrollEngine;
/// use payroll_engine::config::RateTableLoader;
/// use payroll_engine::models::{CalculationRequest, NiCategory, PayFrequency};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let engine = PayrollEngine::new().unwrap();
/// let rates = RateTableLoader::load("./config/rates").unwrap();
///
/// let request = CalculationRequest {
///     request_id: Uuid::new_v4(),
///     payment_date: NaiveDate::from_ymd_opt(2017, 4, 28).unwrap(),
///     pay_frequency: PayFrequency::Monthly,
///     gross_pay: Decimal::from(2000),
///     previous_pay_to_date: Decimal::ZERO,
///     tax_paid_to_date: Decimal::ZERO,
///     tax_code: "1150L".parse().unwrap(),
///     ni_category: NiCategory::A,
/// };
///
/// let result = engine.calculate_with(&request, &rates).unwrap();
/// assert_eq!(result.paye_tax(), Decimal::new(20800, 2));
/// ```
#[derive(Debug, Clone)]
pub struct PayrollEngine {
    registry: VariantRegistry,
}

impl PayrollEngine {
    /// Creates an engine with the standard variant chain.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CalculationError`] if the variant chain is
    /// inconsistent.
    pub fn new() -> EngineResult<Self> {
        Ok(Self::with_registry(VariantRegistry::standard()?))
    }

    /// Creates an engine over a custom variant registry.
    pub fn with_registry(registry: VariantRegistry) -> Self {
        Self { registry }
    }

    /// The variant registry the engine resolves against.
    pub fn registry(&self) -> &VariantRegistry {
        &self.registry
    }

    /// Calculates the deductions for one pay event.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidInput`] for negative pay figures, or when the
    ///   rate table is for a different tax year than the payment date
    /// - [`EngineError::UnsupportedTaxYear`] when no variant serves the year
    /// - [`EngineError::ConfigurationMissing`] when the rate table lacks a
    ///   constant a step needs
    /// - [`EngineError::CalculationError`] for internal inconsistencies
    pub fn calculate(
        &self,
        request: &CalculationRequest,
        rates: &RateTable,
    ) -> EngineResult<CalculationResult> {
        info!(
            request_id = %request.request_id,
            payment_date = %request.payment_date,
            "Processing calculation request"
        );

        let start_time = Instant::now();
        match self.run(request, rates) {
            Ok(result) => {
                info!(
                    request_id = %request.request_id,
                    tax_year = result.tax_year,
                    variant = %result.variant,
                    paye_tax = %result.paye_tax(),
                    employee_ni = %result.employee_ni(),
                    employer_ni = %result.employer_ni(),
                    duration_us = start_time.elapsed().as_micros(),
                    "Calculation completed successfully"
                );
                Ok(result)
            }
            Err(err) => {
                if err.is_input_error() {
                    warn!(
                        request_id = %request.request_id,
                        error = %err,
                        "Calculation rejected"
                    );
                } else {
                    error!(
                        request_id = %request.request_id,
                        error = %err,
                        "Calculation failed"
                    );
                }
                Err(err)
            }
        }
    }

    /// Calculates one pay event, picking the rate table for its tax year.
    ///
    /// # Errors
    ///
    /// As [`PayrollEngine::calculate`], plus
    /// [`EngineError::ConfigurationMissing`] when no rate table was loaded
    /// for the tax year.
    pub fn calculate_with(
        &self,
        request: &CalculationRequest,
        loader: &RateTableLoader,
    ) -> EngineResult<CalculationResult> {
        let rates = loader.rate_table_for_date(request.payment_date)?;
        self.calculate(request, rates)
    }

    /// Calculates a batch of independent pay events against one rate table.
    ///
    /// Each request succeeds or fails on its own; results are returned in
    /// request order.
    pub fn calculate_batch(
        &self,
        requests: &[CalculationRequest],
        rates: &RateTable,
    ) -> Vec<EngineResult<CalculationResult>> {
        requests
            .iter()
            .map(|request| self.calculate(request, rates))
            .collect()
    }

    fn run(&self, request: &CalculationRequest, rates: &RateTable) -> EngineResult<CalculationResult> {
        request.validate()?;

        let period = TaxPeriod::from_date(request.payment_date)?;
        if rates.tax_year != period.year {
            return Err(EngineError::invalid_input(
                "payment_date",
                format!(
                    "falls in tax year {} but the rate table is for {}",
                    period.year, rates.tax_year
                ),
            ));
        }

        let pipeline = self.registry.pipeline_for(period.year)?;
        let context = StepContext::new(request, &period, rates);
        let mut container = CalculationContainer::new();
        let audit_trace = pipeline.run(&context, &mut container)?;

        assemble_result(request, period, pipeline.variant(), &container, audit_trace)
    }
}
