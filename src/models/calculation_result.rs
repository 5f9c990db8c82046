//! Calculation result models for the payroll engine.
//!
//! This module contains the [`CalculationResult`] type and its associated
//! structures that capture the outputs of one pay event: the PAYE and
//! National Insurance subtotals plus the audit trace of every pipeline step.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PayFrequency, TaxCode, TaxPeriod};

/// A single step in the audit trace recording one computed variable.
///
/// # Example
///
/// ```
/// use payroll_engine::models::AuditStep;
/// use rust_decimal::Decimal;
///
/// let step = AuditStep {
///     step_number: 1,
///     variable: "period_number".to_string(),
///     description: "Current period number".to_string(),
///     defined_by: "2013".to_string(),
///     value: Decimal::ONE,
/// };
/// assert_eq!(step.variable, "period_number");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number, starting at 1.
    pub step_number: u32,
    /// The variable the step wrote.
    pub variable: String,
    /// Human-readable description of the step.
    pub description: String,
    /// The variant whose definition of the step was used.
    pub defined_by: String,
    /// The computed value.
    pub value: Decimal,
}

/// PAYE income tax figures for the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayeSubtotals {
    /// The tax code the calculation was run with.
    pub tax_code: TaxCode,
    /// Period number used for cumulative factoring (1 on the week 1 / month 1 basis).
    pub period_number: u32,
    /// Gross pay for the period.
    pub pay_this_period: Decimal,
    /// Total pay to date including this period.
    pub pay_to_date: Decimal,
    /// Tax-free pay to date; negative for `K` codes.
    pub free_pay_to_date: Decimal,
    /// Taxable pay to date in whole pounds.
    pub taxable_pay_to_date: Decimal,
    /// Tax due on the taxable pay to date.
    pub tax_due_to_date: Decimal,
    /// Tax to deduct this period.
    pub tax_due_this_period: Decimal,
}

/// National Insurance figures for the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NiSubtotals {
    /// Earnings the contributions were assessed on.
    pub earnings: Decimal,
    /// Lower Earnings Limit for the period.
    pub lower_earnings_limit: Decimal,
    /// Primary threshold for the period.
    pub primary_threshold: Decimal,
    /// Secondary threshold for the period.
    pub secondary_threshold: Decimal,
    /// Upper Earnings Limit for the period.
    pub upper_earnings_limit: Decimal,
    /// Threshold above which the employer's additional rate applies.
    pub employer_upper_threshold: Decimal,
    /// Employee contribution.
    pub employee_contribution: Decimal,
    /// Employer contribution.
    pub employer_contribution: Decimal,
}

/// The complete result of one pay event calculation.
///
/// The result is a read-only value: everything it reports was produced by
/// the pipeline run for this request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// The caller's reference, echoed from the request.
    pub request_id: Uuid,
    /// The tax year the payment date falls in.
    pub tax_year: i32,
    /// Tax period coordinates of the payment date.
    pub tax_period: TaxPeriod,
    /// The pay frequency the figures were factored for.
    pub pay_frequency: PayFrequency,
    /// The rule variant the calculation was resolved to.
    pub variant: String,
    /// PAYE income tax figures.
    pub paye: PayeSubtotals,
    /// National Insurance figures.
    pub national_insurance: NiSubtotals,
    /// One entry per pipeline step, in execution order.
    pub audit_trace: Vec<AuditStep>,
}

impl CalculationResult {
    /// Tax to deduct this period.
    pub fn paye_tax(&self) -> Decimal {
        self.paye.tax_due_this_period
    }

    /// Employee National Insurance contribution.
    pub fn employee_ni(&self) -> Decimal {
        self.national_insurance.employee_contribution
    }

    /// Employer National Insurance contribution.
    pub fn employer_ni(&self) -> Decimal {
        self.national_insurance.employer_contribution
    }

    /// Total deducted from the employee's pay.
    pub fn total_deductions(&self) -> Decimal {
        self.paye_tax() + self.employee_ni()
    }

    /// Pay after PAYE and employee National Insurance.
    pub fn net_pay(&self) -> Decimal {
        self.paye.pay_this_period - self.total_deductions()
    }

    /// Looks up a step in the audit trace by variable name.
    pub fn audit_step(&self, variable: &str) -> Option<&AuditStep> {
        self.audit_trace.iter().find(|s| s.variable == variable)
    }
}
