//! Names of the variables written to the calculation container.
//!
//! Each pipeline step writes exactly one of these. The regulator's symbol for
//! the PAYE variables is given in brackets.

/// Current period number (n).
pub const PERIOD_NUMBER: &str = "period_number";
/// Gross pay for the period (pn).
pub const PAY_THIS_PERIOD: &str = "pay_this_period";
/// Pay in the tax year before this period.
pub const PREVIOUS_PAY_TO_DATE: &str = "previous_pay_to_date";
/// Total pay to date including this period (Pn).
pub const PAY_TO_DATE: &str = "pay_to_date";
/// Tax deducted in the tax year before this period.
pub const PREVIOUS_TAX_PAID: &str = "previous_tax_paid";
/// Tax-free pay to date (Un); negative additional pay for K codes.
pub const FREE_PAY_TO_DATE: &str = "free_pay_to_date";
/// Taxable pay to date in whole pounds (Tn).
pub const TAXABLE_PAY_TO_DATE: &str = "taxable_pay_to_date";
/// Tax due to date (Ln).
pub const TAX_DUE_TO_DATE: &str = "tax_due_to_date";
/// Tax to deduct this period (ln).
pub const TAX_DUE_THIS_PERIOD: &str = "tax_due_this_period";

/// Earnings subject to National Insurance this period.
pub const NI_EARNINGS: &str = "ni_earnings";
/// Lower Earnings Limit for the period.
pub const NI_LOWER_EARNINGS_LIMIT: &str = "ni_lower_earnings_limit";
/// Primary threshold for the period.
pub const NI_PRIMARY_THRESHOLD: &str = "ni_primary_threshold";
/// Secondary threshold for the period.
pub const NI_SECONDARY_THRESHOLD: &str = "ni_secondary_threshold";
/// Upper Earnings Limit for the period.
pub const NI_UPPER_EARNINGS_LIMIT: &str = "ni_upper_earnings_limit";
/// Threshold above which the employer's additional rate applies.
pub const NI_EMPLOYER_UPPER_THRESHOLD: &str = "ni_employer_upper_threshold";
/// Employee contribution for the period.
pub const EMPLOYEE_NI: &str = "employee_ni";
/// Employer contribution for the period.
pub const EMPLOYER_NI: &str = "employer_ni";
