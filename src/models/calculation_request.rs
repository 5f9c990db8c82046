//! Calculation request model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

use super::{NiCategory, PayFrequency, TaxCode};

/// Largest pay figure a request may carry: one trillion (10^12).
///
/// Every step's arithmetic on figures up to this bound stays well inside the
/// range of [`Decimal`].
pub const MAX_PAY_FIGURE: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// The inputs for one pay event.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{CalculationRequest, NiCategory, PayFrequency};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let request = CalculationRequest {
///     request_id: Uuid::nil(),
///     payment_date: NaiveDate::from_ymd_opt(2017, 4, 28).unwrap(),
///     pay_frequency: PayFrequency::Monthly,
///     gross_pay: Decimal::new(200000, 2),
///     previous_pay_to_date: Decimal::ZERO,
///     tax_paid_to_date: Decimal::ZERO,
///     tax_code: "1150L".parse().unwrap(),
///     ni_category: NiCategory::A,
/// };
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// Caller-supplied reference, echoed on the result.
    pub request_id: Uuid,
    /// The date the payment is made; selects the tax year and period.
    pub payment_date: NaiveDate,
    /// How often the employee is paid.
    pub pay_frequency: PayFrequency,
    /// Gross taxable pay for this period.
    pub gross_pay: Decimal,
    /// Taxable pay in the tax year before this period.
    #[serde(default)]
    pub previous_pay_to_date: Decimal,
    /// Tax deducted in the tax year before this period.
    #[serde(default)]
    pub tax_paid_to_date: Decimal,
    /// The employee's PAYE tax code.
    pub tax_code: TaxCode,
    /// The employee's National Insurance category letter.
    pub ni_category: NiCategory,
}

impl CalculationRequest {
    /// Checks the request for values no pipeline step could make sense of.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] naming the first pay figure that
    /// is negative or above [`MAX_PAY_FIGURE`].
    pub fn validate(&self) -> EngineResult<()> {
        let figures = [
            ("gross_pay", self.gross_pay),
            ("previous_pay_to_date", self.previous_pay_to_date),
            ("tax_paid_to_date", self.tax_paid_to_date),
        ];

        for (field, value) in figures {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(EngineError::invalid_input(
                    field,
                    format!("must not be negative (got {})", value),
                ));
            }
            if value > MAX_PAY_FIGURE {
                return Err(EngineError::invalid_input(
                    field,
                    format!("must not exceed {} (got {})", MAX_PAY_FIGURE, value),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_test_request() -> CalculationRequest {
        CalculationRequest {
            request_id: Uuid::nil(),
            payment_date: NaiveDate::from_ymd_opt(2017, 4, 28).unwrap(),
            pay_frequency: PayFrequency::Monthly,
            gross_pay: dec("2000.00"),
            previous_pay_to_date: Decimal::ZERO,
            tax_paid_to_date: Decimal::ZERO,
            tax_code: "1150L".parse().unwrap(),
            ni_category: NiCategory::A,
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(create_test_request().validate().is_ok());
    }

    #[test]
    fn test_negative_gross_pay_is_rejected() {
        let mut request = create_test_request();
        request.gross_pay = dec("-0.01");

        match request.validate() {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "gross_pay"),
            other => panic!("Expected InvalidInput error, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_tax_paid_is_rejected() {
        let mut request = create_test_request();
        request.tax_paid_to_date = dec("-5");

        match request.validate() {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "tax_paid_to_date"),
            other => panic!("Expected InvalidInput error, got {:?}", other),
        }
    }

    #[test]
    fn test_pay_figures_above_the_ceiling_are_rejected() {
        assert_eq!(MAX_PAY_FIGURE, Decimal::from(1_000_000_000_000_i64));

        let mut request = create_test_request();
        request.gross_pay = MAX_PAY_FIGURE;
        assert!(request.validate().is_ok());

        request.gross_pay = dec("79000000000000000000000000000");
        match request.validate() {
            Err(EngineError::InvalidInput { field, message }) => {
                assert_eq!(field, "gross_pay");
                assert!(message.contains("must not exceed"));
            }
            other => panic!("Expected InvalidInput error, got {:?}", other),
        }

        let mut request = create_test_request();
        request.previous_pay_to_date = MAX_PAY_FIGURE + Decimal::new(1, 2);
        match request.validate() {
            Err(EngineError::InvalidInput { field, .. }) => {
                assert_eq!(field, "previous_pay_to_date");
            }
            other => panic!("Expected InvalidInput error, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_zero_is_accepted() {
        let mut request = create_test_request();
        request.previous_pay_to_date = dec("-0.00");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_deserialize_request() {
        let json = r#"{
            "request_id": "12345678-1234-1234-1234-123456789012",
            "payment_date": "2017-05-28",
            "pay_frequency": "monthly",
            "gross_pay": "2000.00",
            "previous_pay_to_date": "2000.00",
            "tax_paid_to_date": "208.00",
            "tax_code": "1150L",
            "ni_category": "A"
        }"#;

        let request: CalculationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.pay_frequency, PayFrequency::Monthly);
        assert_eq!(request.tax_paid_to_date, dec("208.00"));
        assert_eq!(request.tax_code.to_string(), "1150L");
    }

    #[test]
    fn test_year_to_date_figures_default_to_zero() {
        let json = r#"{
            "request_id": "12345678-1234-1234-1234-123456789012",
            "payment_date": "2017-04-28",
            "pay_frequency": "weekly",
            "gross_pay": "500",
            "tax_code": "BR",
            "ni_category": "A"
        }"#;

        let request: CalculationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.previous_pay_to_date, Decimal::ZERO);
        assert_eq!(request.tax_paid_to_date, Decimal::ZERO);
    }

    #[test]
    fn test_deserialize_rejects_unknown_tax_code() {
        let json = r#"{
            "request_id": "12345678-1234-1234-1234-123456789012",
            "payment_date": "2017-04-28",
            "pay_frequency": "weekly",
            "gross_pay": "500",
            "tax_code": "ZZ9",
            "ni_category": "A"
        }"#;

        assert!(serde_json::from_str::<CalculationRequest>(json).is_err());
    }
}
