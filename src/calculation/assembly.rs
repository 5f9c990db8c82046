//! Builds a [`CalculationResult`] from a completed calculation container.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, CalculationRequest, CalculationResult, NiSubtotals, PayeSubtotals, TaxPeriod,
};

use super::pipeline::CalculationContainer;
use super::variables::*;

/// Collects the final variables into a result.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] when the pipeline did not write
/// one of the variables the result reports.
pub fn assemble_result(
    request: &CalculationRequest,
    tax_period: TaxPeriod,
    variant: &str,
    container: &CalculationContainer,
    audit_trace: Vec<AuditStep>,
) -> EngineResult<CalculationResult> {
    let period_number = container.get(PERIOD_NUMBER)?;

    let paye = PayeSubtotals {
        tax_code: request.tax_code.clone(),
        period_number: whole_number(PERIOD_NUMBER, period_number)?,
        pay_this_period: container.get(PAY_THIS_PERIOD)?,
        pay_to_date: container.get(PAY_TO_DATE)?,
        free_pay_to_date: container.get(FREE_PAY_TO_DATE)?,
        taxable_pay_to_date: container.get(TAXABLE_PAY_TO_DATE)?,
        tax_due_to_date: container.get(TAX_DUE_TO_DATE)?,
        tax_due_this_period: container.get(TAX_DUE_THIS_PERIOD)?,
    };

    let national_insurance = NiSubtotals {
        earnings: container.get(NI_EARNINGS)?,
        lower_earnings_limit: container.get(NI_LOWER_EARNINGS_LIMIT)?,
        primary_threshold: container.get(NI_PRIMARY_THRESHOLD)?,
        secondary_threshold: container.get(NI_SECONDARY_THRESHOLD)?,
        upper_earnings_limit: container.get(NI_UPPER_EARNINGS_LIMIT)?,
        employer_upper_threshold: container.get(NI_EMPLOYER_UPPER_THRESHOLD)?,
        employee_contribution: container.get(EMPLOYEE_NI)?,
        employer_contribution: container.get(EMPLOYER_NI)?,
    };

    Ok(CalculationResult {
        request_id: request.request_id,
        tax_year: tax_period.year,
        tax_period,
        pay_frequency: request.pay_frequency,
        variant: variant.to_string(),
        paye,
        national_insurance,
        audit_trace,
    })
}

fn whole_number(name: &str, value: Decimal) -> EngineResult<u32> {
    value
        .fract()
        .is_zero()
        .then(|| value.to_u32())
        .flatten()
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("variable '{}' is not a whole period number: {}", name, value),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NiCategory, PayFrequency};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn create_test_request() -> CalculationRequest {
        CalculationRequest {
            request_id: Uuid::from_u128(42),
            payment_date: NaiveDate::from_ymd_opt(2017, 4, 28).unwrap(),
            pay_frequency: PayFrequency::Monthly,
            gross_pay: Decimal::from(2000),
            previous_pay_to_date: Decimal::ZERO,
            tax_paid_to_date: Decimal::ZERO,
            tax_code: "1150L".parse().unwrap(),
            ni_category: NiCategory::A,
        }
    }

    fn create_full_container() -> CalculationContainer {
        let mut container = CalculationContainer::new();
        let names = [
            PERIOD_NUMBER,
            PAY_THIS_PERIOD,
            PREVIOUS_PAY_TO_DATE,
            PAY_TO_DATE,
            PREVIOUS_TAX_PAID,
            FREE_PAY_TO_DATE,
            TAXABLE_PAY_TO_DATE,
            TAX_DUE_TO_DATE,
            TAX_DUE_THIS_PERIOD,
            NI_EARNINGS,
            NI_LOWER_EARNINGS_LIMIT,
            NI_PRIMARY_THRESHOLD,
            NI_SECONDARY_THRESHOLD,
            NI_UPPER_EARNINGS_LIMIT,
            NI_EMPLOYER_UPPER_THRESHOLD,
            EMPLOYEE_NI,
            EMPLOYER_NI,
        ];
        for name in names {
            container.set(name, Decimal::ONE).unwrap();
        }
        container
    }

    #[test]
    fn test_assembles_from_container() {
        let request = create_test_request();
        let period = TaxPeriod::from_date(request.payment_date).unwrap();
        let result =
            assemble_result(&request, period, "2016", &create_full_container(), vec![]).unwrap();

        assert_eq!(result.request_id, Uuid::from_u128(42));
        assert_eq!(result.tax_year, 2017);
        assert_eq!(result.variant, "2016");
        assert_eq!(result.paye.period_number, 1);
        assert_eq!(result.paye_tax(), Decimal::ONE);
        assert_eq!(result.employer_ni(), Decimal::ONE);
    }

    #[test]
    fn test_missing_variable_is_an_error() {
        let request = create_test_request();
        let period = TaxPeriod::from_date(request.payment_date).unwrap();
        let mut container = CalculationContainer::new();
        container.set(PERIOD_NUMBER, Decimal::ONE).unwrap();

        let result = assemble_result(&request, period, "2016", &container, vec![]);
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }

    #[test]
    fn test_fractional_period_number_is_an_error() {
        assert!(whole_number(PERIOD_NUMBER, Decimal::new(15, 1)).is_err());
        assert_eq!(whole_number(PERIOD_NUMBER, Decimal::from(12)).unwrap(), 12);
    }
}
