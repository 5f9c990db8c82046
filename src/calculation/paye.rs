//! PAYE income tax steps.
//!
//! These steps follow the regulator's cumulative tables method: the annual
//! allowance and band limits are pro-rated to the current period, tax is
//! worked out on pay to date, and the tax already deducted is subtracted.
//! Codes operated on the week 1 / month 1 basis ignore everything before the
//! current period, as does any payment in week 53 or its fortnightly and
//! four-weekly equivalents.

use rust_decimal::Decimal;

use crate::config::PAYE_REGULATORY_LIMIT;
use crate::error::EngineResult;
use crate::models::TaxCodeKind;

use super::pipeline::{CalculationContainer, Step, StepContext};
use super::tax_math::{factor, period_round, positive_only, smallest, truncate, up_round};
use super::variables::*;

/// Sets the period number.
pub const PERIOD_NUMBER_STEP: Step = Step {
    name: PERIOD_NUMBER,
    description: "Current period number (1 on the week 1 / month 1 basis)",
    compute: period_number,
};

/// Sets the pay for this period.
pub const PAY_THIS_PERIOD_STEP: Step = Step {
    name: PAY_THIS_PERIOD,
    description: "Gross pay for the period",
    compute: pay_this_period,
};

/// Sets the pay before this period.
pub const PREVIOUS_PAY_TO_DATE_STEP: Step = Step {
    name: PREVIOUS_PAY_TO_DATE,
    description: "Pay in the tax year before this period",
    compute: previous_pay_to_date,
};

/// Sets the total pay to date.
pub const PAY_TO_DATE_STEP: Step = Step {
    name: PAY_TO_DATE,
    description: "Total pay to date including this period",
    compute: pay_to_date,
};

/// Sets the tax already deducted.
pub const PREVIOUS_TAX_PAID_STEP: Step = Step {
    name: PREVIOUS_TAX_PAID,
    description: "Tax deducted in the tax year before this period",
    compute: previous_tax_paid,
};

/// Sets the tax-free pay to date.
pub const FREE_PAY_TO_DATE_STEP: Step = Step {
    name: FREE_PAY_TO_DATE,
    description: "Tax-free pay to date from the tax code",
    compute: free_pay_to_date,
};

/// Sets the taxable pay to date.
pub const TAXABLE_PAY_TO_DATE_STEP: Step = Step {
    name: TAXABLE_PAY_TO_DATE,
    description: "Taxable pay to date, whole pounds",
    compute: taxable_pay_to_date,
};

/// Sets the tax due to date.
pub const TAX_DUE_TO_DATE_STEP: Step = Step {
    name: TAX_DUE_TO_DATE,
    description: "Tax due on taxable pay to date",
    compute: tax_due_to_date,
};

/// Sets the tax for this period, applying the regulatory limit to `K` codes only.
pub const TAX_DUE_THIS_PERIOD_STEP: Step = Step {
    name: TAX_DUE_THIS_PERIOD,
    description: "Tax due to date less tax already paid, K codes limited",
    compute: tax_due_this_period,
};

/// Sets the tax for this period, always applying the regulatory limit.
///
/// In period 1 tax already paid is not subtracted.
pub const TAX_DUE_THIS_PERIOD_LIMITED_STEP: Step = Step {
    name: TAX_DUE_THIS_PERIOD,
    description: "Tax due to date less tax already paid, limited to the regulatory maximum",
    compute: tax_due_this_period_limited,
};

/// The PAYE steps in execution order.
pub fn base_steps() -> [Step; 9] {
    [
        PERIOD_NUMBER_STEP,
        PAY_THIS_PERIOD_STEP,
        PREVIOUS_PAY_TO_DATE_STEP,
        PAY_TO_DATE_STEP,
        PREVIOUS_TAX_PAID_STEP,
        FREE_PAY_TO_DATE_STEP,
        TAXABLE_PAY_TO_DATE_STEP,
        TAX_DUE_TO_DATE_STEP,
        TAX_DUE_THIS_PERIOD_STEP,
    ]
}

fn period_number(ctx: &StepContext<'_>, _: &CalculationContainer) -> EngineResult<Decimal> {
    if !ctx.is_cumulative() {
        return Ok(Decimal::ONE);
    }
    Ok(Decimal::from(ctx.request.pay_frequency.current_period(ctx.period)))
}

fn pay_this_period(ctx: &StepContext<'_>, _: &CalculationContainer) -> EngineResult<Decimal> {
    Ok(ctx.request.gross_pay)
}

fn previous_pay_to_date(ctx: &StepContext<'_>, _: &CalculationContainer) -> EngineResult<Decimal> {
    if ctx.is_cumulative() {
        Ok(ctx.request.previous_pay_to_date)
    } else {
        Ok(Decimal::ZERO)
    }
}

fn pay_to_date(_: &StepContext<'_>, c: &CalculationContainer) -> EngineResult<Decimal> {
    Ok(c.get(PREVIOUS_PAY_TO_DATE)? + c.get(PAY_THIS_PERIOD)?)
}

fn previous_tax_paid(ctx: &StepContext<'_>, _: &CalculationContainer) -> EngineResult<Decimal> {
    if ctx.is_cumulative() {
        Ok(ctx.request.tax_paid_to_date)
    } else {
        Ok(Decimal::ZERO)
    }
}

fn free_pay_to_date(ctx: &StepContext<'_>, c: &CalculationContainer) -> EngineResult<Decimal> {
    let (number, sign) = match ctx.request.tax_code.kind {
        TaxCodeKind::Allowance { number, .. } => (number, Decimal::ONE),
        TaxCodeKind::KCode { number } => (number, Decimal::NEGATIVE_ONE),
        _ => return Ok(Decimal::ZERO),
    };

    // Code number 1150 stands for an annual allowance of 11,509.
    let annual = Decimal::from(number) * Decimal::TEN + Decimal::from(9);
    let f = ctx.factoring;
    let per_period = up_round(factor(annual, Decimal::ONE, Decimal::from(f.periods)), 2);
    let periods_to_date = c.get(PERIOD_NUMBER)? * Decimal::from(f.weeks_in_period);

    Ok(sign * per_period * periods_to_date)
}

fn taxable_pay_to_date(_: &StepContext<'_>, c: &CalculationContainer) -> EngineResult<Decimal> {
    Ok(truncate(c.get(PAY_TO_DATE)? - c.get(FREE_PAY_TO_DATE)?, 0))
}

fn tax_due_to_date(ctx: &StepContext<'_>, c: &CalculationContainer) -> EngineResult<Decimal> {
    let taxable = positive_only(c.get(TAXABLE_PAY_TO_DATE)?);

    let flat_band = match ctx.request.tax_code.kind {
        TaxCodeKind::NoTax => return Ok(Decimal::ZERO),
        TaxCodeKind::BasicRate => Some(0),
        TaxCodeKind::HigherRate => Some(1),
        TaxCodeKind::AdditionalRate => Some(2),
        _ => None,
    };

    if let Some(index) = flat_band {
        let rate = ctx.rates.band(index)?.rate;
        return Ok(truncate(taxable * rate / Decimal::ONE_HUNDRED, 2));
    }

    cumulative_band_tax(ctx, taxable, c.get(PERIOD_NUMBER)?)
}

/// Charges `taxable` across the bands pro-rated to `period_number`.
fn cumulative_band_tax(
    ctx: &StepContext<'_>,
    taxable: Decimal,
    period_number: Decimal,
) -> EngineResult<Decimal> {
    // Fails with the band name when the table has none.
    ctx.rates.band(0)?;

    let f = ctx.factoring;
    let share = period_number * Decimal::from(f.weeks_in_period);
    let periods = Decimal::from(f.periods);

    let mut annual_limit = Decimal::ZERO;
    let mut lower = Decimal::ZERO;
    let mut tax = Decimal::ZERO;

    for band in &ctx.rates.income_tax_bands {
        let upper = band.width.map(|width| {
            annual_limit += width;
            period_round(factor(annual_limit, share, periods), f.periods)
        });

        let top = upper.map_or(taxable, |limit| smallest(taxable, limit));
        if top > lower {
            tax += (top - lower) * band.rate / Decimal::ONE_HUNDRED;
        }

        match upper {
            Some(limit) if taxable > limit => lower = limit,
            _ => break,
        }
    }

    Ok(truncate(tax, 2))
}

/// The most that may be deducted this period.
fn regulatory_limit(ctx: &StepContext<'_>, c: &CalculationContainer) -> EngineResult<Decimal> {
    let percentage = ctx.rates.constant(PAYE_REGULATORY_LIMIT)?;
    Ok(truncate(c.get(PAY_THIS_PERIOD)? * percentage / Decimal::ONE_HUNDRED, 2))
}

fn tax_due_this_period(ctx: &StepContext<'_>, c: &CalculationContainer) -> EngineResult<Decimal> {
    let due = truncate(c.get(TAX_DUE_TO_DATE)?, 2) - c.get(PREVIOUS_TAX_PAID)?;

    if ctx.request.tax_code.is_k_code() {
        Ok(smallest(due, regulatory_limit(ctx, c)?))
    } else {
        Ok(due)
    }
}

fn tax_due_this_period_limited(
    ctx: &StepContext<'_>,
    c: &CalculationContainer,
) -> EngineResult<Decimal> {
    let mut due = truncate(c.get(TAX_DUE_TO_DATE)?, 2);
    if c.get(PERIOD_NUMBER)? > Decimal::ONE {
        due -= c.get(PREVIOUS_TAX_PAID)?;
    }

    Ok(smallest(due, regulatory_limit(ctx, c)?))
}
