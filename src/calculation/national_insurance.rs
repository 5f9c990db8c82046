//! National Insurance contribution steps.
//!
//! Contributions are not cumulative: each period's earnings are compared
//! against that period's thresholds. Monthly thresholds are published
//! separately; every other frequency multiplies the weekly figure by the
//! number of weeks in the period.

use rust_decimal::Decimal;

use crate::config::{
    NI_APPRENTICE_UPPER_SECONDARY_THRESHOLD, NI_LOWER_EARNINGS_LIMIT as LEL_CONSTANT,
    NI_PRIMARY_THRESHOLD as PT_CONSTANT, NI_SECONDARY_THRESHOLD as ST_CONSTANT,
    NI_UPPER_EARNINGS_LIMIT as UEL_CONSTANT, NI_UPPER_SECONDARY_THRESHOLD,
};
use crate::error::EngineResult;
use crate::models::NiCategory;

use super::pipeline::{CalculationContainer, Step, StepContext};
use super::tax_math::{hmrc_round, positive_only, smallest};
use super::variables::*;

/// Sets the earnings subject to contributions.
pub const NI_EARNINGS_STEP: Step = Step {
    name: NI_EARNINGS,
    description: "Earnings subject to National Insurance",
    compute: ni_earnings,
};

/// Sets the Lower Earnings Limit for the period.
pub const NI_LOWER_EARNINGS_LIMIT_STEP: Step = Step {
    name: NI_LOWER_EARNINGS_LIMIT,
    description: "Lower Earnings Limit for the period",
    compute: lower_earnings_limit,
};

/// Sets the primary threshold for the period.
pub const NI_PRIMARY_THRESHOLD_STEP: Step = Step {
    name: NI_PRIMARY_THRESHOLD,
    description: "Primary threshold for the period",
    compute: primary_threshold,
};

/// Sets the secondary threshold for the period.
pub const NI_SECONDARY_THRESHOLD_STEP: Step = Step {
    name: NI_SECONDARY_THRESHOLD,
    description: "Secondary threshold for the period",
    compute: secondary_threshold,
};

/// Sets the Upper Earnings Limit for the period.
pub const NI_UPPER_EARNINGS_LIMIT_STEP: Step = Step {
    name: NI_UPPER_EARNINGS_LIMIT,
    description: "Upper Earnings Limit for the period",
    compute: upper_earnings_limit,
};

/// Sets the employer's upper threshold to the Upper Earnings Limit.
pub const EMPLOYER_UPPER_THRESHOLD_STEP: Step = Step {
    name: NI_EMPLOYER_UPPER_THRESHOLD,
    description: "Employer upper threshold (Upper Earnings Limit)",
    compute: employer_upper_threshold,
};

/// Sets the employer's upper threshold, using the Upper Secondary Threshold
/// for employees under 21 (categories M and Z).
pub const EMPLOYER_UPPER_THRESHOLD_UNDER_21_STEP: Step = Step {
    name: NI_EMPLOYER_UPPER_THRESHOLD,
    description: "Employer upper threshold (Upper Secondary Threshold for under 21s)",
    compute: employer_upper_threshold_under_21,
};

/// Sets the employer's upper threshold, adding the Apprentice Upper Secondary
/// Threshold for category H.
pub const EMPLOYER_UPPER_THRESHOLD_APPRENTICE_STEP: Step = Step {
    name: NI_EMPLOYER_UPPER_THRESHOLD,
    description: "Employer upper threshold (apprentice and under 21 thresholds)",
    compute: employer_upper_threshold_apprentice,
};

/// Sets the employee contribution.
pub const EMPLOYEE_NI_STEP: Step = Step {
    name: EMPLOYEE_NI,
    description: "Employee National Insurance contribution",
    compute: employee_ni,
};

/// Sets the employer contribution.
pub const EMPLOYER_NI_STEP: Step = Step {
    name: EMPLOYER_NI,
    description: "Employer National Insurance contribution",
    compute: employer_ni,
};

/// The National Insurance steps in execution order.
pub fn base_steps() -> [Step; 8] {
    [
        NI_EARNINGS_STEP,
        NI_LOWER_EARNINGS_LIMIT_STEP,
        NI_PRIMARY_THRESHOLD_STEP,
        NI_SECONDARY_THRESHOLD_STEP,
        NI_UPPER_EARNINGS_LIMIT_STEP,
        EMPLOYER_UPPER_THRESHOLD_STEP,
        EMPLOYEE_NI_STEP,
        EMPLOYER_NI_STEP,
    ]
}

/// Resolves a threshold for the request's pay frequency.
///
/// `name` is the base constant name; the rate table carries `{name}_weekly`
/// and `{name}_monthly`.
fn period_threshold(ctx: &StepContext<'_>, name: &str) -> EngineResult<Decimal> {
    let f = ctx.factoring;
    if f.periods == 12 {
        ctx.rates.constant(&format!("{}_monthly", name))
    } else {
        let weekly = ctx.rates.constant(&format!("{}_weekly", name))?;
        Ok(weekly * Decimal::from(f.weeks_in_period))
    }
}

fn ni_earnings(ctx: &StepContext<'_>, _: &CalculationContainer) -> EngineResult<Decimal> {
    Ok(ctx.request.gross_pay)
}

fn lower_earnings_limit(ctx: &StepContext<'_>, _: &CalculationContainer) -> EngineResult<Decimal> {
    period_threshold(ctx, LEL_CONSTANT)
}

fn primary_threshold(ctx: &StepContext<'_>, _: &CalculationContainer) -> EngineResult<Decimal> {
    period_threshold(ctx, PT_CONSTANT)
}

fn secondary_threshold(ctx: &StepContext<'_>, _: &CalculationContainer) -> EngineResult<Decimal> {
    period_threshold(ctx, ST_CONSTANT)
}

fn upper_earnings_limit(ctx: &StepContext<'_>, _: &CalculationContainer) -> EngineResult<Decimal> {
    period_threshold(ctx, UEL_CONSTANT)
}

fn employer_upper_threshold(_: &StepContext<'_>, c: &CalculationContainer) -> EngineResult<Decimal> {
    c.get(NI_UPPER_EARNINGS_LIMIT)
}

fn employer_upper_threshold_under_21(
    ctx: &StepContext<'_>,
    c: &CalculationContainer,
) -> EngineResult<Decimal> {
    match ctx.request.ni_category {
        NiCategory::M | NiCategory::Z => period_threshold(ctx, NI_UPPER_SECONDARY_THRESHOLD),
        _ => c.get(NI_UPPER_EARNINGS_LIMIT),
    }
}

fn employer_upper_threshold_apprentice(
    ctx: &StepContext<'_>,
    c: &CalculationContainer,
) -> EngineResult<Decimal> {
    match ctx.request.ni_category {
        NiCategory::H => period_threshold(ctx, NI_APPRENTICE_UPPER_SECONDARY_THRESHOLD),
        _ => employer_upper_threshold_under_21(ctx, c),
    }
}

/// Contribution on `earnings` at `main_rate` between `threshold` and `upper`
/// and at `additional_rate` above `upper`. Each part is rounded separately.
fn contribution(
    earnings: Decimal,
    threshold: Decimal,
    upper: Decimal,
    main_rate: Decimal,
    additional_rate: Decimal,
) -> Decimal {
    let main = positive_only(smallest(earnings, upper) - threshold);
    let additional = positive_only(earnings - upper);

    hmrc_round(main * main_rate / Decimal::ONE_HUNDRED, 2)
        + hmrc_round(additional * additional_rate / Decimal::ONE_HUNDRED, 2)
}

fn employee_ni(ctx: &StepContext<'_>, c: &CalculationContainer) -> EngineResult<Decimal> {
    let category = ctx.request.ni_category;
    if category.is_exempt() {
        return Ok(Decimal::ZERO);
    }

    let earnings = c.get(NI_EARNINGS)?;
    if earnings < c.get(NI_LOWER_EARNINGS_LIMIT)? {
        return Ok(Decimal::ZERO);
    }

    let rates = ctx.rates.ni_rates(category)?;
    Ok(contribution(
        earnings,
        c.get(NI_PRIMARY_THRESHOLD)?,
        c.get(NI_UPPER_EARNINGS_LIMIT)?,
        rates.employee_main,
        rates.employee_additional,
    ))
}

fn employer_ni(ctx: &StepContext<'_>, c: &CalculationContainer) -> EngineResult<Decimal> {
    let category = ctx.request.ni_category;
    if category.is_exempt() {
        return Ok(Decimal::ZERO);
    }

    let earnings = c.get(NI_EARNINGS)?;
    if earnings < c.get(NI_LOWER_EARNINGS_LIMIT)? {
        return Ok(Decimal::ZERO);
    }

    let rates = ctx.rates.ni_rates(category)?;
    Ok(contribution(
        earnings,
        c.get(NI_SECONDARY_THRESHOLD)?,
        c.get(NI_EMPLOYER_UPPER_THRESHOLD)?,
        rates.employer_main,
        rates.employer_additional,
    ))
}
