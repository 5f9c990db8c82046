//! The calculation step pipeline.
//!
//! A [`Pipeline`] is an ordered list of named [`Step`]s. Running it against a
//! fresh [`CalculationContainer`] computes each step in turn; every step
//! reads the request, the rate table and the variables written by earlier
//! steps, and its result is stored under the step's name.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::RateTable;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, CalculationRequest, PeriodFactoring, TaxPeriod};

/// The read-only inputs available to every step.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    /// The request being calculated.
    pub request: &'a CalculationRequest,
    /// Tax period coordinates of the payment date.
    pub period: &'a TaxPeriod,
    /// Factoring for the request's pay frequency.
    pub factoring: PeriodFactoring,
    /// Rate table for the tax year.
    pub rates: &'a RateTable,
}

impl<'a> StepContext<'a> {
    /// Creates a context for one calculation.
    pub fn new(request: &'a CalculationRequest, period: &'a TaxPeriod, rates: &'a RateTable) -> Self {
        Self {
            request,
            period,
            factoring: request.pay_frequency.factoring(),
            rates,
        }
    }

    /// Returns true unless the payment is taxed on the week 1 / month 1
    /// basis.
    ///
    /// That basis applies when the tax code says so, and to every payment in
    /// an extra period at the end of the tax year (week 53, fortnight 27 or
    /// four-week period 14).
    pub fn is_cumulative(&self) -> bool {
        self.request.tax_code.cumulative && !self.request.pay_frequency.is_extra_period(self.period)
    }
}

/// Signature of a step's computation.
pub type StepFn = fn(&StepContext<'_>, &CalculationContainer) -> EngineResult<Decimal>;

/// A named pipeline step.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    /// Name of the variable the step writes.
    pub name: &'static str,
    /// Human-readable description used in the audit trace.
    pub description: &'static str,
    /// The computation.
    pub compute: StepFn,
}

/// A step together with the variant that defined it.
#[derive(Debug, Clone, Copy)]
pub struct DefinedStep {
    /// The step.
    pub step: Step,
    /// Name of the variant whose definition is in effect.
    pub defined_by: &'static str,
}

/// The variables computed during one calculation.
///
/// A container belongs to a single invocation. Each variable can be written
/// once; reading a variable that has not been written yet is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationContainer {
    values: BTreeMap<&'static str, Decimal>,
}

impl CalculationContainer {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a variable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CalculationError`] if no step has written the
    /// variable yet.
    pub fn get(&self, name: &str) -> EngineResult<Decimal> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| EngineError::CalculationError {
                message: format!("variable '{}' read before it was computed", name),
            })
    }

    /// Writes a variable. A rejected second write leaves the first value in
    /// place.
    pub(crate) fn set(&mut self, name: &'static str, value: Decimal) -> EngineResult<()> {
        match self.values.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(())
            }
            Entry::Occupied(_) => Err(EngineError::CalculationError {
                message: format!("variable '{}' written twice", name),
            }),
        }
    }

    /// Number of variables written.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Decimal)> + '_ {
        self.values.iter().map(|(name, value)| (*name, *value))
    }
}

/// An ordered, fully resolved list of steps for one variant.
#[derive(Debug, Clone)]
pub struct Pipeline {
    variant: &'static str,
    steps: Vec<DefinedStep>,
}

impl Pipeline {
    /// Creates the root pipeline of a variant chain.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CalculationError`] if two steps share a name.
    pub fn base(variant: &'static str, steps: &[Step]) -> EngineResult<Self> {
        let mut defined: Vec<DefinedStep> = Vec::with_capacity(steps.len());
        for step in steps {
            if defined.iter().any(|d| d.step.name == step.name) {
                return Err(EngineError::CalculationError {
                    message: format!("variant '{}' defines step '{}' twice", variant, step.name),
                });
            }
            defined.push(DefinedStep {
                step: *step,
                defined_by: variant,
            });
        }
        Ok(Self {
            variant,
            steps: defined,
        })
    }

    /// Derives a new pipeline that redefines some of this pipeline's steps.
    ///
    /// Step order is unchanged; each override replaces the step with the same
    /// name.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CalculationError`] if an override names a step
    /// this pipeline does not have.
    pub fn patched(&self, variant: &'static str, overrides: &[Step]) -> EngineResult<Self> {
        let mut steps = self.steps.clone();
        for step in overrides {
            let slot = steps
                .iter_mut()
                .find(|d| d.step.name == step.name)
                .ok_or_else(|| EngineError::CalculationError {
                    message: format!(
                        "variant '{}' redefines unknown step '{}' (parent '{}')",
                        variant, step.name, self.variant
                    ),
                })?;
            *slot = DefinedStep {
                step: *step,
                defined_by: variant,
            };
        }
        Ok(Self { variant, steps })
    }

    /// Name of the variant this pipeline was resolved for.
    pub fn variant(&self) -> &'static str {
        self.variant
    }

    /// The resolved steps in execution order.
    pub fn steps(&self) -> &[DefinedStep] {
        &self.steps
    }

    /// Returns the variant whose definition of `step` is in effect.
    pub fn defining_variant(&self, step: &str) -> Option<&'static str> {
        self.steps
            .iter()
            .find(|d| d.step.name == step)
            .map(|d| d.defined_by)
    }

    /// Runs every step in order, writing each result into `container`.
    ///
    /// Returns the audit trace, one entry per step. Execution stops at the
    /// first failing step.
    pub fn run(
        &self,
        context: &StepContext<'_>,
        container: &mut CalculationContainer,
    ) -> EngineResult<Vec<AuditStep>> {
        let mut trace = Vec::with_capacity(self.steps.len());

        for (index, defined) in self.steps.iter().enumerate() {
            let step = defined.step;
            let value = (step.compute)(context, container)?;
            container.set(step.name, value)?;

            debug!(
                variant = self.variant,
                step = step.name,
                defined_by = defined.defined_by,
                value = %value,
                "computed pipeline step"
            );

            trace.push(AuditStep {
                step_number: index as u32 + 1,
                variable: step.name.to_string(),
                description: step.description.to_string(),
                defined_by: defined.defined_by.to_string(),
                value,
            });
        }

        Ok(trace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::variables::PAY_THIS_PERIOD;
    use crate::models::{NiCategory, PayFrequency};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn create_test_request() -> CalculationRequest {
        CalculationRequest {
            request_id: Uuid::nil(),
            payment_date: NaiveDate::from_ymd_opt(2017, 4, 28).unwrap(),
            pay_frequency: PayFrequency::Monthly,
            gross_pay: Decimal::from(100),
            previous_pay_to_date: Decimal::ZERO,
            tax_paid_to_date: Decimal::ZERO,
            tax_code: "1150L".parse().unwrap(),
            ni_category: NiCategory::A,
        }
    }

    fn gross(ctx: &StepContext<'_>, _: &CalculationContainer) -> EngineResult<Decimal> {
        Ok(ctx.request.gross_pay)
    }

    fn doubled(_: &StepContext<'_>, c: &CalculationContainer) -> EngineResult<Decimal> {
        Ok(c.get("gross")? * Decimal::TWO)
    }

    fn tripled(_: &StepContext<'_>, c: &CalculationContainer) -> EngineResult<Decimal> {
        Ok(c.get("gross")? * Decimal::from(3))
    }

    const GROSS: Step = Step {
        name: "gross",
        description: "gross pay",
        compute: gross,
    };
    const DOUBLED: Step = Step {
        name: "scaled",
        description: "gross pay doubled",
        compute: doubled,
    };
    const TRIPLED: Step = Step {
        name: "scaled",
        description: "gross pay tripled",
        compute: tripled,
    };

    fn run(pipeline: &Pipeline) -> (CalculationContainer, Vec<AuditStep>) {
        let request = create_test_request();
        let period = TaxPeriod::from_date(request.payment_date).unwrap();
        let rates = RateTable::new(2017);
        let ctx = StepContext::new(&request, &period, &rates);
        let mut container = CalculationContainer::new();
        let trace = pipeline.run(&ctx, &mut container).unwrap();
        (container, trace)
    }

    #[test]
    fn test_steps_run_in_order() {
        let pipeline = Pipeline::base("base", &[GROSS, DOUBLED]).unwrap();
        let (container, trace) = run(&pipeline);

        assert_eq!(container.get("scaled").unwrap(), Decimal::from(200));
        let names: Vec<&str> = trace.iter().map(|s| s.variable.as_str()).collect();
        assert_eq!(names, vec!["gross", "scaled"]);
        assert_eq!(trace[1].step_number, 2);
    }

    #[test]
    fn test_reading_a_later_variable_fails() {
        let pipeline = Pipeline::base("base", &[DOUBLED, GROSS]).unwrap();
        let request = create_test_request();
        let period = TaxPeriod::from_date(request.payment_date).unwrap();
        let rates = RateTable::new(2017);
        let ctx = StepContext::new(&request, &period, &rates);
        let mut container = CalculationContainer::new();

        let result = pipeline.run(&ctx, &mut container);
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
        assert!(container.is_empty());
    }

    #[test]
    fn test_patch_replaces_step_in_place() {
        let base = Pipeline::base("base", &[GROSS, DOUBLED]).unwrap();
        let patched = base.patched("next", &[TRIPLED]).unwrap();

        assert_eq!(patched.variant(), "next");
        assert_eq!(patched.defining_variant("gross"), Some("base"));
        assert_eq!(patched.defining_variant("scaled"), Some("next"));

        let (container, trace) = run(&patched);
        assert_eq!(container.get("scaled").unwrap(), Decimal::from(300));
        assert_eq!(trace[1].defined_by, "next");
        assert_eq!(trace[1].description, "gross pay tripled");
    }

    #[test]
    fn test_patch_of_unknown_step_fails() {
        let base = Pipeline::base("base", &[GROSS]).unwrap();
        let result = base.patched("next", &[TRIPLED]);
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }

    #[test]
    fn test_duplicate_step_names_rejected() {
        let result = Pipeline::base("base", &[GROSS, DOUBLED, TRIPLED]);
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }

    #[test]
    fn test_container_rejects_double_write() {
        let mut container = CalculationContainer::new();
        container.set("x", Decimal::ONE).unwrap();
        assert!(container.set("x", Decimal::TWO).is_err());
        assert_eq!(container.get("x").unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_rejected_write_keeps_container_intact() {
        let mut container = CalculationContainer::new();
        container.set(PAY_THIS_PERIOD, Decimal::from(2000)).unwrap();

        match container.set(PAY_THIS_PERIOD, Decimal::ZERO) {
            Err(EngineError::CalculationError { message }) => {
                assert!(message.contains(PAY_THIS_PERIOD));
            }
            other => panic!("Expected CalculationError, got {:?}", other),
        }

        assert_eq!(container.len(), 1);
        assert_eq!(
            container.iter().collect::<Vec<_>>(),
            vec![(PAY_THIS_PERIOD, Decimal::from(2000))]
        );
    }

    #[test]
    fn test_context_uses_request_frequency() {
        let mut request = create_test_request();
        request.pay_frequency = PayFrequency::Fortnightly;
        let period = TaxPeriod::from_date(request.payment_date).unwrap();
        let rates = RateTable::new(2017);
        let ctx = StepContext::new(&request, &period, &rates);

        assert_eq!(ctx.factoring.periods, 52);
        assert_eq!(ctx.factoring.weeks_in_period, 2);
        assert!(ctx.is_cumulative());
    }

    #[test]
    fn test_extra_period_is_not_cumulative() {
        let mut request = create_test_request();
        request.payment_date = NaiveDate::from_ymd_opt(2018, 4, 5).unwrap();
        let period = TaxPeriod::from_date(request.payment_date).unwrap();
        let rates = RateTable::new(2017);

        request.pay_frequency = PayFrequency::Weekly;
        assert!(!StepContext::new(&request, &period, &rates).is_cumulative());

        request.pay_frequency = PayFrequency::Monthly;
        assert!(StepContext::new(&request, &period, &rates).is_cumulative());
    }
}
