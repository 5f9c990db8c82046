//! Versioned rule variants.
//!
//! Each tax year is served by one variant. The first variant in a chain
//! defines the complete ordered step list; every later variant names a parent
//! and redefines only the steps whose rules changed. Resolving a variant
//! walks the chain from the root, so each step uses the definition of the
//! nearest variant that redefines it.
//!
//! | Variant | Parent | Tax years | Redefines |
//! |---------|--------|-----------|-----------|
//! | `2013`  | none   | 2013, 2014 | (base definitions) |
//! | `2015`  | `2013` | 2015 | `tax_due_this_period`, `ni_employer_upper_threshold` |
//! | `2016`  | `2015` | 2016 to 2018 | `ni_employer_upper_threshold` |

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::national_insurance;
use super::paye;
use super::pipeline::{Pipeline, Step};

/// One entry in the variant chain.
#[derive(Debug, Clone)]
pub struct Variant {
    /// Variant name, used in audit traces.
    pub name: &'static str,
    /// The variant this one derives from; `None` for the root.
    pub parent: Option<&'static str>,
    /// Tax years served by this variant.
    pub tax_years: Vec<i32>,
    /// The full step list for the root, or the redefined steps otherwise.
    pub steps: Vec<Step>,
}

/// The standard variant chain, oldest first.
pub fn standard_variants() -> Vec<Variant> {
    let base_steps = paye::base_steps()
        .into_iter()
        .chain(national_insurance::base_steps())
        .collect();

    vec![
        Variant {
            name: "2013",
            parent: None,
            tax_years: vec![2013, 2014],
            steps: base_steps,
        },
        Variant {
            name: "2015",
            parent: Some("2013"),
            tax_years: vec![2015],
            steps: vec![
                paye::TAX_DUE_THIS_PERIOD_LIMITED_STEP,
                national_insurance::EMPLOYER_UPPER_THRESHOLD_UNDER_21_STEP,
            ],
        },
        Variant {
            name: "2016",
            parent: Some("2015"),
            tax_years: vec![2016, 2017, 2018],
            steps: vec![national_insurance::EMPLOYER_UPPER_THRESHOLD_APPRENTICE_STEP],
        },
    ]
}

/// Resolved pipelines indexed by tax year.
///
/// The registry is built once and is read-only afterwards, so it can be
/// shared freely between concurrent calculations.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::VariantRegistry;
///
/// let registry = VariantRegistry::standard().unwrap();
/// let pipeline = registry.pipeline_for(2017).unwrap();
///
/// assert_eq!(pipeline.variant(), "2016");
/// assert_eq!(pipeline.defining_variant("tax_due_this_period"), Some("2015"));
/// assert!(registry.pipeline_for(2012).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct VariantRegistry {
    pipelines: Vec<Pipeline>,
    by_year: BTreeMap<i32, usize>,
}

impl VariantRegistry {
    /// Resolves a chain of variants, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CalculationError`] if a parent is unknown or
    /// listed after its child, a variant name is reused, a tax year is served
    /// by two variants, or a variant redefines a step its parent lacks.
    pub fn build(variants: Vec<Variant>) -> EngineResult<Self> {
        let mut pipelines: Vec<Pipeline> = Vec::with_capacity(variants.len());
        let mut by_year = BTreeMap::new();

        for variant in variants {
            if pipelines.iter().any(|p| p.variant() == variant.name) {
                return Err(chain_error(format!("variant '{}' is defined twice", variant.name)));
            }

            let pipeline = match variant.parent {
                None => Pipeline::base(variant.name, &variant.steps)?,
                Some(parent) => {
                    let parent_pipeline = pipelines
                        .iter()
                        .find(|p| p.variant() == parent)
                        .ok_or_else(|| {
                            chain_error(format!(
                                "variant '{}' derives from unknown variant '{}'",
                                variant.name, parent
                            ))
                        })?;
                    parent_pipeline.patched(variant.name, &variant.steps)?
                }
            };

            let index = pipelines.len();
            for year in variant.tax_years {
                if let Some(existing) = by_year.insert(year, index) {
                    return Err(chain_error(format!(
                        "tax year {} is served by both '{}' and '{}'",
                        year,
                        pipelines[existing].variant(),
                        variant.name
                    )));
                }
            }

            debug!(
                variant = variant.name,
                parent = variant.parent.unwrap_or("-"),
                steps = pipeline.steps().len(),
                "resolved rule variant"
            );
            pipelines.push(pipeline);
        }

        Ok(Self { pipelines, by_year })
    }

    /// Builds the registry from [`standard_variants`].
    pub fn standard() -> EngineResult<Self> {
        Self::build(standard_variants())
    }

    /// Returns the pipeline serving a tax year.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnsupportedTaxYear`] when no variant serves the
    /// year.
    pub fn pipeline_for(&self, tax_year: i32) -> EngineResult<&Pipeline> {
        self.by_year
            .get(&tax_year)
            .map(|&index| &self.pipelines[index])
            .ok_or(EngineError::UnsupportedTaxYear { tax_year })
    }

    /// Returns the pipeline resolved for a named variant.
    pub fn variant(&self, name: &str) -> Option<&Pipeline> {
        self.pipelines.iter().find(|p| p.variant() == name)
    }

    /// Returns the supported tax years in ascending order.
    pub fn tax_years(&self) -> impl Iterator<Item = i32> + '_ {
        self.by_year.keys().copied()
    }
}

fn chain_error(message: String) -> EngineError {
    EngineError::CalculationError { message }
}
