//! Calculation logic for the payroll engine.
//!
//! This module contains the regulator's rounding helpers, the step pipeline
//! and its container, the PAYE and National Insurance steps, the versioned
//! variant registry, and the [`PayrollEngine`] that ties them together.

mod assembly;
mod engine;
pub mod national_insurance;
pub mod paye;
mod pipeline;
pub mod tax_math;
pub mod variables;
mod variants;

pub use assembly::assemble_result;
pub use engine::PayrollEngine;
pub use pipeline::{CalculationContainer, DefinedStep, Pipeline, Step, StepContext, StepFn};
pub use tax_math::MultiplicationAccuracy;
pub use variants::{Variant, VariantRegistry, standard_variants};
