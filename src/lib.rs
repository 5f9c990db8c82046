//! Versioned UK payroll deduction engine
//!
//! This crate calculates PAYE income tax and National Insurance contributions
//! for a single pay event. Rules are grouped into variants by tax year; later
//! variants redefine only the calculation steps whose rules changed, and
//! every calculation records an audit trace of each step it ran.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
