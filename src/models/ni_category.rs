//! National Insurance category letters.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::EngineError;

/// The National Insurance category letter of an employee.
///
/// The letter selects the contribution rates in the rate table and, from
/// 2015 onwards, which employer threshold applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NiCategory {
    /// Standard rate employees.
    A,
    /// Married women and widows with a reduced rate election.
    B,
    /// Employees over state pension age.
    C,
    /// Apprentices under 25.
    H,
    /// Employees deferring contributions.
    J,
    /// Employees under 21.
    M,
    /// Employees who do not pay contributions.
    X,
    /// Employees under 21 deferring contributions.
    Z,
}

impl NiCategory {
    /// Returns true when no contributions are due for this category.
    pub fn is_exempt(self) -> bool {
        self == NiCategory::X
    }
}

impl std::fmt::Display for NiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let letter = match self {
            NiCategory::A => "A",
            NiCategory::B => "B",
            NiCategory::C => "C",
            NiCategory::H => "H",
            NiCategory::J => "J",
            NiCategory::M => "M",
            NiCategory::X => "X",
            NiCategory::Z => "Z",
        };
        write!(f, "{}", letter)
    }
}

impl FromStr for NiCategory {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(NiCategory::A),
            "B" => Ok(NiCategory::B),
            "C" => Ok(NiCategory::C),
            "H" => Ok(NiCategory::H),
            "J" => Ok(NiCategory::J),
            "M" => Ok(NiCategory::M),
            "X" => Ok(NiCategory::X),
            "Z" => Ok(NiCategory::Z),
            _ => Err(EngineError::invalid_input(
                "ni_category",
                format!("unknown National Insurance category '{}'", s),
            )),
        }
    }
}
