//! PAYE tax codes.
//!
//! A tax code tells the employer how much tax-free pay (or, for `K` codes,
//! how much additional taxable pay) to apply, or which flat rate to use.
//! Codes ending in `W1`, `M1` or `X` are operated on the non-cumulative
//! (week 1 / month 1) basis.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::EngineError;

/// Letters that may follow the numeric part of an allowance code.
const ALLOWANCE_SUFFIXES: [char; 6] = ['L', 'M', 'N', 'T', 'P', 'Y'];

/// What a tax code instructs the employer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaxCodeKind {
    /// Tax-free pay derived from the numeric part (e.g. `1150L`).
    Allowance {
        /// The numeric part of the code.
        number: u32,
        /// The suffix letter.
        suffix: char,
    },
    /// Additional taxable pay derived from the numeric part (e.g. `K100`).
    KCode {
        /// The numeric part of the code.
        number: u32,
    },
    /// No tax-free pay, cumulative bands still apply (`0T`).
    ZeroAllowance,
    /// All pay taxed at the first band's rate (`BR`).
    BasicRate,
    /// All pay taxed at the second band's rate (`D0`).
    HigherRate,
    /// All pay taxed at the third band's rate (`D1`).
    AdditionalRate,
    /// No tax deducted (`NT`).
    NoTax,
}

/// A parsed PAYE tax code.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{TaxCode, TaxCodeKind};
///
/// let code: TaxCode = "1150L M1".parse().unwrap();
/// assert_eq!(code.kind, TaxCodeKind::Allowance { number: 1150, suffix: 'L' });
/// assert!(!code.cumulative);
/// assert_eq!(code.to_string(), "1150L M1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaxCode {
    /// What the code instructs.
    pub kind: TaxCodeKind,
    /// False for codes operated on the week 1 / month 1 basis.
    pub cumulative: bool,
}

impl TaxCode {
    /// Creates a cumulative tax code.
    pub fn cumulative(kind: TaxCodeKind) -> Self {
        Self {
            kind,
            cumulative: true,
        }
    }

    /// Returns true for `K` codes.
    pub fn is_k_code(&self) -> bool {
        matches!(self.kind, TaxCodeKind::KCode { .. })
    }

    /// Returns the numeric part of allowance and `K` codes.
    pub fn number(&self) -> Option<u32> {
        match self.kind {
            TaxCodeKind::Allowance { number, .. } | TaxCodeKind::KCode { number } => Some(number),
            _ => None,
        }
    }

    fn parse_kind(body: &str) -> Option<TaxCodeKind> {
        match body {
            "NT" => return Some(TaxCodeKind::NoTax),
            "BR" => return Some(TaxCodeKind::BasicRate),
            "D0" => return Some(TaxCodeKind::HigherRate),
            "D1" => return Some(TaxCodeKind::AdditionalRate),
            "0T" => return Some(TaxCodeKind::ZeroAllowance),
            _ => {}
        }

        if let Some(digits) = body.strip_prefix('K') {
            return parse_number(digits).map(|number| TaxCodeKind::KCode { number });
        }

        let suffix = body.chars().last()?;
        if !ALLOWANCE_SUFFIXES.contains(&suffix) {
            return None;
        }
        parse_number(&body[..body.len() - 1]).map(|number| TaxCodeKind::Allowance { number, suffix })
    }
}

fn parse_number(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl FromStr for TaxCode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();

        let invalid = |message: &str| EngineError::invalid_input("tax_code", format!("'{}' {}", s, message));

        if compact.starts_with('S') || compact.starts_with('C') {
            return Err(invalid("uses a devolved rate structure which is not supported"));
        }

        let (body, cumulative) = if let Some(body) = compact
            .strip_suffix("W1")
            .or_else(|| compact.strip_suffix("M1"))
        {
            (body, false)
        } else if let Some(body) = compact.strip_suffix('X') {
            (body, false)
        } else {
            (compact.as_str(), true)
        };

        let kind = Self::parse_kind(body).ok_or_else(|| invalid("is not a recognised tax code"))?;
        Ok(Self { kind, cumulative })
    }
}

impl TryFrom<String> for TaxCode {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaxCode> for String {
    fn from(code: TaxCode) -> Self {
        code.to_string()
    }
}

impl std::fmt::Display for TaxCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TaxCodeKind::Allowance { number, suffix } => write!(f, "{}{}", number, suffix)?,
            TaxCodeKind::KCode { number } => write!(f, "K{}", number)?,
            TaxCodeKind::ZeroAllowance => write!(f, "0T")?,
            TaxCodeKind::BasicRate => write!(f, "BR")?,
            TaxCodeKind::HigherRate => write!(f, "D0")?,
            TaxCodeKind::AdditionalRate => write!(f, "D1")?,
            TaxCodeKind::NoTax => write!(f, "NT")?,
        }
        if !self.cumulative {
            write!(f, " M1")?;
        }
        Ok(())
    }
}
