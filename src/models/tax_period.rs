//! Tax period derivation.
//!
//! This module contains the [`TaxPeriod`] type, which maps a calendar date onto
//! the regulator's tax-year coordinates: the tax year label together with the
//! week, month, fortnight and four-week period numbers the date falls in.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Calendar month in which every tax year starts.
pub const TAX_YEAR_START_MONTH: u32 = 4;

/// Day of [`TAX_YEAR_START_MONTH`] on which every tax year starts.
pub const TAX_YEAR_START_DAY: u32 = 6;

/// Returns the first day of the tax year labelled `year`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] when the date cannot be represented.
///
/// # Example
///
/// ```
/// use payroll_engine::models::tax_year_start;
/// use chrono::NaiveDate;
///
/// assert_eq!(
///     tax_year_start(2016).unwrap(),
///     NaiveDate::from_ymd_opt(2016, 4, 6).unwrap()
/// );
/// ```
pub fn tax_year_start(year: i32) -> EngineResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, TAX_YEAR_START_MONTH, TAX_YEAR_START_DAY).ok_or_else(|| {
        EngineError::invalid_input("tax_year", format!("tax year {} is out of range", year))
    })
}

/// Returns the last day of the tax year labelled `year` (5 April of the
/// following calendar year).
pub fn tax_year_end(year: i32) -> EngineResult<NaiveDate> {
    let out_of_range =
        || EngineError::invalid_input("tax_year", format!("tax year {} is out of range", year));
    let next_year = year.checked_add(1).ok_or_else(out_of_range)?;
    let next_start = tax_year_start(next_year).map_err(|_| out_of_range())?;
    next_start.pred_opt().ok_or_else(out_of_range)
}

/// The tax period coordinates of a single calendar date.
///
/// All coordinates are derived from the same date, so a caller can pick the
/// one that matches its pay frequency (see
/// [`PayFrequency::current_period`](crate::models::PayFrequency::current_period)).
///
/// # Example
///
/// ```
/// use payroll_engine::models::TaxPeriod;
/// use chrono::NaiveDate;
///
/// let period = TaxPeriod::from_date(NaiveDate::from_ymd_opt(2016, 4, 5).unwrap()).unwrap();
/// assert_eq!(period.year, 2015);
/// assert_eq!(period.week, 53);
/// assert_eq!(period.month, 12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxPeriod {
    /// The calendar date these coordinates were derived from.
    pub date: NaiveDate,
    /// The tax year label, named after the calendar year it starts in.
    pub year: i32,
    /// Week number, 1 to 53.
    pub week: u32,
    /// Month number, 1 to 12.
    pub month: u32,
    /// Fortnight number, 1 to 27.
    pub fortnight: u32,
    /// Four-week period number, 1 to 14.
    pub four_week: u32,
}

impl TaxPeriod {
    /// Derives the tax period coordinates for a date.
    ///
    /// Dates on or after 6 April belong to the tax year named after that
    /// calendar year; earlier dates belong to the previous one. Weeks count in
    /// blocks of seven days from the tax year start, so the final one or two
    /// days of every tax year form week 53. Months run from the 6th of one
    /// month to the 5th of the next.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] when the tax year boundary for the
    /// date falls outside the representable calendar.
    pub fn from_date(date: NaiveDate) -> EngineResult<Self> {
        let calendar_start = (TAX_YEAR_START_MONTH, TAX_YEAR_START_DAY);
        let year = if (date.month(), date.day()) >= calendar_start {
            date.year()
        } else {
            date.year() - 1
        };

        let start = tax_year_start(year).map_err(|_| {
            EngineError::invalid_input("payment_date", format!("{} is out of range", date))
        })?;

        let days = (date - start).num_days();
        let week = (days / 7) as u32 + 1;

        let mut months = (date.year() - year) * 12 + date.month() as i32
            - TAX_YEAR_START_MONTH as i32;
        if date.day() < TAX_YEAR_START_DAY {
            months -= 1;
        }
        let month = months as u32 + 1;

        Ok(Self {
            date,
            year,
            week,
            month,
            fortnight: (week - 1) / 2 + 1,
            four_week: (week - 1) / 4 + 1,
        })
    }

    /// Generates the tax period of every date in the tax year labelled `year`,
    /// in ascending date order.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::TaxPeriod;
    ///
    /// let periods = TaxPeriod::periods_for_tax_year(2016).unwrap();
    /// assert_eq!(periods.len(), 365);
    /// assert_eq!(periods[0].week, 1);
    /// assert_eq!(periods[364].week, 53);
    /// ```
    pub fn periods_for_tax_year(year: i32) -> EngineResult<Vec<Self>> {
        let start = tax_year_start(year)?;
        let end = tax_year_end(year)?;

        start
            .iter_days()
            .take_while(|date| *date <= end)
            .map(Self::from_date)
            .collect()
    }

    /// Returns true if this is the final, partial week of the tax year.
    pub fn is_week_53(&self) -> bool {
        self.week == 53
    }

    /// Number of days in the tax year this period belongs to.
    pub fn days_in_tax_year(&self) -> EngineResult<u64> {
        let start = tax_year_start(self.year)?;
        let end = tax_year_end(self.year)?;
        Ok((end - start).num_days() as u64 + 1)
    }

    /// Returns the date `days` days after this one, as a new period.
    pub fn advance(&self, days: u64) -> EngineResult<Self> {
        let date = self
            .date
            .checked_add_days(Days::new(days))
            .ok_or_else(|| {
                EngineError::invalid_input("payment_date", "date is out of range".to_string())
            })?;
        Self::from_date(date)
    }
}
