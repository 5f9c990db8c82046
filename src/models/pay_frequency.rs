//! Pay frequency and period factoring.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::EngineError;

use super::TaxPeriod;

/// How often an employee is paid.
///
/// Each frequency has a nominal number of periods per year, which drives the
/// [`PeriodFactoring`] used to pro-rate annual figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayFrequency {
    /// Paid once per tax month (12 periods).
    Monthly,
    /// Paid every four weeks (13 periods).
    FourWeekly,
    /// Paid every two weeks (26 periods).
    Fortnightly,
    /// Paid every week (52 periods).
    Weekly,
}

/// Factors used to convert annual figures into per-period figures.
///
/// Monthly pay is factored over 12 single-month periods. Every other
/// frequency is factored over 52 weeks, with each pay period representing a
/// whole number of weeks.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{PayFrequency, PeriodFactoring};
///
/// assert_eq!(
///     PayFrequency::FourWeekly.factoring(),
///     PeriodFactoring { periods: 52, weeks_in_period: 4 }
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodFactoring {
    /// Number of base periods in the year (12 or 52).
    pub periods: u32,
    /// Number of base periods represented by one pay period.
    pub weeks_in_period: u32,
}

impl PayFrequency {
    /// Every supported frequency.
    pub const ALL: [PayFrequency; 4] = [
        PayFrequency::Monthly,
        PayFrequency::FourWeekly,
        PayFrequency::Fortnightly,
        PayFrequency::Weekly,
    ];

    /// Nominal number of pay periods in a year.
    pub fn periods_per_year(self) -> u32 {
        match self {
            PayFrequency::Monthly => 12,
            PayFrequency::FourWeekly => 13,
            PayFrequency::Fortnightly => 26,
            PayFrequency::Weekly => 52,
        }
    }

    /// Returns the factoring for this frequency.
    pub fn factoring(self) -> PeriodFactoring {
        match self {
            PayFrequency::Monthly => PeriodFactoring {
                periods: 12,
                weeks_in_period: 1,
            },
            other => {
                let nominal = other.periods_per_year();
                PeriodFactoring {
                    periods: 52,
                    // 52 / nominal, rounded to the nearest whole week
                    weeks_in_period: (52 * 2 + nominal) / (nominal * 2),
                }
            }
        }
    }

    /// Picks the period number matching this frequency.
    pub fn current_period(self, period: &TaxPeriod) -> u32 {
        match self {
            PayFrequency::Monthly => period.month,
            PayFrequency::FourWeekly => period.four_week,
            PayFrequency::Fortnightly => period.fortnight,
            PayFrequency::Weekly => period.week,
        }
    }

    /// Returns true when `period` falls past this frequency's regular
    /// periods: week 53, fortnight 27 or four-week period 14.
    pub fn is_extra_period(self, period: &TaxPeriod) -> bool {
        let f = self.factoring();
        self.current_period(period) * f.weeks_in_period > f.periods
    }
}

impl std::fmt::Display for PayFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayFrequency::Monthly => write!(f, "monthly"),
            PayFrequency::FourWeekly => write!(f, "four_weekly"),
            PayFrequency::Fortnightly => write!(f, "fortnightly"),
            PayFrequency::Weekly => write!(f, "weekly"),
        }
    }
}

impl FromStr for PayFrequency {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(PayFrequency::Monthly),
            "four_weekly" | "fourweekly" => Ok(PayFrequency::FourWeekly),
            "fortnightly" => Ok(PayFrequency::Fortnightly),
            "weekly" => Ok(PayFrequency::Weekly),
            _ => Err(EngineError::invalid_input(
                "pay_frequency",
                format!("unknown pay frequency '{}'", s),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_monthly_factoring() {
        assert_eq!(
            PayFrequency::Monthly.factoring(),
            PeriodFactoring {
                periods: 12,
                weeks_in_period: 1
            }
        );
    }

    #[test]
    fn test_weekly_based_factoring() {
        let weeks: Vec<u32> = [
            PayFrequency::Weekly,
            PayFrequency::Fortnightly,
            PayFrequency::FourWeekly,
        ]
        .iter()
        .map(|f| f.factoring().weeks_in_period)
        .collect();
        assert_eq!(weeks, vec![1, 2, 4]);

        for frequency in [PayFrequency::Weekly, PayFrequency::Fortnightly, PayFrequency::FourWeekly] {
            assert_eq!(frequency.factoring().periods, 52);
        }
    }

    #[test]
    fn test_current_period_picks_matching_coordinate() {
        let period = TaxPeriod::from_date(NaiveDate::from_ymd_opt(2018, 4, 5).unwrap()).unwrap();
        assert_eq!(PayFrequency::Monthly.current_period(&period), 12);
        assert_eq!(PayFrequency::FourWeekly.current_period(&period), 14);
        assert_eq!(PayFrequency::Fortnightly.current_period(&period), 27);
        assert_eq!(PayFrequency::Weekly.current_period(&period), 53);
    }

    #[test]
    fn test_extra_period_only_at_tax_year_end() {
        let last_day = TaxPeriod::from_date(NaiveDate::from_ymd_opt(2018, 4, 5).unwrap()).unwrap();
        for frequency in [PayFrequency::Weekly, PayFrequency::Fortnightly, PayFrequency::FourWeekly] {
            assert!(frequency.is_extra_period(&last_day), "{}", frequency);
        }
        assert!(!PayFrequency::Monthly.is_extra_period(&last_day));

        // 2018-04-03 is the last day of week 52.
        let week_52 = TaxPeriod::from_date(NaiveDate::from_ymd_opt(2018, 4, 3).unwrap()).unwrap();
        assert_eq!(week_52.week, 52);
        for frequency in PayFrequency::ALL {
            assert!(!frequency.is_extra_period(&week_52), "{}", frequency);
        }
    }

    #[test]
    fn test_from_str_round_trips_display() {
        for frequency in PayFrequency::ALL {
            assert_eq!(frequency.to_string().parse::<PayFrequency>().unwrap(), frequency);
        }
    }

    #[test]
    fn test_unknown_frequency_is_invalid_input() {
        let result = "quarterly".parse::<PayFrequency>();
        assert!(matches!(result, Err(EngineError::InvalidInput { .. })));
    }

    #[test]
    fn test_frequency_serialization() {
        let json = serde_json::to_string(&PayFrequency::FourWeekly).unwrap();
        assert_eq!(json, "\"four_weekly\"");
        let frequency: PayFrequency = serde_json::from_str("\"fortnightly\"").unwrap();
        assert_eq!(frequency, PayFrequency::Fortnightly);
    }
}
