//! Pay period model.
//!
//! This module contains the [`PayPeriod`] type, the calendar-month window that
//! payroll is computed over.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{HrmsError, HrmsResult};

/// A pay period with an inclusive date range.
///
/// # Example
///
/// ```
/// use people360::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let april = PayPeriod::for_month(2024, 4).unwrap();
/// assert_eq!(april.start_date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
/// assert_eq!(april.end_date, NaiveDate::from_ymd_opt(2024, 4, 30).unwrap());
/// assert!(april.contains_date(NaiveDate::from_ymd_opt(2024, 4, 15).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayPeriod {
    /// The start date of the pay period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the pay period (inclusive).
    pub end_date: NaiveDate,
}

impl PayPeriod {
    /// Resolves the calendar month `month` of `year` to a pay period.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `month` is not in `1..=12` or the year is
    /// outside the supported calendar range.
    ///
    /// # Example
    ///
    /// ```
    /// use people360::models::PayPeriod;
    /// use chrono::NaiveDate;
    ///
    /// // Leap-year February
    /// let feb = PayPeriod::for_month(2024, 2).unwrap();
    /// assert_eq!(feb.end_date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    ///
    /// assert!(PayPeriod::for_month(2024, 13).is_err());
    /// ```
    pub fn for_month(year: i32, month: u32) -> HrmsResult<Self> {
        let start_date = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            HrmsError::validation("month", format!("{}-{} is not a valid month", year, month))
        })?;

        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let end_date = NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|first_of_next| first_of_next.pred_opt())
            .ok_or_else(|| {
                HrmsError::validation("year", format!("{} is outside the supported range", year))
            })?;

        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// Checks if a given date falls within this pay period.
    ///
    /// The check is inclusive of both start and end dates.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns the month number (1-12) of the period start.
    pub fn month(&self) -> u32 {
        self.start_date.month()
    }

    /// Returns the year of the period start.
    pub fn year(&self) -> i32 {
        self.start_date.year()
    }

    /// Iterates over every date in the period, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date
            .iter_days()
            .take_while(move |date| *date <= self.end_date)
    }

    /// Returns a label such as "April 2024".
    pub fn label(&self) -> String {
        self.start_date.format("%B %Y").to_string()
    }
}
