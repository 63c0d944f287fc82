//! Calendar-month arithmetic for payment dates.

use chrono::{Months, NaiveDate};

/// Add a number of calendar months to a date, clamping the day to the
/// target month's last day (Jan 31 + 1 month = Feb 28/29).
///
/// Returns `None` only if the result falls outside chrono's date range.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}
