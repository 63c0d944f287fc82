//! Presentation helpers for the results view: fixed-size pages and
//! per-calendar-year totals.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::engine::{PaymentSchedule, PaymentScheduleItem};
use crate::error::LoanScheduleError;
use crate::types::Money;
use crate::LoanScheduleResult;

/// Rows per page in the results view: one year of payments.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// One page of schedule rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulePage {
    /// 1-based page number.
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub items: Vec<PaymentScheduleItem>,
}

impl SchedulePage {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Totals for the payments falling in one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyTotals {
    pub year: i32,
    pub payments: u32,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub total_paid: Money,
    /// Balance after the year's last payment.
    pub closing_balance: Money,
}

/// Slice a schedule into a 1-based page.
///
/// A page past the end is returned empty rather than as an error, so a view
/// can render "no rows" for a stale page number.
pub fn paginate(
    schedule: &PaymentSchedule,
    page: usize,
    per_page: usize,
) -> LoanScheduleResult<SchedulePage> {
    if page == 0 || per_page == 0 {
        return Err(LoanScheduleError::InvalidPage { page, per_page });
    }

    let total_items = schedule.len();
    let total_pages = total_items.div_ceil(per_page);
    let start = (page - 1).saturating_mul(per_page).min(total_items);
    let end = start.saturating_add(per_page).min(total_items);

    Ok(SchedulePage {
        page,
        per_page,
        total_items,
        total_pages,
        items: schedule.items()[start..end].to_vec(),
    })
}

/// Group schedule rows by the calendar year of their payment date.
///
/// Sums are taken over the already-rounded rows, so they match the displayed
/// table exactly.
pub fn year_breakdown(schedule: &PaymentSchedule) -> Vec<YearlyTotals> {
    let mut years: Vec<YearlyTotals> = Vec::new();

    for item in schedule {
        let year = item.payment_date.year();
        match years.last_mut() {
            Some(current) if current.year == year => {
                current.payments += 1;
                current.principal_paid += item.principal_payment;
                current.interest_paid += item.interest_payment;
                current.total_paid += item.monthly_payment;
                current.closing_balance = item.remaining_balance;
            }
            _ => years.push(YearlyTotals {
                year,
                payments: 1,
                principal_paid: item.principal_payment,
                interest_paid: item.interest_payment,
                total_paid: item.monthly_payment,
                closing_balance: item.remaining_balance,
            }),
        }
    }

    years
}
