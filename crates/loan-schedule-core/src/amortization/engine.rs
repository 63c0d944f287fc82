//! Fixed-rate monthly amortization engine.
//!
//! Produces a month-by-month payment schedule and a loan summary from a
//! principal, annual rate, tenure and start date. Interest, principal and
//! balances are carried at full `Decimal` precision between periods; values
//! are rounded to cents only when a schedule row is emitted. The final period
//! repays whatever balance remains, so the schedule always closes at exactly
//! zero.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::calendar::add_months;
use crate::error::LoanScheduleError;
use crate::time_value::level_payment;
use crate::types::{round_money, with_metadata, ComputationOutput, Money, Rate};
use crate::LoanScheduleResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Longest supported tenure (30 years of monthly payments).
pub const MAX_TENURE_MONTHS: i32 = 360;
/// Upper bound on the nominal annual rate, in percent.
pub const MAX_ANNUAL_RATE_PERCENT: Decimal = dec!(100);
const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);
/// Final payment drift beyond this is reported as a warning.
const DRIFT_TOLERANCE: Decimal = dec!(0.01);

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// Loan terms fed to the engine.
///
/// Also accepts the results view's query parameter names (`loanAmount`,
/// `interestRate`, `tenureMonths`, `startDate`, ...), where `loanAmount` is
/// already net of the down payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    /// Financed amount, after any down payment.
    #[serde(alias = "loanAmount")]
    pub principal: Money,
    /// Nominal annual rate in percent (6 = 6%).
    #[serde(alias = "interestRate")]
    pub annual_rate_percent: Decimal,
    /// Number of monthly payments.
    #[serde(alias = "tenureMonths")]
    pub tenure_months: i32,
    /// Origination date. The first payment falls one month later.
    #[serde(alias = "startDate")]
    pub start_date: NaiveDate,
    /// Gross loan amount before the down payment. Display only.
    #[serde(
        default,
        alias = "originalLoanAmount",
        skip_serializing_if = "Option::is_none"
    )]
    pub original_loan_amount: Option<Money>,
    /// Down payment already subtracted from `principal`. Display only.
    #[serde(default, alias = "downPayment", skip_serializing_if = "Option::is_none")]
    pub down_payment: Option<Money>,
}

impl LoanParameters {
    pub fn new(
        principal: Money,
        annual_rate_percent: Decimal,
        tenure_months: i32,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            principal,
            annual_rate_percent,
            tenure_months,
            start_date,
            original_loan_amount: None,
            down_payment: None,
        }
    }

    /// Periodic rate: annual percent / 100 / 12.
    pub fn monthly_rate(&self) -> Rate {
        self.annual_rate_percent / PERCENT / MONTHS_PER_YEAR
    }
}

/// One month of the schedule. Every monetary field is rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentScheduleItem {
    pub payment_number: u32,
    pub payment_date: NaiveDate,
    pub monthly_payment: Money,
    pub principal_payment: Money,
    pub interest_payment: Money,
    pub remaining_balance: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
}

/// Ordered schedule rows, numbered 1..=tenure with no gaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentSchedule {
    items: Vec<PaymentScheduleItem>,
}

impl PaymentSchedule {
    pub fn items(&self) -> &[PaymentScheduleItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&PaymentScheduleItem> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&PaymentScheduleItem> {
        self.items.last()
    }

    /// Look up a row by its 1-based payment number.
    pub fn get(&self, payment_number: u32) -> Option<&PaymentScheduleItem> {
        let index = payment_number.checked_sub(1)?;
        self.items.get(index as usize)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PaymentScheduleItem> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a PaymentSchedule {
    type Item = &'a PaymentScheduleItem;
    type IntoIter = std::slice::Iter<'a, PaymentScheduleItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Aggregate view of a computed schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub original_loan_amount: Money,
    pub down_payment: Money,
    pub final_loan_amount: Money,
    /// Level payment. The final row may differ by the drift correction.
    pub monthly_payment: Money,
    pub total_payments: u32,
    pub total_interest: Money,
    pub total_amount_paid: Money,
    /// Annual rate in percent, as supplied.
    pub interest_rate: Decimal,
    pub tenure_months: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Result body of [`generate_schedule`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub summary: LoanSummary,
    pub schedule: PaymentSchedule,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Check loan terms without computing anything.
///
/// Also confirms that the last payment date is representable, so `compute`
/// never fails halfway through a schedule.
pub fn validate(params: &LoanParameters) -> LoanScheduleResult<()> {
    if params.principal <= Decimal::ZERO {
        return Err(LoanScheduleError::InvalidPrincipal {
            value: params.principal,
        });
    }
    if params.tenure_months <= 0 || params.tenure_months > MAX_TENURE_MONTHS {
        return Err(LoanScheduleError::InvalidTenure {
            months: params.tenure_months,
        });
    }
    if params.annual_rate_percent < Decimal::ZERO
        || params.annual_rate_percent > MAX_ANNUAL_RATE_PERCENT
    {
        return Err(LoanScheduleError::InvalidRate {
            rate: params.annual_rate_percent,
        });
    }
    payment_date(params.start_date, params.tenure_months as u32)?;
    Ok(())
}

/// Compute the full schedule and its summary in a single pass.
pub fn compute(params: &LoanParameters) -> LoanScheduleResult<(PaymentSchedule, LoanSummary)> {
    validate(params)?;

    let tenure = params.tenure_months as u32;
    let monthly_rate = params.monthly_rate();
    let level = level_payment(monthly_rate, tenure, params.principal)?;

    debug!(
        principal = %params.principal,
        annual_rate_percent = %params.annual_rate_percent,
        tenure,
        level_payment = %level,
        "computing amortization schedule"
    );

    let mut items = Vec::with_capacity(tenure as usize);
    let mut balance = params.principal;
    let mut cumulative_interest = Decimal::ZERO;
    let mut cumulative_principal = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;

    for payment_number in 1..=tenure {
        let interest_payment = checked(balance.checked_mul(monthly_rate), params)?;

        // The last period repays the exact outstanding balance, absorbing
        // any precision drift from the level payment.
        let (principal_payment, payment) = if payment_number == tenure {
            (balance, checked(balance.checked_add(interest_payment), params)?)
        } else {
            (checked(level.checked_sub(interest_payment), params)?, level)
        };

        balance = checked(balance.checked_sub(principal_payment), params)?;
        if balance <= Decimal::ZERO {
            // Also normalizes a negative zero.
            balance = Decimal::ZERO;
        }
        cumulative_interest = checked(cumulative_interest.checked_add(interest_payment), params)?;
        cumulative_principal =
            checked(cumulative_principal.checked_add(principal_payment), params)?;
        total_paid = checked(total_paid.checked_add(payment), params)?;

        items.push(PaymentScheduleItem {
            payment_number,
            payment_date: payment_date(params.start_date, payment_number)?,
            monthly_payment: round_money(payment),
            principal_payment: round_money(principal_payment),
            interest_payment: round_money(interest_payment),
            remaining_balance: round_money(balance),
            cumulative_interest: round_money(cumulative_interest),
            cumulative_principal: round_money(cumulative_principal),
        });
    }

    let summary = LoanSummary {
        original_loan_amount: round_money(params.original_loan_amount.unwrap_or(params.principal)),
        down_payment: round_money(params.down_payment.unwrap_or(Decimal::ZERO)),
        final_loan_amount: round_money(params.principal),
        monthly_payment: round_money(level),
        total_payments: tenure,
        total_interest: round_money(cumulative_interest),
        total_amount_paid: round_money(total_paid),
        interest_rate: params.annual_rate_percent,
        tenure_months: tenure,
        start_date: params.start_date,
        end_date: payment_date(params.start_date, tenure)?,
    };

    debug!(
        total_interest = %summary.total_interest,
        total_amount_paid = %summary.total_amount_paid,
        end_date = %summary.end_date,
        "amortization schedule complete"
    );

    Ok((PaymentSchedule { items }, summary))
}

/// Compute a schedule and wrap it in the standard output envelope.
pub fn generate_schedule(
    params: &LoanParameters,
) -> LoanScheduleResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let (schedule, summary) = compute(params)?;

    if params.annual_rate_percent.is_zero() {
        warnings.push("Zero interest rate; schedule is straight-line principal repayment".into());
    }

    if let Some(last) = schedule.last() {
        let drift = (last.monthly_payment - summary.monthly_payment).abs();
        if drift > DRIFT_TOLERANCE {
            warn!(
                level_payment = %summary.monthly_payment,
                final_payment = %last.monthly_payment,
                drift = %drift,
                "final payment differs from level payment"
            );
            warnings.push(format!(
                "Final payment {} differs from level payment {} by {}",
                last.monthly_payment, summary.monthly_payment, drift
            ));
        }
    }

    let assumptions = serde_json::json!({
        "principal": params.principal.to_string(),
        "annual_rate_percent": params.annual_rate_percent.to_string(),
        "monthly_rate": params.monthly_rate().to_string(),
        "tenure_months": params.tenure_months,
        "start_date": params.start_date.to_string(),
        "rounding": "2dp, half away from zero, at emission",
        "date_rule": "start date plus n calendar months, clamped to month end",
    });

    let output = ScheduleOutput { summary, schedule };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-rate monthly amortization with final-period balance correction",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Overflow in the schedule loop is reported against the principal.
fn checked(value: Option<Decimal>, params: &LoanParameters) -> LoanScheduleResult<Decimal> {
    value.ok_or(LoanScheduleError::AmountOutOfRange {
        principal: params.principal,
    })
}

fn payment_date(start_date: NaiveDate, months: u32) -> LoanScheduleResult<NaiveDate> {
    add_months(start_date, months).ok_or(LoanScheduleError::DateOutOfRange { start_date, months })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// 100k at 6% over one year, starting 2024-01-01.
    fn one_year_loan() -> LoanParameters {
        LoanParameters::new(dec!(100000), dec!(6), 12, ymd(2024, 1, 1))
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[test]
    fn test_rejects_zero_principal() {
        let mut params = one_year_loan();
        params.principal = Decimal::ZERO;
        assert_eq!(
            compute(&params).unwrap_err(),
            LoanScheduleError::InvalidPrincipal { value: dec!(0) }
        );
    }

    #[test]
    fn test_rejects_negative_principal() {
        let mut params = one_year_loan();
        params.principal = dec!(-100);
        assert_eq!(
            compute(&params).unwrap_err(),
            LoanScheduleError::InvalidPrincipal { value: dec!(-100) }
        );
    }

    #[test]
    fn test_rejects_tenure_out_of_range() {
        for months in [0, -3, 361] {
            let mut params = one_year_loan();
            params.tenure_months = months;
            assert_eq!(
                compute(&params).unwrap_err(),
                LoanScheduleError::InvalidTenure { months }
            );
        }
    }

    #[test]
    fn test_rejects_rate_out_of_range() {
        for rate in [dec!(-1), dec!(100.01)] {
            let mut params = one_year_loan();
            params.annual_rate_percent = rate;
            assert_eq!(
                compute(&params).unwrap_err(),
                LoanScheduleError::InvalidRate { rate }
            );
        }
    }

    #[test]
    fn test_accepts_boundary_values() {
        let mut params = one_year_loan();
        params.annual_rate_percent = dec!(100);
        params.tenure_months = 360;
        assert!(compute(&params).is_ok());

        params.tenure_months = 1;
        assert!(compute(&params).is_ok());
    }

    #[test]
    fn test_principal_checked_before_tenure() {
        let mut params = one_year_loan();
        params.principal = Decimal::ZERO;
        params.tenure_months = 0;
        params.annual_rate_percent = dec!(-5);
        assert_eq!(compute(&params).unwrap_err().kind(), "invalid_principal");
    }

    #[test]
    fn test_rejects_unrepresentable_end_date() {
        let params = LoanParameters::new(dec!(1000), dec!(5), 12, NaiveDate::MAX);
        let err = compute(&params).unwrap_err();
        assert_eq!(err.kind(), "date_out_of_range");
    }

    #[test]
    fn test_overflowing_principal_is_an_error() {
        let principal = dec!(1000000000000000000);
        let params = LoanParameters::new(principal, dec!(100), 360, ymd(2024, 1, 1));
        let err = compute(&params).unwrap_err();
        assert_eq!(err, LoanScheduleError::AmountOutOfRange { principal });
        assert_eq!(err.kind(), "amount_out_of_range");
        assert!(generate_schedule(&params).is_err());
    }

    #[test]
    fn test_large_principal_within_range() {
        let params = LoanParameters::new(dec!(1000000000000), dec!(100), 360, ymd(2024, 1, 1));
        let (schedule, _) = compute(&params).unwrap();
        assert_eq!(schedule.last().unwrap().remaining_balance, dec!(0));
    }

    // -----------------------------------------------------------------------
    // Standard scenario
    // -----------------------------------------------------------------------

    #[test]
    fn test_one_year_first_row() {
        let (schedule, summary) = compute(&one_year_loan()).unwrap();
        let first = schedule.first().unwrap();

        assert_eq!(summary.monthly_payment, dec!(8606.64));
        assert_eq!(first.payment_number, 1);
        assert_eq!(first.payment_date, ymd(2024, 2, 1));
        assert_eq!(first.monthly_payment, dec!(8606.64));
        assert_eq!(first.interest_payment, dec!(500.00));
        assert_eq!(first.principal_payment, dec!(8106.64));
        assert_eq!(first.remaining_balance, dec!(91893.36));
        assert_eq!(first.cumulative_interest, dec!(500.00));
        assert_eq!(first.cumulative_principal, dec!(8106.64));
    }

    #[test]
    fn test_one_year_last_row_closes_loan() {
        let (schedule, summary) = compute(&one_year_loan()).unwrap();
        let last = schedule.last().unwrap();

        assert_eq!(schedule.len(), 12);
        assert_eq!(last.payment_number, 12);
        assert_eq!(last.payment_date, ymd(2025, 1, 1));
        assert_eq!(last.remaining_balance.to_string(), "0.00");
        assert_eq!(last.cumulative_principal, dec!(100000.00));
        assert_eq!(last.cumulative_interest, summary.total_interest);
        assert_eq!(summary.end_date, ymd(2025, 1, 1));
    }

    #[test]
    fn test_one_year_summary_totals() {
        let (_, summary) = compute(&one_year_loan()).unwrap();

        assert_eq!(summary.original_loan_amount, dec!(100000.00));
        assert_eq!(summary.down_payment, dec!(0.00));
        assert_eq!(summary.final_loan_amount, dec!(100000.00));
        assert_eq!(summary.total_payments, 12);
        assert_eq!(summary.tenure_months, 12);
        assert_eq!(summary.interest_rate, dec!(6));
        // 12 * 8606.6429 - 100000 ≈ 3279.71
        assert!(
            (summary.total_interest - dec!(3279.71)).abs() <= dec!(0.01),
            "total interest {}",
            summary.total_interest
        );
        assert_eq!(
            summary.total_amount_paid,
            summary.final_loan_amount + summary.total_interest
        );
    }

    #[test]
    fn test_passthrough_fields_echoed() {
        let mut params = one_year_loan();
        params.original_loan_amount = Some(dec!(125000));
        params.down_payment = Some(dec!(25000));
        let (_, summary) = compute(&params).unwrap();

        assert_eq!(summary.original_loan_amount, dec!(125000.00));
        assert_eq!(summary.down_payment, dec!(25000.00));
        assert_eq!(summary.final_loan_amount, dec!(100000.00));
    }

    // -----------------------------------------------------------------------
    // Zero rate
    // -----------------------------------------------------------------------

    #[test]
    fn test_zero_rate_straight_line() {
        let params = LoanParameters::new(dec!(12000), Decimal::ZERO, 12, ymd(2024, 1, 1));
        let (schedule, summary) = compute(&params).unwrap();

        assert_eq!(summary.monthly_payment, dec!(1000.00));
        assert_eq!(summary.total_interest, dec!(0.00));
        for item in &schedule {
            assert_eq!(item.monthly_payment, dec!(1000.00));
            assert_eq!(item.principal_payment, dec!(1000.00));
            assert_eq!(item.interest_payment, dec!(0.00));
        }
        assert_eq!(schedule.last().unwrap().remaining_balance, dec!(0.00));
    }

    #[test]
    fn test_zero_rate_uneven_split() {
        let params = LoanParameters::new(dec!(10000), Decimal::ZERO, 3, ymd(2024, 1, 1));
        let (schedule, summary) = compute(&params).unwrap();

        assert_eq!(summary.monthly_payment, dec!(3333.33));
        assert_eq!(schedule.get(1).unwrap().principal_payment, dec!(3333.33));
        assert_eq!(schedule.get(2).unwrap().remaining_balance, dec!(3333.33));
        let last = schedule.last().unwrap();
        assert_eq!(last.remaining_balance, dec!(0.00));
        assert_eq!(last.cumulative_principal, dec!(10000.00));
    }

    // -----------------------------------------------------------------------
    // Schedule shape
    // -----------------------------------------------------------------------

    #[test]
    fn test_single_payment_loan() {
        let params = LoanParameters::new(dec!(1000), dec!(12), 1, ymd(2024, 1, 1));
        let (schedule, summary) = compute(&params).unwrap();

        assert_eq!(schedule.len(), 1);
        let only = schedule.first().unwrap();
        assert_eq!(only.interest_payment, dec!(10.00));
        assert_eq!(only.principal_payment, dec!(1000.00));
        assert_eq!(only.monthly_payment, dec!(1010.00));
        assert_eq!(only.remaining_balance, dec!(0.00));
        assert_eq!(summary.total_amount_paid, dec!(1010.00));
    }

    #[test]
    fn test_month_end_start_date_clamps() {
        let params = LoanParameters::new(dec!(5000), dec!(5), 3, ymd(2024, 1, 31));
        let (schedule, _) = compute(&params).unwrap();
        let dates: Vec<NaiveDate> = schedule.iter().map(|i| i.payment_date).collect();
        assert_eq!(dates, vec![ymd(2024, 2, 29), ymd(2024, 3, 31), ymd(2024, 4, 30)]);
    }

    #[test]
    fn test_schedule_get_out_of_range() {
        let (schedule, _) = compute(&one_year_loan()).unwrap();
        assert!(schedule.get(0).is_none());
        assert!(schedule.get(13).is_none());
        assert_eq!(schedule.get(12).unwrap().payment_number, 12);
    }

    #[test]
    fn test_parameters_accept_query_names() {
        let params: LoanParameters = serde_json::from_value(serde_json::json!({
            "loanAmount": "80000",
            "interestRate": "6",
            "tenureMonths": 12,
            "startDate": "2024-01-01",
            "originalLoanAmount": "100000",
            "downPayment": "20000"
        }))
        .unwrap();
        assert_eq!(params.principal, dec!(80000));
        assert_eq!(params.original_loan_amount, Some(dec!(100000)));

        let (_, summary) = compute(&params).unwrap();
        assert_eq!(summary.final_loan_amount, dec!(80000.00));
        assert_eq!(summary.down_payment, dec!(20000.00));
    }

    #[test]
    fn test_schedule_serializes_as_array() {
        let (schedule, _) = compute(&one_year_loan()).unwrap();
        let value = serde_json::to_value(&schedule).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0]["payment_date"], "2024-02-01");
        assert_eq!(rows[11]["remaining_balance"], "0.00");
    }

    // -----------------------------------------------------------------------
    // Envelope
    // -----------------------------------------------------------------------

    #[test]
    fn test_generate_schedule_envelope() {
        let out = generate_schedule(&one_year_loan()).unwrap();
        assert_eq!(out.result.schedule.len(), 12);
        assert!(out.warnings.is_empty(), "unexpected warnings {:?}", out.warnings);
        let monthly_rate: Decimal = out.assumptions["monthly_rate"]
            .as_str()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(monthly_rate, dec!(0.005));
        assert_eq!(out.assumptions["tenure_months"], 12);
    }

    #[test]
    fn test_generate_schedule_zero_rate_warning() {
        let params = LoanParameters::new(dec!(12000), Decimal::ZERO, 12, ymd(2024, 1, 1));
        let out = generate_schedule(&params).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("Zero interest rate"));
    }

    #[test]
    fn test_generate_schedule_propagates_validation() {
        let mut params = one_year_loan();
        params.tenure_months = 361;
        let err = generate_schedule(&params).unwrap_err();
        assert_eq!(err.kind(), "invalid_tenure");
    }
}
