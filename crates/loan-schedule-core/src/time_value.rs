use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::LoanScheduleError;
use crate::types::{Money, Rate};
use crate::LoanScheduleResult;

/// Level payment that fully amortizes `present_value` over `nper` periods
/// at a periodic `rate`. Returned unrounded and as a positive amount.
///
/// A zero rate degenerates to straight-line repayment, `pv / n`. Amounts too
/// large for 96-bit decimal arithmetic fail with `AmountOutOfRange`.
pub fn level_payment(rate: Rate, nper: u32, present_value: Money) -> LoanScheduleResult<Money> {
    if nper == 0 {
        return Err(LoanScheduleError::InvalidTenure { months: 0 });
    }

    let out_of_range = || LoanScheduleError::AmountOutOfRange {
        principal: present_value,
    };

    let n = Decimal::from(nper);
    if rate.is_zero() {
        return present_value.checked_div(n).ok_or_else(out_of_range);
    }

    let factor = (Decimal::ONE + rate)
        .checked_powu(u64::from(nper))
        .ok_or_else(out_of_range)?;
    let denominator = factor - Decimal::ONE;

    // Only reachable when the rate is too small to register in 28 digits.
    if denominator.is_zero() {
        return present_value.checked_div(n).ok_or_else(out_of_range);
    }

    rate.checked_mul(factor)
        .and_then(|growth| present_value.checked_mul(growth))
        .and_then(|scaled| scaled.checked_div(denominator))
        .ok_or_else(out_of_range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_level_payment_basic() {
        // 100k at 0.5% per month over 12 months
        let result = level_payment(dec!(0.005), 12, dec!(100000)).unwrap();
        assert!((result - dec!(8606.64)).abs() < dec!(0.01), "got {result}");
    }

    #[test]
    fn test_level_payment_thirty_year() {
        // 200k at 6%/12 over 360 months ≈ 1199.10
        let result = level_payment(dec!(0.005), 360, dec!(200000)).unwrap();
        assert!((result - dec!(1199.10)).abs() < dec!(0.01), "got {result}");
    }

    #[test]
    fn test_level_payment_zero_rate() {
        let result = level_payment(Decimal::ZERO, 12, dec!(12000)).unwrap();
        assert_eq!(result, dec!(1000));
    }

    #[test]
    fn test_level_payment_single_period() {
        // One period: principal plus one period of interest
        let result = level_payment(dec!(0.01), 1, dec!(1000)).unwrap();
        assert_eq!(result, dec!(1010));
    }

    #[test]
    fn test_level_payment_overflow_is_an_error() {
        // 100% a year for 30 years: (1 + 1/12)^360 is about 3e12
        let principal = dec!(1000000000000000000);
        let err = level_payment(dec!(100) / dec!(1200), 360, principal).unwrap_err();
        assert_eq!(err, LoanScheduleError::AmountOutOfRange { principal });
    }

    #[test]
    fn test_level_payment_zero_periods_rejected() {
        let err = level_payment(dec!(0.01), 0, dec!(1000)).unwrap_err();
        assert_eq!(err, LoanScheduleError::InvalidTenure { months: 0 });
    }
}
