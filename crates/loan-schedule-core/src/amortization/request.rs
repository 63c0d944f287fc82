//! Intake of the loan calculator form.
//!
//! The form collects a gross loan amount and a down payment. The financed
//! principal is derived here instead of being taken from the caller.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::engine::{generate_schedule, LoanParameters, ScheduleOutput};
use crate::error::LoanScheduleError;
use crate::types::{ComputationOutput, Money};
use crate::LoanScheduleResult;

/// Raw loan terms as submitted by the calculator form.
///
/// Accepts the form's camelCase field names as aliases. The gross amount
/// arrives as `originalLoanAmount`; `loanAmount` on the wire means the net
/// principal and belongs to [`LoanParameters`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    /// Gross amount before the down payment.
    #[serde(alias = "originalLoanAmount")]
    pub loan_amount: Money,
    #[serde(default, alias = "downPayment")]
    pub down_payment: Money,
    /// Annual rate in percent.
    #[serde(alias = "interestRate")]
    pub interest_rate: Decimal,
    #[serde(alias = "tenureMonths")]
    pub tenure_months: i32,
    #[serde(alias = "startDate")]
    pub start_date: NaiveDate,
}

impl LoanRequest {
    /// Derive engine parameters, subtracting the down payment.
    ///
    /// The down payment must be non-negative and strictly less than the loan
    /// amount. Rate, tenure and principal are checked later by the engine.
    pub fn into_parameters(&self) -> LoanScheduleResult<LoanParameters> {
        if self.loan_amount <= Decimal::ZERO {
            return Err(LoanScheduleError::InvalidPrincipal {
                value: self.loan_amount,
            });
        }
        if self.down_payment < Decimal::ZERO || self.down_payment >= self.loan_amount {
            return Err(LoanScheduleError::InvalidDownPayment {
                down_payment: self.down_payment,
                loan_amount: self.loan_amount,
            });
        }

        Ok(LoanParameters {
            principal: self.loan_amount - self.down_payment,
            annual_rate_percent: self.interest_rate,
            tenure_months: self.tenure_months,
            start_date: self.start_date,
            original_loan_amount: Some(self.loan_amount),
            down_payment: Some(self.down_payment),
        })
    }
}

/// Validate a form submission and produce its schedule.
pub fn amortize(request: &LoanRequest) -> LoanScheduleResult<ComputationOutput<ScheduleOutput>> {
    let params = request.into_parameters()?;
    generate_schedule(&params)
}

/// Loan terms in either wire shape: the calculator form (gross amount plus
/// down payment) or engine parameters whose `loanAmount` / `principal` is
/// already net of the down payment.
#[derive(Debug, Clone, PartialEq)]
pub enum LoanInput {
    Form(LoanRequest),
    Parameters(LoanParameters),
}

/// Field names that mark a document as net-principal engine parameters.
const PRINCIPAL_KEYS: [&str; 2] = ["principal", "loanAmount"];

impl LoanInput {
    /// Pick the shape from the keys present, then deserialize strictly into
    /// it so missing fields are reported against the right struct.
    pub fn from_value(value: Value) -> LoanScheduleResult<Self> {
        let has_principal = PRINCIPAL_KEYS.iter().any(|key| value.get(key).is_some());
        if has_principal {
            Ok(LoanInput::Parameters(serde_json::from_value(value)?))
        } else {
            Ok(LoanInput::Form(serde_json::from_value(value)?))
        }
    }

    pub fn into_parameters(self) -> LoanScheduleResult<LoanParameters> {
        match self {
            LoanInput::Form(request) => request.into_parameters(),
            LoanInput::Parameters(params) => Ok(params),
        }
    }
}

impl<'de> Deserialize<'de> for LoanInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        LoanInput::from_value(value).map_err(serde::de::Error::custom)
    }
}

impl From<LoanRequest> for LoanInput {
    fn from(request: LoanRequest) -> Self {
        LoanInput::Form(request)
    }
}

impl From<LoanParameters> for LoanInput {
    fn from(params: LoanParameters) -> Self {
        LoanInput::Parameters(params)
    }
}

/// Produce a schedule from either input shape.
pub fn amortize_input(input: LoanInput) -> LoanScheduleResult<ComputationOutput<ScheduleOutput>> {
    let params = input.into_parameters()?;
    generate_schedule(&params)
}
