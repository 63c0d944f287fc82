use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoanScheduleError {
    #[error("Invalid principal: {value} (must be greater than zero)")]
    InvalidPrincipal { value: Decimal },

    #[error("Invalid tenure: {months} months (must be between 1 and 360)")]
    InvalidTenure { months: i32 },

    #[error("Invalid interest rate: {rate}% (must be between 0 and 100)")]
    InvalidRate { rate: Decimal },

    #[error("Invalid down payment: {down_payment} against loan amount {loan_amount}")]
    InvalidDownPayment {
        down_payment: Decimal,
        loan_amount: Decimal,
    },

    #[error("Amount out of range: principal {principal} overflows the schedule arithmetic")]
    AmountOutOfRange { principal: Decimal },

    #[error("Invalid page request: page {page}, {per_page} items per page")]
    InvalidPage { page: usize, per_page: usize },

    #[error("Date out of range: {start_date} plus {months} months")]
    DateOutOfRange { start_date: NaiveDate, months: u32 },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LoanScheduleError {
    /// Stable machine-readable tag for the error variant.
    pub fn kind(&self) -> &'static str {
        match self {
            LoanScheduleError::InvalidPrincipal { .. } => "invalid_principal",
            LoanScheduleError::InvalidTenure { .. } => "invalid_tenure",
            LoanScheduleError::InvalidRate { .. } => "invalid_rate",
            LoanScheduleError::InvalidDownPayment { .. } => "invalid_down_payment",
            LoanScheduleError::AmountOutOfRange { .. } => "amount_out_of_range",
            LoanScheduleError::InvalidPage { .. } => "invalid_page",
            LoanScheduleError::DateOutOfRange { .. } => "date_out_of_range",
            LoanScheduleError::SerializationError(_) => "serialization_error",
        }
    }

    /// True for errors caused by caller input. Nothing here is transient.
    pub fn is_validation(&self) -> bool {
        !matches!(self, LoanScheduleError::SerializationError(_))
    }
}

impl From<serde_json::Error> for LoanScheduleError {
    fn from(e: serde_json::Error) -> Self {
        LoanScheduleError::SerializationError(e.to_string())
    }
}
