//! Loan amortization: schedule engine, form intake and result pagination.

pub mod engine;
pub mod pagination;
pub mod request;

pub use engine::{
    compute, generate_schedule, validate, LoanParameters, LoanSummary, PaymentSchedule,
    PaymentScheduleItem, ScheduleOutput,
};
pub use pagination::{paginate, year_breakdown, SchedulePage, YearlyTotals, DEFAULT_PAGE_SIZE};
pub use request::{amortize, amortize_input, LoanInput, LoanRequest};
