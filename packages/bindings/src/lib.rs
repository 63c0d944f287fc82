use napi::{Result as NapiResult, Status};
use napi_derive::napi;
use serde::Deserialize;

use loan_schedule_core::amortization::{self, LoanInput, LoanParameters, PaymentSchedule};
use loan_schedule_core::LoanScheduleError;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Core errors keep their kind so the dashboard can highlight the offending
/// field: `"invalid_tenure: Invalid tenure: 0 months ..."`. Caller input
/// errors surface as `InvalidArg`.
fn to_napi_loan_error(e: LoanScheduleError) -> napi::Error {
    let status = if e.is_validation() {
        Status::InvalidArg
    } else {
        Status::GenericFailure
    };
    napi::Error::new(status, format!("{}: {}", e.kind(), e))
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// Calculator form submission (loan amount + down payment) or net-principal
/// terms (`loanAmount`) to schedule.
#[napi]
pub fn amortize_loan(input_json: String) -> NapiResult<String> {
    let input: LoanInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::amortize_input(input).map_err(to_napi_loan_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Engine parameters (principal already net of down payment) to schedule.
#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: LoanParameters = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::generate_schedule(&input).map_err(to_napi_loan_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Validate loan parameters without computing; returns `"ok"`.
#[napi]
pub fn validate_loan(input_json: String) -> NapiResult<String> {
    let input: LoanParameters = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    amortization::validate(&input).map_err(to_napi_loan_error)?;
    Ok("ok".to_string())
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct PageRequest {
    schedule: PaymentSchedule,
    page: usize,
    #[serde(default = "default_per_page")]
    per_page: usize,
}

fn default_per_page() -> usize {
    amortization::DEFAULT_PAGE_SIZE
}

/// Slice a previously computed schedule into one page.
#[napi]
pub fn schedule_page(input_json: String) -> NapiResult<String> {
    let input: PageRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let page = amortization::paginate(&input.schedule, input.page, input.per_page)
        .map_err(to_napi_loan_error)?;
    serde_json::to_string(&page).map_err(to_napi_error)
}

/// Per-calendar-year totals of a previously computed schedule.
#[napi]
pub fn schedule_yearly_totals(schedule_json: String) -> NapiResult<String> {
    let schedule: PaymentSchedule = serde_json::from_str(&schedule_json).map_err(to_napi_error)?;
    let years = amortization::year_breakdown(&schedule);
    serde_json::to_string(&years).map_err(to_napi_error)
}
