use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::info;

use loan_schedule_core::amortization::{
    self, pagination, LoanInput, LoanParameters, LoanRequest, DEFAULT_PAGE_SIZE,
};

use crate::input;

/// Loan terms shared by every schedule command
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct LoanTermsArgs {
    /// Gross loan amount before the down payment
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Down payment subtracted from the loan amount
    #[arg(long, default_value = "0")]
    pub down_payment: Decimal,

    /// Financed principal, already net of any down payment
    #[arg(long, conflicts_with_all = ["loan_amount", "down_payment"])]
    pub principal: Option<Decimal>,

    /// Nominal annual interest rate in percent (e.g. 6 for 6%)
    #[arg(long, alias = "rate")]
    pub interest_rate: Option<Decimal>,

    /// Number of monthly payments (1-360)
    #[arg(long, alias = "months")]
    pub tenure_months: Option<i32>,

    /// Loan start date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Path to a JSON or YAML loan request or engine parameters (overrides flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the full schedule
#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub terms: LoanTermsArgs,

    /// Only emit this 1-based page of the schedule
    #[arg(long)]
    pub page: Option<usize>,

    /// Rows per page when --page is set
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub per_page: usize,
}

/// Arguments for the summary view
#[derive(Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub terms: LoanTermsArgs,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = load_input(&args.terms)?;
    let output = amortization::amortize_input(input)?;
    info!(
        tenure_months = output.result.summary.tenure_months,
        monthly_payment = %output.result.summary.monthly_payment,
        "schedule computed"
    );

    let mut value = serde_json::to_value(&output)?;
    if let Some(page_number) = args.page {
        let page = amortization::paginate(&output.result.schedule, page_number, args.per_page)?;
        value["result"]["schedule"] = serde_json::to_value(&page.items)?;
        value["result"]["page"] = page_info(&page);
    }
    Ok(value)
}

pub fn run_summary(args: SummaryArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = load_input(&args.terms)?;
    let output = amortization::amortize_input(input)?;
    let yearly = pagination::year_breakdown(&output.result.schedule);

    let mut value = serde_json::to_value(&output)?;
    if let Value::Object(result) = &mut value["result"] {
        result.remove("schedule");
        result.insert("yearly".into(), serde_json::to_value(&yearly)?);
    }
    Ok(value)
}

/// Resolve the loan terms: input file, then flags, then piped stdin.
///
/// Documents carrying `loanAmount` or `principal` are read as net-principal
/// engine parameters; anything else as a calculator form.
fn load_input(args: &LoanTermsArgs) -> Result<LoanInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_input(path);
    }
    if args.loan_amount.is_some() || args.principal.is_some() {
        return input_from_flags(args, Local::now().date_naive());
    }
    if let Some(input) = input::stdin::read_stdin()? {
        return Ok(input);
    }
    Err("--loan-amount, --principal, --input <file> or a JSON request on stdin is required".into())
}

fn input_from_flags(
    args: &LoanTermsArgs,
    today: NaiveDate,
) -> Result<LoanInput, Box<dyn std::error::Error>> {
    let interest_rate = args
        .interest_rate
        .ok_or("--interest-rate is required (or provide --input)")?;
    let tenure_months = args
        .tenure_months
        .ok_or("--tenure-months is required (or provide --input)")?;
    let start_date = args.start_date.unwrap_or(today);

    if let Some(principal) = args.principal {
        return Ok(LoanParameters::new(principal, interest_rate, tenure_months, start_date).into());
    }

    Ok(LoanRequest {
        loan_amount: args
            .loan_amount
            .ok_or("--loan-amount or --principal is required (or provide --input)")?,
        down_payment: args.down_payment,
        interest_rate,
        tenure_months,
        start_date,
    }
    .into())
}

fn page_info(page: &pagination::SchedulePage) -> Value {
    json!({
        "page": page.page,
        "per_page": page.per_page,
        "total_items": page.total_items,
        "total_pages": page.total_pages,
        "has_next": page.has_next(),
        "has_previous": page.has_previous(),
    })
}
