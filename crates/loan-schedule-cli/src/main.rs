mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::schedule::{ScheduleArgs, SummaryArgs};

/// Monthly loan amortization schedules
#[derive(Parser)]
#[command(
    name = "loansched",
    version,
    about = "Monthly loan amortization schedules",
    long_about = "Computes fixed-rate monthly amortization schedules with decimal \
                  precision: level payment, per-month interest and principal split, \
                  running balances and a loan summary."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log filter used when RUST_LOG is unset (e.g. "debug" or "loan_schedule_core=trace")
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the month-by-month payment schedule
    Schedule(ScheduleArgs),
    /// Loan summary with per-year totals, without the monthly rows
    Summary(SummaryArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&cli.log_level) {
        eprintln!("{}: {}", "error".red().bold(), e);
        process::exit(2);
    }

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::Summary(args) => commands::schedule::run_summary(args),
        Commands::Version => {
            println!("loansched {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
