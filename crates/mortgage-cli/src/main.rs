mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::amortization::{ChartArgs, ExportArgs, PlanArgs, ScheduleArgs, SummaryArgs};
use commands::strategy::StrategiesArgs;

/// Mortgage amortisation, prepayment and strategy analysis
#[derive(Parser)]
#[command(
    name = "mortgage",
    version,
    about = "Mortgage amortisation, prepayment and strategy analysis",
    long_about = "A CLI for French (constant-payment) amortisation schedules with decimal \
                  precision. Supports periodic and lump prepayments, payment recasting, \
                  prepayment scenario comparison, workbook export, and mortgage-vs-investment \
                  strategy projections."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Contractual payment and outstanding balance after the paid periods
    Summary(SummaryArgs),
    /// Full month-by-month amortisation schedule
    Schedule(ScheduleArgs),
    /// No prepayment vs. annual limit vs. double limit
    PrepaymentScenarios(PlanArgs),
    /// No prepayment vs. the annual-limit plan, with an explanation
    Compare(PlanArgs),
    /// Balance or cumulative-interest series for the three scenarios
    Chart(ChartArgs),
    /// Scenario schedules and summary as flat sheets
    Export(ExportArgs),
    /// Pure investment vs. prepayment strategies over a horizon
    Strategies(StrategiesArgs),
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

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Summary(args) => commands::amortization::run_summary(args),
        Commands::Schedule(args) => commands::amortization::run_schedule(args),
        Commands::PrepaymentScenarios(args) => commands::amortization::run_scenarios(args),
        Commands::Compare(args) => commands::amortization::run_compare(args),
        Commands::Chart(args) => commands::amortization::run_chart(args),
        Commands::Export(args) => commands::amortization::run_export(args),
        Commands::Strategies(args) => commands::strategy::run_strategies(args),
        Commands::Version => {
            println!("mortgage {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
