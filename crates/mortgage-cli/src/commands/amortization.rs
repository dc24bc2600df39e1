use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_core::amortization::comparison::compare_prepayment;
use mortgage_core::amortization::export::{build_workbook, WorkbookInput, DEFAULT_DECIMALS};
use mortgage_core::amortization::policy::{PrepaymentAnalysisInput, PrepaymentPlan, PrepaymentPolicy};
use mortgage_core::amortization::scenarios::analyze_prepayment_scenarios;
use mortgage_core::amortization::schedule::{
    generate_schedule, EngineConfig, LoanTerms, PrepaymentTiming, ScheduleInput,
};
use mortgage_core::amortization::series::{chart_data, SeriesKind};
use mortgage_core::amortization::summary::{loan_summary, LoanSummaryInput};
use mortgage_core::time_value::RateConvention;

use super::load_input;

/// Loan contract and engine switches shared by the amortisation commands
#[derive(Args)]
pub struct LoanFlags {
    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 4.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub periods: Option<u32>,

    /// Treat the annual rate as nominal (rate / 12) instead of effective
    #[arg(long)]
    pub nominal: bool,

    /// Keep the payment fixed after a prepayment and shorten the term
    #[arg(long)]
    pub fixed_payment: bool,

    /// Apply prepayments at the start of the period, before interest accrues
    #[arg(long)]
    pub start_of_period: bool,
}

impl LoanFlags {
    fn terms(&self) -> Result<LoanTerms, Box<dyn std::error::Error>> {
        Ok(LoanTerms {
            principal: self
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_pct: self.rate.ok_or("--rate is required (or provide --input)")?,
            total_periods: self
                .periods
                .ok_or("--periods is required (or provide --input)")?,
            start_date: None,
        })
    }

    fn config(&self) -> EngineConfig {
        EngineConfig {
            rate_convention: if self.nominal {
                RateConvention::Nominal
            } else {
                RateConvention::Effective
            },
            recompute_on_prepayment: !self.fixed_payment,
            prepayment_timing: if self.start_of_period {
                PrepaymentTiming::StartOfPeriod
            } else {
                PrepaymentTiming::EndOfPeriod
            },
            ..EngineConfig::default()
        }
    }
}

/// Annual-limit prepayment plan flags
#[derive(Args)]
pub struct PlanFlags {
    /// Maximum prepaid per year
    #[arg(long)]
    pub annual_limit: Option<Decimal>,

    /// Months between prepayments (1, 2, 3, 4, 6 or 12)
    #[arg(long, default_value_t = 12)]
    pub frequency_months: u32,

    /// First period in which a prepayment is made
    #[arg(long)]
    pub start_period: Option<u32>,

    /// Instalments already paid
    #[arg(long, default_value_t = 0)]
    pub paid_periods: u32,
}

fn analysis_input(
    path: &Option<String>,
    loan: &LoanFlags,
    plan: &PlanFlags,
) -> Result<PrepaymentAnalysisInput, Box<dyn std::error::Error>> {
    match load_input(path)? {
        Some(parsed) => Ok(parsed),
        None => analysis_from_flags(loan, plan),
    }
}

fn analysis_from_flags(
    loan: &LoanFlags,
    plan: &PlanFlags,
) -> Result<PrepaymentAnalysisInput, Box<dyn std::error::Error>> {
    Ok(PrepaymentAnalysisInput {
        terms: loan.terms()?,
        plan: PrepaymentPlan {
            annual_limit: plan
                .annual_limit
                .ok_or("--annual-limit is required (or provide --input)")?,
            frequency_months: plan.frequency_months,
            start_period: plan.start_period.unwrap_or(plan.paid_periods + 1),
        },
        paid_periods: plan.paid_periods,
        config: loan.config(),
    })
}

/// Arguments for the current loan position
#[derive(Args)]
pub struct SummaryArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanFlags,

    /// Instalments already paid
    #[arg(long, default_value_t = 0)]
    pub paid_periods: u32,
}

pub fn run_summary(args: SummaryArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let summary_input = match load_input(&args.input)? {
        Some(parsed) => parsed,
        None => LoanSummaryInput {
            terms: args.loan.terms()?,
            paid_periods: args.paid_periods,
            config: args.loan.config(),
        },
    };
    let result = loan_summary(&summary_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a full amortisation schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanFlags,

    /// Periodic prepayment amount
    #[arg(long)]
    pub prepay_amount: Option<Decimal>,

    /// Months between prepayments
    #[arg(long, default_value_t = 12)]
    pub prepay_every: u32,

    /// First period with a prepayment
    #[arg(long, default_value_t = 12)]
    pub prepay_start: u32,

    /// Prepay twice the amount each time
    #[arg(long)]
    pub doubled: bool,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input = match load_input(&args.input)? {
        Some(parsed) => parsed,
        None => {
            let policy = match args.prepay_amount {
                None => PrepaymentPolicy::NoPrepayment,
                Some(amount) if args.doubled => PrepaymentPolicy::PeriodicDoubled {
                    amount,
                    frequency_months: args.prepay_every,
                    start_period: args.prepay_start,
                },
                Some(amount) => PrepaymentPolicy::PeriodicFixed {
                    amount,
                    frequency_months: args.prepay_every,
                    start_period: args.prepay_start,
                },
            };
            ScheduleInput {
                terms: args.loan.terms()?,
                policy,
                config: args.loan.config(),
            }
        }
    };
    let result = generate_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for commands driven by an annual-limit prepayment plan
#[derive(Args)]
pub struct PlanArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanFlags,

    #[command(flatten)]
    pub plan: PlanFlags,
}

pub fn run_scenarios(args: PlanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = analysis_input(&args.input, &args.loan, &args.plan)?;
    let result = analyze_prepayment_scenarios(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare(args: PlanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = analysis_input(&args.input, &args.loan, &args.plan)?;
    let result = compare_prepayment(&input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for chart series across the three prepayment scenarios
#[derive(Args)]
pub struct ChartArgs {
    #[command(flatten)]
    pub plan_args: PlanArgs,

    /// Series to derive: balance or cumulative-interest
    #[arg(long, default_value = "balance")]
    pub series: String,
}

pub fn run_chart(args: ChartArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let kind = match args.series.as_str() {
        "balance" => SeriesKind::Balance,
        "cumulative-interest" | "cumulative_interest" => SeriesKind::CumulativeInterest,
        other => return Err(format!("Unknown series '{}'", other).into()),
    };
    let input = analysis_input(&args.plan_args.input, &args.plan_args.loan, &args.plan_args.plan)?;
    let analysis = analyze_prepayment_scenarios(&input)?;
    let named: Vec<(&str, _)> = analysis
        .result
        .scenarios
        .iter()
        .map(|s| (s.summary.name.as_str(), &s.schedule))
        .collect();
    Ok(serde_json::to_value(chart_data(kind, &named))?)
}

/// Arguments for the scenario workbook
#[derive(Args)]
pub struct ExportArgs {
    /// Path to JSON/YAML input file with `analysis` and optional `decimals`
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanFlags,

    #[command(flatten)]
    pub plan: PlanFlags,

    /// Decimal places for money columns
    #[arg(long, default_value_t = DEFAULT_DECIMALS)]
    pub decimals: u32,

    /// Print only the named sheet's rows (e.g. "Summary")
    #[arg(long)]
    pub sheet: Option<String>,
}

pub fn run_export(args: ExportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let workbook_input = match load_input(&args.input)? {
        Some(parsed) => parsed,
        None => WorkbookInput {
            analysis: analysis_from_flags(&args.loan, &args.plan)?,
            decimals: args.decimals,
        },
    };
    let result = build_workbook(&workbook_input)?;

    if let Some(name) = args.sheet {
        let sheet = result
            .result
            .sheet(&name)
            .ok_or_else(|| format!("No sheet named '{}'", name))?;
        return Ok(serde_json::to_value(&sheet.rows)?);
    }
    Ok(serde_json::to_value(result)?)
}
