use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use mortgage_core::strategy::comparison::{debt_by_year, net_worth_by_year, simulate_strategies};
use mortgage_core::strategy::simulator::StrategyInput;
use mortgage_core::time_value::RateConvention;

use super::load_input;

/// Arguments for the mortgage-vs-investment strategy comparison
#[derive(Args)]
pub struct StrategiesArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Outstanding mortgage
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual mortgage rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Years left on the mortgage
    #[arg(long)]
    pub loan_years: Option<u32>,

    /// Current property value
    #[arg(long)]
    pub property_value: Option<Decimal>,

    /// Annual property appreciation in percent
    #[arg(long, default_value_t = dec!(2))]
    pub appreciation: Decimal,

    /// Monthly amount available, in the contribution currency
    #[arg(long)]
    pub contribution: Option<Decimal>,

    /// Contribution currency units per loan currency unit
    #[arg(long, default_value_t = Decimal::ONE)]
    pub exchange_rate: Decimal,

    /// Yearly side income in loan currency
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub side_income: Decimal,

    /// Expected annual equity return in percent
    #[arg(long, default_value_t = dec!(10))]
    pub equity_return: Decimal,

    /// Projection horizon in years
    #[arg(long, default_value_t = 8)]
    pub horizon: u32,

    /// Lump prepayment as a percent of the original principal
    #[arg(long, default_value_t = dec!(5))]
    pub prepayment_pct: Decimal,

    /// Years between lump prepayments
    #[arg(long, default_value_t = 3)]
    pub prepayment_every: u32,

    /// Use the effective monthly rate instead of rate / 12
    #[arg(long)]
    pub effective: bool,

    /// Print one table of this metric by year instead of the full result
    /// (net-worth or debt)
    #[arg(long)]
    pub by_year: Option<String>,
}

pub fn run_strategies(args: StrategiesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let strategy_input: StrategyInput = match load_input(&args.input)? {
        Some(parsed) => parsed,
        None => StrategyInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_pct: args.rate.ok_or("--rate is required (or provide --input)")?,
            loan_years: args
                .loan_years
                .ok_or("--loan-years is required (or provide --input)")?,
            property_value: args
                .property_value
                .ok_or("--property-value is required (or provide --input)")?,
            property_appreciation_pct: args.appreciation,
            monthly_contribution: args
                .contribution
                .ok_or("--contribution is required (or provide --input)")?,
            exchange_rate: args.exchange_rate,
            annual_side_income: args.side_income,
            equity_return_pct: args.equity_return,
            horizon_years: args.horizon,
            prepayment_pct: args.prepayment_pct,
            prepayment_frequency_years: args.prepayment_every,
            aggressive_prepay_fraction: dec!(0.6),
            penalty_multiplier: dec!(1.5),
            rate_convention: if args.effective {
                RateConvention::Effective
            } else {
                RateConvention::Nominal
            },
        },
    };

    let result = simulate_strategies(&strategy_input)?;

    match args.by_year.as_deref() {
        None => Ok(serde_json::to_value(result)?),
        Some("net-worth") | Some("net_worth") => {
            Ok(serde_json::to_value(net_worth_by_year(&result.result.outcomes))?)
        }
        Some("debt") => Ok(serde_json::to_value(debt_by_year(&result.result.outcomes))?),
        Some(other) => Err(format!("Unknown --by-year table '{}'", other).into()),
    }
}
