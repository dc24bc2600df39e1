use mortgage_core::amortization::comparison::{compare_prepayment, compare_schedules};
use mortgage_core::amortization::policy::{
    LumpPrepayment, PrepaymentAnalysisInput, PrepaymentPlan, PrepaymentPolicy,
};
use mortgage_core::amortization::schedule::{
    amortize, generate_schedule, EngineConfig, LoanTerms, PrepaymentTiming, ScheduleInput,
};
use mortgage_core::amortization::series::{chart_data, SeriesKind};
use mortgage_core::time_value::RateConvention;
use mortgage_core::MortgageError;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn loan(principal: Decimal, rate_pct: Decimal, periods: u32) -> LoanTerms {
    LoanTerms {
        principal,
        annual_rate_pct: rate_pct,
        total_periods: periods,
        start_date: None,
    }
}

fn lump_at_six() -> PrepaymentPolicy {
    PrepaymentPolicy::Lump {
        payments: vec![LumpPrepayment {
            period: 6,
            amount: dec!(100),
        }],
    }
}

// ===========================================================================
// Known loans
// ===========================================================================

#[test]
fn test_thousand_over_a_year_effective() {
    let out = generate_schedule(&ScheduleInput {
        terms: loan(dec!(1000), dec!(6), 12),
        policy: PrepaymentPolicy::NoPrepayment,
        config: EngineConfig::default(),
    })
    .unwrap();
    let s = out.result;
    assert!((s.periodic_rate - dec!(0.004868)).abs() < dec!(0.000001));
    assert!((s.initial_payment - dec!(85.99)).abs() < dec!(0.01));
    assert_eq!(s.final_period_count, 12);
    assert!((s.total_interest - dec!(31.92)).abs() < dec!(0.01));
    assert!(out.warnings.is_empty());
}

#[test]
fn test_thousand_over_a_year_nominal() {
    let cfg = EngineConfig {
        rate_convention: RateConvention::Nominal,
        ..EngineConfig::default()
    };
    let s = amortize(&loan(dec!(1000), dec!(6), 12), &cfg, &PrepaymentPolicy::NoPrepayment);
    assert!((s.initial_payment - dec!(86.07)).abs() < dec!(0.01));
    assert!((s.total_interest - dec!(32.80)).abs() < dec!(0.01));
}

#[test]
fn test_lump_prepayment_under_both_recompute_policies() {
    let terms = loan(dec!(1000), dec!(6), 12);
    let baseline = amortize(&terms, &EngineConfig::default(), &PrepaymentPolicy::NoPrepayment);

    let recast = amortize(&terms, &EngineConfig::default(), &lump_at_six());
    assert_eq!(recast.final_period_count, 12);
    assert!(recast.periods[6].scheduled_payment < recast.periods[4].scheduled_payment);
    assert!(recast.total_interest < baseline.total_interest);

    let fixed_cfg = EngineConfig {
        recompute_on_prepayment: false,
        ..EngineConfig::default()
    };
    let fixed = amortize(&terms, &fixed_cfg, &lump_at_six());
    assert!(fixed.final_period_count < 12);
    assert_eq!(fixed.periods[6].scheduled_payment, fixed.initial_payment);
    assert!(fixed.total_interest < baseline.total_interest);
}

#[test]
fn test_prepayment_timing_conventions_differ() {
    let terms = loan(dec!(1000), dec!(6), 12);
    let end = amortize(&terms, &EngineConfig::default(), &lump_at_six());
    let start = amortize(
        &terms,
        &EngineConfig {
            prepayment_timing: PrepaymentTiming::StartOfPeriod,
            ..EngineConfig::default()
        },
        &lump_at_six(),
    );
    // Paying before interest accrues saves one period's interest on the lump.
    assert!(start.total_interest < end.total_interest);
    assert!(start.periods[5].interest < end.periods[5].interest);
    assert_eq!(start.total_prepaid, end.total_prepaid);
}

#[test]
fn test_prepayment_near_payoff_is_clamped() {
    let terms = loan(dec!(1000), dec!(6), 12);
    let rule = |period: u32, _balance: Decimal| {
        if period == 11 {
            dec!(500)
        } else {
            Decimal::ZERO
        }
    };
    let out = generate_schedule(&ScheduleInput {
        terms: terms.clone(),
        policy: PrepaymentPolicy::Lump {
            payments: vec![LumpPrepayment {
                period: 11,
                amount: dec!(500),
            }],
        },
        config: EngineConfig::default(),
    })
    .unwrap();
    let s = amortize(&terms, &EngineConfig::default(), &rule);
    assert_eq!(s, out.result);
    assert_eq!(s.final_period_count, 11);
    assert_eq!(s.periods[10].ending_balance, Decimal::ZERO);
    assert!(s.periods[10].prepayment < dec!(500));
    assert!(out.warnings.iter().any(|w| w.contains("clamped")));
}

#[test]
fn test_zero_rate_is_straight_line() {
    let s = amortize(
        &loan(dec!(1200), Decimal::ZERO, 24),
        &EngineConfig::default(),
        &PrepaymentPolicy::NoPrepayment,
    );
    assert_eq!(s.initial_payment, dec!(50));
    assert_eq!(s.total_interest, Decimal::ZERO);
    assert_eq!(s.final_period_count, 24);
}

#[test]
fn test_invalid_inputs_rejected() {
    let bad = |terms: LoanTerms| {
        generate_schedule(&ScheduleInput {
            terms,
            policy: PrepaymentPolicy::NoPrepayment,
            config: EngineConfig::default(),
        })
    };
    assert!(matches!(
        bad(loan(Decimal::ZERO, dec!(5), 12)),
        Err(MortgageError::InvalidInput { .. })
    ));
    assert!(bad(loan(dec!(1000), dec!(-1), 12)).is_err());
    assert!(bad(loan(dec!(1000), dec!(5), 0)).is_err());
    assert!(matches!(
        bad(loan(dec!(1000), dec!(5), u32::MAX)),
        Err(MortgageError::InvalidInput { .. })
    ));
}

#[test]
fn test_schedule_input_from_json() {
    let json = r#"{
        "terms": {"principal": "1000", "annual_rate_pct": "6", "total_periods": 12},
        "policy": {"kind": "lump", "payments": [{"period": 6, "amount": "100"}]},
        "config": {"recompute_on_prepayment": false}
    }"#;
    let input: ScheduleInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.policy, lump_at_six());
    assert_eq!(input.config.rate_convention, RateConvention::Effective);
    let s = generate_schedule(&input).unwrap().result;
    assert_eq!(s.final_period_count, 11);
}

// ===========================================================================
// Comparison and charts
// ===========================================================================

#[test]
fn test_comparison_matches_schedules() {
    let input = PrepaymentAnalysisInput {
        terms: loan(dec!(2000), dec!(4.5), 240),
        plan: PrepaymentPlan {
            annual_limit: dec!(120),
            frequency_months: 12,
            start_period: 12,
        },
        paid_periods: 0,
        config: EngineConfig {
            recompute_on_prepayment: false,
            ..EngineConfig::default()
        },
    };
    let out = compare_prepayment(&input).unwrap().result;
    let recomputed = compare_schedules(&out.baseline, &out.with_prepayment);
    assert_eq!(out.summary, recomputed);
    assert!(out.summary.periods_saved > 0);
    assert!(out.summary.interest_saved > Decimal::ZERO);

    let chart = chart_data(
        SeriesKind::Balance,
        &[("Baseline", &out.baseline), ("Prepaid", &out.with_prepayment)],
    );
    assert_eq!(chart.periods.len(), 240);
    let padded = chart.series[1].values.iter().filter(|v| v.is_none()).count();
    assert_eq!(padded as i64, out.summary.periods_saved);
}

#[test]
fn test_generation_is_idempotent() {
    let input = ScheduleInput {
        terms: loan(dec!(350000), dec!(3.9), 300),
        policy: PrepaymentPolicy::PeriodicDoubled {
            amount: dec!(2500),
            frequency_months: 6,
            start_period: 24,
        },
        config: EngineConfig::default(),
    };
    let a = generate_schedule(&input).unwrap().result;
    let b = generate_schedule(&input).unwrap().result;
    assert_eq!(a, b);
}

// ===========================================================================
// Properties
// ===========================================================================

fn terms_strategy() -> impl Strategy<Value = LoanTerms> {
    (1_000u32..500_000, 0u32..1_200, 1u32..361).prop_map(|(p, bp, n)| {
        loan(Decimal::from(p), Decimal::new(i64::from(bp), 2), n)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_principal_repaid_without_prepayment(terms in terms_strategy(), nominal in any::<bool>()) {
        let cfg = EngineConfig {
            rate_convention: if nominal { RateConvention::Nominal } else { RateConvention::Effective },
            ..EngineConfig::default()
        };
        let s = amortize(&terms, &cfg, &PrepaymentPolicy::NoPrepayment);
        let repaid: Decimal = s.periods.iter().map(|p| p.principal).sum();
        prop_assert!((repaid - terms.principal).abs() < dec!(0.000001));
        prop_assert!(s.final_period_count <= terms.total_periods);
    }

    #[test]
    fn prop_balance_never_negative_or_rising(
        terms in terms_strategy(),
        amount in 0u32..20_000,
        freq in prop::sample::select(vec![1u32, 3, 6, 12]),
        recompute in any::<bool>(),
        start_timing in any::<bool>(),
    ) {
        let cfg = EngineConfig {
            recompute_on_prepayment: recompute,
            prepayment_timing: if start_timing {
                PrepaymentTiming::StartOfPeriod
            } else {
                PrepaymentTiming::EndOfPeriod
            },
            ..EngineConfig::default()
        };
        let policy = PrepaymentPolicy::PeriodicFixed {
            amount: Decimal::from(amount),
            frequency_months: freq,
            start_period: 1,
        };
        let s = amortize(&terms, &cfg, &policy);
        let mut previous = terms.principal;
        for p in &s.periods {
            prop_assert!(p.ending_balance >= Decimal::ZERO);
            prop_assert!(p.ending_balance <= previous);
            prop_assert!(p.prepayment >= Decimal::ZERO);
            prop_assert!(p.interest >= Decimal::ZERO);
            previous = p.ending_balance;
        }
        prop_assert!(s.final_period_count <= terms.total_periods);
    }

    #[test]
    fn prop_more_prepayment_never_hurts(
        terms in terms_strategy(),
        low in 0u32..5_000,
        extra in 0u32..5_000,
        freq in prop::sample::select(vec![1u32, 6, 12]),
        recompute in any::<bool>(),
        start_timing in any::<bool>(),
        nominal in any::<bool>(),
    ) {
        let cfg = EngineConfig {
            rate_convention: if nominal { RateConvention::Nominal } else { RateConvention::Effective },
            recompute_on_prepayment: recompute,
            prepayment_timing: if start_timing {
                PrepaymentTiming::StartOfPeriod
            } else {
                PrepaymentTiming::EndOfPeriod
            },
            ..EngineConfig::default()
        };
        let policy = |amount: u32| PrepaymentPolicy::PeriodicFixed {
            amount: Decimal::from(amount),
            frequency_months: freq,
            start_period: 1,
        };
        let a = amortize(&terms, &cfg, &policy(low));
        let b = amortize(&terms, &cfg, &policy(low + extra));
        prop_assert!(b.final_period_count <= a.final_period_count);
        prop_assert!(b.total_interest <= a.total_interest);
    }
}
