//! Scenario composition driving the other engines

use crate::config::{DrawdownBuilder, HouseholdBuilder, TaxConstants};
use crate::drawdown::simulate_drawdown;
use crate::model::{AccountPot, RetirementConfig, Wrapper};
use crate::scenario::{
    AccountValueOverride, RetirementOverride, ScenarioOverrides, apply_scenario_overrides,
};
use crate::tax_year::TaxYear;

fn household() -> crate::model::Household {
    HouseholdBuilder::new()
        .person("p1", "Alex", 65)
        .person("p2", "Sam", 67)
        .income("p1", 80_000.0)
        .income("p2", 45_000.0)
        .contribution("p1", Wrapper::Isa, 10_000.0)
        .contribution("p2", Wrapper::Pension, 6_000.0)
        .account("pension-1", Wrapper::Pension, 400_000.0)
        .account("isa-1", Wrapper::Isa, 150_000.0)
        .account("gia-1", Wrapper::Gia, 100_000.0)
        .account("cash-1", Wrapper::Cash, 30_000.0)
        .retirement(RetirementConfig {
            target_annual_income: 40_000.0,
            state_pension_annual: 11_500.0,
            state_pension_age: 67,
            growth_rate: 0.04,
        })
        .build()
}

#[test]
fn test_shocked_household_feeds_drawdown() {
    // Compose a -25% crash scenario, rebuild the pots, and re-run the
    // sequencer against them — the full "what if markets fall" flow
    let base = household();
    let overrides = ScenarioOverrides {
        market_shock_percent: Some(-25.0),
        ..ScenarioOverrides::default()
    };
    let shocked = apply_scenario_overrides(&base, &overrides);

    let base_pots = AccountPot::from_accounts(&base.accounts);
    let shocked_pots = AccountPot::from_accounts(&shocked.accounts);
    assert!((base_pots.total() - 680_000.0).abs() < 1e-9);
    assert!((shocked_pots.total() - 510_000.0).abs() < 1e-9);

    let run = |pots: AccountPot| {
        simulate_drawdown(
            &DrawdownBuilder::new()
                .pots(pots)
                .annual_need(base.retirement.target_annual_income)
                .state_pension(
                    base.retirement.state_pension_annual,
                    base.retirement.state_pension_age,
                )
                .ages(60, 95)
                .constants(TaxConstants::for_year(TaxYear(2024)))
                .build()
                .unwrap(),
        )
    };
    let base_plan = run(base_pots);
    let shocked_plan = run(shocked_pots);

    match (shocked_plan.exhaustion_age, base_plan.exhaustion_age) {
        (Some(shocked_age), Some(base_age)) => assert!(shocked_age <= base_age),
        (Some(_), None) => {} // shock introduced exhaustion
        (None, Some(base_age)) => {
            panic!("shocked pots outlasted base pots that exhausted at {base_age}")
        }
        (None, None) => {}
    }
}

#[test]
fn test_retirement_override_changes_drawdown_inputs() {
    let base = household();
    let overrides = ScenarioOverrides {
        retirement: Some(RetirementOverride {
            target_annual_income: Some(50_000.0),
            growth_rate: Some(0.02),
            ..RetirementOverride::default()
        }),
        ..ScenarioOverrides::default()
    };
    let result = apply_scenario_overrides(&base, &overrides);
    assert!((result.retirement.target_annual_income - 50_000.0).abs() < 1e-9);
    assert!((result.retirement.growth_rate - 0.02).abs() < 1e-9);
    // Untouched fields pass through
    assert_eq!(result.retirement.state_pension_age, 67);
}

#[test]
fn test_composition_order_shock_then_explicit_values() {
    let base = household();
    let overrides = ScenarioOverrides {
        market_shock_percent: Some(-50.0),
        account_values: vec![AccountValueOverride {
            account_id: "isa-1".to_string(),
            value: 150_000.0, // pinned back to its pre-shock value
        }],
        ..ScenarioOverrides::default()
    };
    let result = apply_scenario_overrides(&base, &overrides);
    let value = |id: &str| {
        result
            .accounts
            .iter()
            .find(|a| a.id == id)
            .unwrap()
            .current_value
    };
    assert!((value("isa-1") - 150_000.0).abs() < 1e-9, "explicit value wins");
    assert!((value("pension-1") - 200_000.0).abs() < 1e-9, "others take the shock");
    assert!((value("cash-1") - 15_000.0).abs() < 1e-9);
}

#[test]
fn test_unknown_override_targets_are_ignored() {
    let base = household();
    let snapshot = base.clone();
    let overrides = ScenarioOverrides {
        account_values: vec![AccountValueOverride {
            account_id: "missing".to_string(),
            value: 1.0,
        }],
        ..ScenarioOverrides::default()
    };
    let result = apply_scenario_overrides(&base, &overrides);
    assert_eq!(result, snapshot, "unknown ids change nothing");
}

#[test]
fn test_repeat_application_is_deterministic() {
    let base = household();
    let overrides = ScenarioOverrides {
        market_shock_percent: Some(-10.0),
        ..ScenarioOverrides::default()
    };
    let first = apply_scenario_overrides(&base, &overrides);
    let second = apply_scenario_overrides(&base, &overrides);
    assert_eq!(first, second);
}
