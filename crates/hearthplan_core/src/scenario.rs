//! What-if scenario composition
//!
//! Applies a sparse set of hypothetical overrides to a base household,
//! producing a structurally new household for before/after comparison. The
//! composition order is fixed — persons, incomes, contributions, retirement
//! config, then account values — because the market shock and explicit
//! account values interact: the shock is applied to every account first and
//! explicit per-account values win over the shocked result.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TaxConstants;
use crate::model::{ContributionRecord, Household, Wrapper};
use crate::taxes::{PensionMethod, income_tax, national_insurance, take_home_pay};

/// Partial person record, merged by id
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersonOverride {
    pub id: String,
    pub name: Option<String>,
    pub retirement_age: Option<u8>,
}

/// Partial income record, merged by person id
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IncomeOverride {
    pub person_id: String,
    pub gross_salary: Option<f64>,
    pub bonus: Option<f64>,
}

/// Replacement contribution mix for one person. Unlike the other override
/// kinds this is not a merge: the person's existing contribution records
/// are dropped and replaced by one synthetic record per defined, positive
/// value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContributionOverride {
    pub person_id: String,
    pub isa: Option<f64>,
    pub pension: Option<f64>,
    pub gia: Option<f64>,
}

/// Partial retirement config, merged onto the single config object
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct RetirementOverride {
    pub target_annual_income: Option<f64>,
    pub state_pension_annual: Option<f64>,
    pub state_pension_age: Option<u8>,
    pub growth_rate: Option<f64>,
}

/// Absolute replacement value for one account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountValueOverride {
    pub account_id: String,
    pub value: f64,
}

/// A sparse description of a hypothetical household variant
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScenarioOverrides {
    pub persons: Vec<PersonOverride>,
    pub incomes: Vec<IncomeOverride>,
    pub contributions: Vec<ContributionOverride>,
    pub retirement: Option<RetirementOverride>,
    /// Multiplicative shock applied to every account value, in percent
    /// (-30.0 means a 30% fall). Results are floored at zero.
    pub market_shock_percent: Option<f64>,
    /// Explicit values, applied after the shock — these win
    pub account_values: Vec<AccountValueOverride>,
}

/// Apply overrides to a base household, returning a new household. The base
/// is never mutated; callers keep it for the "before" side of comparisons.
pub fn apply_scenario_overrides(base: &Household, overrides: &ScenarioOverrides) -> Household {
    let mut next = base.clone();

    // 1. Person overrides, shallow-merged by id
    for person_override in &overrides.persons {
        if let Some(person) = next.persons.iter_mut().find(|p| p.id == person_override.id) {
            if let Some(name) = &person_override.name {
                person.name = name.clone();
            }
            if let Some(age) = person_override.retirement_age {
                person.retirement_age = age;
            }
        }
    }

    // 2. Income overrides, shallow-merged by person id
    for income_override in &overrides.incomes {
        if let Some(income) = next
            .incomes
            .iter_mut()
            .find(|i| i.person_id == income_override.person_id)
        {
            if let Some(salary) = income_override.gross_salary {
                income.gross_salary = salary;
            }
            if let Some(bonus) = income_override.bonus {
                income.bonus = bonus;
            }
        }
    }

    // 3. Contribution overrides: full replacement per affected person
    for contribution_override in &overrides.contributions {
        let person_id = &contribution_override.person_id;
        next.contributions.retain(|c| &c.person_id != person_id);
        for (wrapper, value) in [
            (Wrapper::Isa, contribution_override.isa),
            (Wrapper::Pension, contribution_override.pension),
            (Wrapper::Gia, contribution_override.gia),
        ] {
            if let Some(amount) = value
                && amount > 0.0
            {
                next.contributions.push(ContributionRecord {
                    id: format!("{person_id}-{wrapper}"),
                    person_id: person_id.clone(),
                    wrapper,
                    annual_amount: amount,
                });
            }
        }
    }

    // 4. Retirement config overrides
    if let Some(retirement_override) = &overrides.retirement {
        if let Some(income) = retirement_override.target_annual_income {
            next.retirement.target_annual_income = income;
        }
        if let Some(pension) = retirement_override.state_pension_annual {
            next.retirement.state_pension_annual = pension;
        }
        if let Some(age) = retirement_override.state_pension_age {
            next.retirement.state_pension_age = age;
        }
        if let Some(rate) = retirement_override.growth_rate {
            next.retirement.growth_rate = rate;
        }
    }

    // 5. Market shock first, floored at zero, then explicit values on top
    if let Some(shock) = overrides.market_shock_percent {
        let multiplier = 1.0 + shock / 100.0;
        for account in &mut next.accounts {
            account.current_value = (account.current_value * multiplier).max(0.0);
        }
    }
    for value_override in &overrides.account_values {
        if let Some(account) = next
            .accounts
            .iter_mut()
            .find(|a| a.id == value_override.account_id)
        {
            account.current_value = value_override.value;
        }
    }

    debug!(
        persons = overrides.persons.len(),
        incomes = overrides.incomes.len(),
        contributions = overrides.contributions.len(),
        shock = overrides.market_shock_percent,
        accounts = overrides.account_values.len(),
        "scenario overrides applied"
    );

    next
}

// ============================================================================
// Savings-rate scaling
// ============================================================================

/// Scale each person's contributions so the household hits a target savings
/// rate, splitting the household target by income share.
///
/// Existing ISA/pension/GIA mixes scale proportionally; ISA contributions
/// are capped at the annual ISA allowance with the excess spilled into GIA.
/// A person with no existing contributions gets a fresh ISA-first
/// allocation. Returns an empty set when household gross income is zero or
/// negative — there is no share to divide.
pub fn scale_savings_rate_contributions(
    household: &Household,
    target_rate_percent: f64,
    constants: &TaxConstants,
) -> Vec<ContributionRecord> {
    let total_gross = household.total_gross_income();
    if total_gross <= 0.0 || !total_gross.is_finite() {
        return Vec::new();
    }
    let rate = (target_rate_percent / 100.0).max(0.0);

    let mut records = Vec::new();
    for person in &household.persons {
        let income = household
            .income_for(&person.id)
            .map(|i| i.total_gross())
            .unwrap_or(0.0);
        // Income share of the household target reduces to rate * income
        let target = income * rate;
        if target <= 0.0 {
            continue;
        }

        let mut existing_isa = 0.0;
        let mut existing_pension = 0.0;
        let mut existing_gia = 0.0;
        for contribution in household.contributions_for(&person.id) {
            match contribution.wrapper {
                Wrapper::Isa => existing_isa += contribution.annual_amount,
                Wrapper::Pension => existing_pension += contribution.annual_amount,
                Wrapper::Gia => existing_gia += contribution.annual_amount,
                Wrapper::Cash => {}
            }
        }
        let existing_total = existing_isa + existing_pension + existing_gia;

        let (mut isa, pension, mut gia) = if existing_total > 0.0 {
            let scale = target / existing_total;
            (
                existing_isa * scale,
                existing_pension * scale,
                existing_gia * scale,
            )
        } else {
            // Fresh allocation: ISA first, remainder to GIA
            (target, 0.0, 0.0)
        };

        // ISA is hard-capped; the excess routes to GIA
        if isa > constants.isa_annual_allowance {
            gia += isa - constants.isa_annual_allowance;
            isa = constants.isa_annual_allowance;
        }

        for (wrapper, amount) in [
            (Wrapper::Isa, isa),
            (Wrapper::Pension, pension),
            (Wrapper::Gia, gia),
        ] {
            if amount > 0.0 {
                records.push(ContributionRecord {
                    id: format!("{}-{wrapper}-target", person.id),
                    person_id: person.id.clone(),
                    wrapper,
                    annual_amount: amount,
                });
            }
        }
    }

    records
}

// ============================================================================
// Tax/NI impact preview
// ============================================================================

/// Effect of changing one person's pension contribution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioImpact {
    pub person_id: String,
    pub current_pension_contribution: f64,
    pub new_pension_contribution: f64,
    /// Change in income tax (negative means less tax)
    pub tax_delta: f64,
    /// Change in National Insurance (negative means less NI)
    pub ni_delta: f64,
    /// Change in annual take-home pay
    pub take_home_delta: f64,
}

/// Preview the marginal tax, NI and take-home effect of moving one
/// person's pension contribution to a new amount. A person with no income
/// record yields an all-zero impact.
pub fn calculate_scenario_impact(
    household: &Household,
    person_id: &str,
    new_pension_contribution: f64,
    method: PensionMethod,
    constants: &TaxConstants,
) -> ScenarioImpact {
    let gross = household
        .income_for(person_id)
        .map(|i| i.total_gross())
        .unwrap_or(0.0);
    let current: f64 = household
        .contributions_for(person_id)
        .filter(|c| c.wrapper == Wrapper::Pension)
        .map(|c| c.annual_amount)
        .sum();
    let proposed = new_pension_contribution.max(0.0);

    if gross <= 0.0 {
        return ScenarioImpact {
            person_id: person_id.to_string(),
            current_pension_contribution: current,
            new_pension_contribution: proposed,
            tax_delta: 0.0,
            ni_delta: 0.0,
            take_home_delta: 0.0,
        };
    }

    let tax_before = income_tax(gross, current, method, constants).tax;
    let tax_after = income_tax(gross, proposed, method, constants).tax;
    let ni_before = national_insurance(gross, current, method, constants);
    let ni_after = national_insurance(gross, proposed, method, constants);
    let take_home_before = take_home_pay(gross, current, method, constants);
    let take_home_after = take_home_pay(gross, proposed, method, constants);

    ScenarioImpact {
        person_id: person_id.to_string(),
        current_pension_contribution: current,
        new_pension_contribution: proposed,
        tax_delta: tax_after - tax_before,
        ni_delta: ni_after - ni_before,
        take_home_delta: take_home_after - take_home_before,
    }
}

// ============================================================================
// Presets
// ============================================================================

/// Build contribution overrides that lift pension contributions just enough
/// to bring each person's adjusted income down to the personal-allowance
/// taper threshold.
///
/// Only persons whose pension-adjusted income sits strictly between the
/// taper threshold and the additional-rate threshold are affected, and the
/// extra contribution is capped by remaining annual-allowance headroom.
pub fn build_avoid_taper_preset(
    household: &Household,
    constants: &TaxConstants,
) -> ScenarioOverrides {
    let mut contributions = Vec::new();

    for person in &household.persons {
        let gross = household
            .income_for(&person.id)
            .map(|i| i.total_gross())
            .unwrap_or(0.0);

        let mut existing_isa = 0.0;
        let mut existing_pension = 0.0;
        let mut existing_gia = 0.0;
        for contribution in household.contributions_for(&person.id) {
            match contribution.wrapper {
                Wrapper::Isa => existing_isa += contribution.annual_amount,
                Wrapper::Pension => existing_pension += contribution.annual_amount,
                Wrapper::Gia => existing_gia += contribution.annual_amount,
                Wrapper::Cash => {}
            }
        }

        let adjusted = gross - existing_pension;
        if adjusted <= constants.taper_threshold
            || adjusted >= constants.additional_rate_threshold
        {
            continue;
        }

        let headroom = (constants.pension_annual_allowance - existing_pension).max(0.0);
        let extra = (adjusted - constants.taper_threshold).min(headroom);
        if extra <= 0.0 {
            continue;
        }

        contributions.push(ContributionOverride {
            person_id: person.id.clone(),
            isa: (existing_isa > 0.0).then_some(existing_isa),
            pension: Some(existing_pension + extra),
            gia: (existing_gia > 0.0).then_some(existing_gia),
        });
    }

    ScenarioOverrides {
        contributions,
        ..ScenarioOverrides::default()
    }
}
