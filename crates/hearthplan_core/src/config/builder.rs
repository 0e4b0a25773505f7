//! Fluent builders for simulation inputs and household fixtures

use crate::config::TaxConstants;
use crate::drawdown::{DrawdownParams, Strategy};
use crate::error::BuildError;
use crate::model::{
    Account, AccountPot, ContributionRecord, Household, IncomeRecord, Person, RetirementConfig,
    Wrapper,
};

/// Builder for [`DrawdownParams`] with sensible defaults: zero pots, ages
/// 60–95, no state pension, latest tax constants, tax-optimal strategy.
#[derive(Debug, Clone)]
pub struct DrawdownBuilder {
    pots: AccountPot,
    annual_need: f64,
    state_pension_annual: f64,
    state_pension_age: u8,
    start_age: u8,
    end_age: u8,
    growth_rate: f64,
    strategy: Strategy,
    constants: TaxConstants,
}

impl Default for DrawdownBuilder {
    fn default() -> Self {
        DrawdownBuilder {
            pots: AccountPot::default(),
            annual_need: 0.0,
            state_pension_annual: 0.0,
            state_pension_age: 67,
            start_age: 60,
            end_age: 95,
            growth_rate: 0.0,
            strategy: Strategy::TaxOptimal,
            constants: TaxConstants::latest(),
        }
    }
}

impl DrawdownBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pots(mut self, pots: AccountPot) -> Self {
        self.pots = pots;
        self
    }

    pub fn pension(mut self, value: f64) -> Self {
        self.pots.pension = value;
        self
    }

    pub fn isa(mut self, value: f64) -> Self {
        self.pots.isa = value;
        self
    }

    pub fn gia(mut self, value: f64) -> Self {
        self.pots.gia = value;
        self
    }

    pub fn cash(mut self, value: f64) -> Self {
        self.pots.cash = value;
        self
    }

    pub fn annual_need(mut self, value: f64) -> Self {
        self.annual_need = value;
        self
    }

    pub fn state_pension(mut self, annual: f64, from_age: u8) -> Self {
        self.state_pension_annual = annual;
        self.state_pension_age = from_age;
        self
    }

    pub fn ages(mut self, start: u8, end: u8) -> Self {
        self.start_age = start;
        self.end_age = end;
        self
    }

    pub fn growth_rate(mut self, rate: f64) -> Self {
        self.growth_rate = rate;
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn constants(mut self, constants: TaxConstants) -> Self {
        self.constants = constants;
        self
    }

    pub fn build(self) -> Result<DrawdownParams, BuildError> {
        if self.end_age < self.start_age {
            return Err(BuildError::InvalidAgeRange {
                start: self.start_age,
                end: self.end_age,
            });
        }
        for (field, value) in [
            ("pension pot", self.pots.pension),
            ("isa pot", self.pots.isa),
            ("gia pot", self.pots.gia),
            ("cash pot", self.pots.cash),
            ("annual need", self.annual_need),
            ("state pension", self.state_pension_annual),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(BuildError::InvalidAmount { field, value });
            }
        }

        Ok(DrawdownParams {
            pots: self.pots,
            annual_need: self.annual_need,
            state_pension_annual: self.state_pension_annual,
            state_pension_age: self.state_pension_age,
            start_age: self.start_age,
            end_age: self.end_age,
            growth_rate: self.growth_rate,
            strategy: self.strategy,
            constants: self.constants,
        })
    }
}

/// Builder for [`Household`] values, mostly useful in tests and host-side
/// fixture setup.
#[derive(Debug, Clone, Default)]
pub struct HouseholdBuilder {
    persons: Vec<Person>,
    incomes: Vec<IncomeRecord>,
    contributions: Vec<ContributionRecord>,
    retirement: Option<RetirementConfig>,
    accounts: Vec<Account>,
}

impl HouseholdBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn person(mut self, id: &str, name: &str, retirement_age: u8) -> Self {
        self.persons.push(Person {
            id: id.to_string(),
            name: name.to_string(),
            date_of_birth: None,
            retirement_age,
        });
        self
    }

    pub fn income(mut self, person_id: &str, gross_salary: f64) -> Self {
        self.incomes.push(IncomeRecord {
            person_id: person_id.to_string(),
            gross_salary,
            bonus: 0.0,
        });
        self
    }

    pub fn income_with_bonus(mut self, person_id: &str, gross_salary: f64, bonus: f64) -> Self {
        self.incomes.push(IncomeRecord {
            person_id: person_id.to_string(),
            gross_salary,
            bonus,
        });
        self
    }

    pub fn contribution(mut self, person_id: &str, wrapper: Wrapper, annual_amount: f64) -> Self {
        let id = format!("{person_id}-{wrapper}-{}", self.contributions.len());
        self.contributions.push(ContributionRecord {
            id,
            person_id: person_id.to_string(),
            wrapper,
            annual_amount,
        });
        self
    }

    pub fn account(mut self, id: &str, wrapper: Wrapper, current_value: f64) -> Self {
        self.accounts.push(Account {
            id: id.to_string(),
            name: id.to_string(),
            person_id: None,
            wrapper,
            current_value,
        });
        self
    }

    pub fn retirement(mut self, config: RetirementConfig) -> Self {
        self.retirement = Some(config);
        self
    }

    pub fn build(self) -> Household {
        Household {
            persons: self.persons,
            incomes: self.incomes,
            contributions: self.contributions,
            retirement: self.retirement.unwrap_or(RetirementConfig {
                target_annual_income: 0.0,
                state_pension_annual: 0.0,
                state_pension_age: 67,
                growth_rate: 0.0,
            }),
            accounts: self.accounts,
        }
    }
}
