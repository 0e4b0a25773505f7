//! Household state: persons, incomes, contributions, retirement settings
//!
//! The household is the unit the scenario composer operates on. It is plain
//! owned data — the composer clones and rebuilds rather than mutating, so a
//! caller's base household stays valid for before/after comparison.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::accounts::{Account, Wrapper};

/// A member of the household
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub date_of_birth: Option<Date>,
    pub retirement_age: u8,
}

/// Annual gross income for one person
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncomeRecord {
    pub person_id: String,
    pub gross_salary: f64,
    pub bonus: f64,
}

impl IncomeRecord {
    pub fn total_gross(&self) -> f64 {
        self.gross_salary + self.bonus
    }
}

/// A recurring annual contribution into one wrapper
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContributionRecord {
    pub id: String,
    pub person_id: String,
    pub wrapper: Wrapper,
    pub annual_amount: f64,
}

/// Household-level retirement assumptions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RetirementConfig {
    /// Net annual spending target in retirement
    pub target_annual_income: f64,
    pub state_pension_annual: f64,
    pub state_pension_age: u8,
    /// Assumed annual real growth rate applied to invested pots
    pub growth_rate: f64,
}

/// Complete household snapshot the engines consume
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Household {
    pub persons: Vec<Person>,
    pub incomes: Vec<IncomeRecord>,
    pub contributions: Vec<ContributionRecord>,
    pub retirement: RetirementConfig,
    pub accounts: Vec<Account>,
}

impl Household {
    /// Sum of all persons' gross income
    pub fn total_gross_income(&self) -> f64 {
        self.incomes.iter().map(|i| i.total_gross()).sum()
    }

    pub fn income_for(&self, person_id: &str) -> Option<&IncomeRecord> {
        self.incomes.iter().find(|i| i.person_id == person_id)
    }

    pub fn contributions_for<'a>(
        &'a self,
        person_id: &'a str,
    ) -> impl Iterator<Item = &'a ContributionRecord> {
        self.contributions
            .iter()
            .filter(move |c| c.person_id == person_id)
    }
}
