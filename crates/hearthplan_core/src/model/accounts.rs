//! Account and wrapper definitions
//!
//! An account is a container with a tax treatment (its wrapper). The
//! drawdown sequencer does not care about individual accounts, only about
//! the aggregate balance per wrapper, so `AccountPot` collapses a set of
//! account records into four buckets.

use serde::{Deserialize, Serialize};

/// Tax treatment category for an account
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Wrapper {
    /// Defined-contribution pension: 25% tax-free on withdrawal, rest taxed as income
    Pension,
    /// Individual Savings Account: fully tax-free
    Isa,
    /// General Investment Account: taxable, capital gains on disposal
    Gia,
    /// Bank/cash savings: tax-free withdrawal, excluded from growth
    Cash,
}

impl Wrapper {
    pub fn label(self) -> &'static str {
        match self {
            Wrapper::Pension => "pension",
            Wrapper::Isa => "isa",
            Wrapper::Gia => "gia",
            Wrapper::Cash => "cash",
        }
    }
}

impl std::fmt::Display for Wrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// An account record as held by the host application
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: String,
    pub name: String,
    /// Owning person, where one exists (joint/household accounts omit it)
    pub person_id: Option<String>,
    pub wrapper: Wrapper,
    pub current_value: f64,
}

/// Aggregate balance per wrapper, the drawdown simulation's working state
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct AccountPot {
    pub pension: f64,
    pub isa: f64,
    pub gia: f64,
    pub cash: f64,
}

impl AccountPot {
    /// Bucket a set of account records by wrapper. Non-finite values are
    /// treated as zero so one bad record cannot poison the simulation.
    pub fn from_accounts(accounts: &[Account]) -> Self {
        let mut pot = AccountPot::default();
        for account in accounts {
            let value = if account.current_value.is_finite() {
                account.current_value.max(0.0)
            } else {
                0.0
            };
            match account.wrapper {
                Wrapper::Pension => pot.pension += value,
                Wrapper::Isa => pot.isa += value,
                Wrapper::Gia => pot.gia += value,
                Wrapper::Cash => pot.cash += value,
            }
        }
        pot
    }

    pub fn total(&self) -> f64 {
        self.pension + self.isa + self.gia + self.cash
    }

    pub fn get(&self, wrapper: Wrapper) -> f64 {
        match wrapper {
            Wrapper::Pension => self.pension,
            Wrapper::Isa => self.isa,
            Wrapper::Gia => self.gia,
            Wrapper::Cash => self.cash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: &str, wrapper: Wrapper, value: f64) -> Account {
        Account {
            id: id.to_string(),
            name: id.to_string(),
            person_id: None,
            wrapper,
            current_value: value,
        }
    }

    #[test]
    fn test_from_accounts_buckets_by_wrapper() {
        let accounts = vec![
            account("a", Wrapper::Pension, 100_000.0),
            account("b", Wrapper::Isa, 40_000.0),
            account("c", Wrapper::Isa, 10_000.0),
            account("d", Wrapper::Gia, 25_000.0),
            account("e", Wrapper::Cash, 5_000.0),
        ];
        let pot = AccountPot::from_accounts(&accounts);
        assert!((pot.pension - 100_000.0).abs() < 1e-9);
        assert!((pot.isa - 50_000.0).abs() < 1e-9);
        assert!((pot.gia - 25_000.0).abs() < 1e-9);
        assert!((pot.cash - 5_000.0).abs() < 1e-9);
        assert!((pot.total() - 180_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_accounts_sanitises_bad_values() {
        let accounts = vec![
            account("a", Wrapper::Isa, f64::NAN),
            account("b", Wrapper::Gia, f64::INFINITY),
            account("c", Wrapper::Cash, -500.0),
        ];
        let pot = AccountPot::from_accounts(&accounts);
        assert_eq!(pot.total(), 0.0);
    }
}
