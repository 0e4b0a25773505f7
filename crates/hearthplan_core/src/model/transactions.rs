//! Transaction history records
//!
//! Transactions are the immutable audit trail the CGT engine works from.
//! They are appended (or removed wholesale) by the host application and
//! never mutated; every pool and disposal figure is recomputed from the
//! ordered history on each query.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// What a transaction did
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Purchase of fund units
    Buy,
    /// Disposal of fund units
    Sell,
    /// Cash dividend — no effect on unit holdings or pools
    Dividend,
    /// Cash paid into the account — no units involved
    Contribution,
}

impl TransactionKind {
    /// Whether this transaction adds units that disposal matching can use
    pub fn is_acquisition(self) -> bool {
        matches!(self, TransactionKind::Buy)
    }

    /// Whether this transaction disposes of units
    pub fn is_disposal(self) -> bool {
        matches!(self, TransactionKind::Sell)
    }
}

/// A single buy/sell/dividend/contribution event tied to an account and fund
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    pub fund_id: String,
    pub date: Date,
    pub kind: TransactionKind,
    /// Number of units bought or sold; zero for cash-only events
    pub units: f64,
    /// Price per unit at the time of the event
    pub price: f64,
    /// Total cash amount of the event (units * price for trades)
    pub amount: f64,
}

impl Transaction {
    /// Total cash value of the event (cost for a buy, proceeds for a sell),
    /// falling back to units * price when the recorded amount is missing or
    /// non-finite.
    pub fn total_amount(&self) -> f64 {
        if self.amount.is_finite() && self.amount > 0.0 {
            self.amount
        } else {
            self.units * self.price
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_amount_prefers_amount() {
        let tx = Transaction {
            id: "t1".to_string(),
            account_id: "a1".to_string(),
            fund_id: "f1".to_string(),
            date: jiff::civil::date(2024, 5, 1),
            kind: TransactionKind::Buy,
            units: 100.0,
            price: 10.0,
            amount: 1_005.0, // includes dealing charge
        };
        assert!((tx.total_amount() - 1_005.0).abs() < 1e-9);
    }

    #[test]
    fn test_total_amount_falls_back_to_units_price() {
        let tx = Transaction {
            id: "t1".to_string(),
            account_id: "a1".to_string(),
            fund_id: "f1".to_string(),
            date: jiff::civil::date(2024, 5, 1),
            kind: TransactionKind::Buy,
            units: 100.0,
            price: 10.0,
            amount: f64::NAN,
        };
        assert!((tx.total_amount() - 1_000.0).abs() < 1e-9);
    }
}
