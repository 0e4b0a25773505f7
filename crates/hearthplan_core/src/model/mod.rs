mod accounts;
mod household;
mod transactions;

pub use accounts::{Account, AccountPot, Wrapper};
pub use household::{ContributionRecord, Household, IncomeRecord, Person, RetirementConfig};
pub use transactions::{Transaction, TransactionKind};
