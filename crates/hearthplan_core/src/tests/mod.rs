//! Behavioural tests for the calculation core
//!
//! Tests are organized by topic:
//! - `cgt` - HMRC matching rules, pools and tax-year aggregation
//! - `drawdown` - Withdrawal sequencing and strategy comparison
//! - `scenario` - Override composition and savings-rate scaling
//!
//! Module-level unit tests live next to the code they exercise; these
//! modules cover the cross-module properties and the worked end-to-end
//! examples.

mod cgt;
mod scenario;
