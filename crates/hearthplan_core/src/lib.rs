//! UK household finance calculation core
//!
//! This crate is the calculation engine behind a personal finance planner:
//! - Capital gains tax with HMRC share matching (same-day, bed & breakfast,
//!   Section 104 pooling) over an immutable transaction history
//! - Tax-aware retirement drawdown sequencing across pension/ISA/GIA/cash
//!   pots, with a strategy comparison for the "tax saved by ordering" figure
//! - What-if scenario composition: sparse overrides applied to a household
//!   snapshot without mutating the original
//!
//! Everything here is pure, synchronous computation over plain data:
//! identical inputs always produce identical outputs, no function mutates
//! its arguments, and structurally valid input never panics. Presentation,
//! persistence and data entry belong to the host application.
//!
//! # Builder DSL
//!
//! Use the fluent builder API for ergonomic input setup:
//!
//! ```ignore
//! use hearthplan_core::config::DrawdownBuilder;
//! use hearthplan_core::drawdown::compare_strategies;
//!
//! let params = DrawdownBuilder::new()
//!     .pension(600_000.0)
//!     .isa(200_000.0)
//!     .gia(150_000.0)
//!     .cash(50_000.0)
//!     .annual_need(40_000.0)
//!     .state_pension(11_500.0, 67)
//!     .ages(60, 95)
//!     .build()?;
//!
//! let comparison = compare_strategies(&params);
//! println!("sequencing saves £{:.0}", comparison.tax_saved);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod cgt;
pub mod drawdown;
pub mod error;
pub mod scenario;
pub mod tax_year;
pub mod taxes;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use cgt::{compute_disposals, tax_year_gains, unrealised_gains};
pub use config::{DrawdownBuilder, HouseholdBuilder, TaxConstants};
pub use drawdown::{compare_strategies, simulate_drawdown};
pub use scenario::{
    apply_scenario_overrides, build_avoid_taper_preset, calculate_scenario_impact,
    scale_savings_rate_contributions,
};
pub use tax_year::TaxYear;
