//! Tax constants and input builders
//!
//! `TaxConstants` is the versioned table of UK thresholds the engines read
//! as configuration. The engines never hard-code a threshold inline; the
//! deliberate modelling simplifications (the drawdown sequencer's flat 50%
//! GIA gain assumption and the 25%/75% pension split) are the only baked-in
//! numbers, and those live with the code that owns them.
//!
//! # Builder DSL
//!
//! For ergonomic input construction, use the fluent builders:
//!
//! ```ignore
//! use hearthplan_core::config::DrawdownBuilder;
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
//! ```

use serde::{Deserialize, Serialize};

use crate::tax_year::TaxYear;

mod builder;

pub use builder::{DrawdownBuilder, HouseholdBuilder};

/// One UK tax year's worth of thresholds and rates.
///
/// Monetary fields are annual GBP amounts; rate fields are fractions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TaxConstants {
    /// Standard personal allowance before tapering
    pub personal_allowance: f64,
    /// Width of the basic-rate band above the personal allowance
    pub basic_rate_band: f64,
    /// Income level where the additional rate begins
    pub additional_rate_threshold: f64,
    /// Adjusted income level above which the personal allowance tapers away
    pub taper_threshold: f64,
    pub basic_rate: f64,
    pub higher_rate: f64,
    pub additional_rate: f64,

    /// NI primary threshold (annualised)
    pub ni_primary_threshold: f64,
    /// NI upper earnings limit (annualised)
    pub ni_upper_limit: f64,
    pub ni_main_rate: f64,
    pub ni_upper_rate: f64,

    /// CGT annual exempt amount
    pub cgt_annual_exemption: f64,
    pub cgt_basic_rate: f64,
    pub cgt_higher_rate: f64,

    pub isa_annual_allowance: f64,
    pub pension_annual_allowance: f64,
    /// Full new state pension for the year
    pub state_pension_annual: f64,
}

impl TaxConstants {
    /// Upper limit of the basic-rate band — the income level where higher
    /// rate tax (and higher-rate CGT) starts.
    pub fn basic_rate_upper(&self) -> f64 {
        self.personal_allowance + self.basic_rate_band
    }

    /// Constants for a given tax year. Years outside the table clamp to the
    /// nearest known entry, so the lookup never fails.
    pub fn for_year(year: TaxYear) -> TaxConstants {
        match TABLE.binary_search_by_key(&year.0, |(y, _)| *y) {
            Ok(i) => TABLE[i].1,
            Err(0) => TABLE[0].1,
            Err(i) => TABLE[i - 1].1,
        }
    }

    /// Most recent tax year in the table
    pub fn latest() -> TaxConstants {
        TABLE[TABLE.len() - 1].1
    }
}

impl Default for TaxConstants {
    fn default() -> Self {
        TaxConstants::latest()
    }
}

/// Known tax years, ascending. The income tax and NI figures are the
/// rUK (non-Scottish) rates.
const TABLE: &[(i16, TaxConstants)] = &[
    (
        2023,
        TaxConstants {
            personal_allowance: 12_570.0,
            basic_rate_band: 37_700.0,
            additional_rate_threshold: 125_140.0,
            taper_threshold: 100_000.0,
            basic_rate: 0.20,
            higher_rate: 0.40,
            additional_rate: 0.45,
            ni_primary_threshold: 12_570.0,
            ni_upper_limit: 50_270.0,
            ni_main_rate: 0.10,
            ni_upper_rate: 0.02,
            cgt_annual_exemption: 6_000.0,
            cgt_basic_rate: 0.10,
            cgt_higher_rate: 0.20,
            isa_annual_allowance: 20_000.0,
            pension_annual_allowance: 60_000.0,
            state_pension_annual: 10_600.0,
        },
    ),
    (
        2024,
        TaxConstants {
            personal_allowance: 12_570.0,
            basic_rate_band: 37_700.0,
            additional_rate_threshold: 125_140.0,
            taper_threshold: 100_000.0,
            basic_rate: 0.20,
            higher_rate: 0.40,
            additional_rate: 0.45,
            ni_primary_threshold: 12_570.0,
            ni_upper_limit: 50_270.0,
            ni_main_rate: 0.08,
            ni_upper_rate: 0.02,
            cgt_annual_exemption: 3_000.0,
            cgt_basic_rate: 0.10,
            cgt_higher_rate: 0.20,
            isa_annual_allowance: 20_000.0,
            pension_annual_allowance: 60_000.0,
            state_pension_annual: 11_502.0,
        },
    ),
    (
        2025,
        TaxConstants {
            personal_allowance: 12_570.0,
            basic_rate_band: 37_700.0,
            additional_rate_threshold: 125_140.0,
            taper_threshold: 100_000.0,
            basic_rate: 0.20,
            higher_rate: 0.40,
            additional_rate: 0.45,
            ni_primary_threshold: 12_570.0,
            ni_upper_limit: 50_270.0,
            ni_main_rate: 0.08,
            ni_upper_rate: 0.02,
            cgt_annual_exemption: 3_000.0,
            // Share disposal rates aligned to the October 2024 change
            cgt_basic_rate: 0.18,
            cgt_higher_rate: 0.24,
            isa_annual_allowance: 20_000.0,
            pension_annual_allowance: 60_000.0,
            state_pension_annual: 11_973.0,
        },
    ),
];
