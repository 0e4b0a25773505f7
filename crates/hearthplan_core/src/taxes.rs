//! UK income tax and National Insurance calculators
//!
//! These are the pure "oracle" functions the drawdown sequencer and the
//! scenario composer lean on. Band thresholds and rates come entirely from
//! [`TaxConstants`]; nothing here is hard-coded to a tax year.
//!
//! The personal allowance tapers by £1 for every £2 of adjusted income over
//! the taper threshold. Salary-sacrifice pension contributions reduce
//! adjusted income (and NIable pay); relief-at-source contributions are
//! paid from net salary and instead extend the basic-rate band.

use serde::{Deserialize, Serialize};

use crate::config::TaxConstants;

/// How a pension contribution is taken from pay
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PensionMethod {
    /// Employer deducts before tax and NI
    #[default]
    SalarySacrifice,
    /// Paid from net pay; provider reclaims basic-rate relief, band extends
    ReliefAtSource,
}

/// Result of an income tax calculation
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct IncomeTaxResult {
    /// Income after any salary sacrifice
    pub adjusted_income: f64,
    /// Personal allowance after tapering
    pub personal_allowance: f64,
    /// Income actually subject to tax
    pub taxable_income: f64,
    pub tax: f64,
}

/// Personal allowance after the £1-per-£2 taper above the threshold
fn tapered_allowance(adjusted_income: f64, constants: &TaxConstants) -> f64 {
    if adjusted_income <= constants.taper_threshold {
        return constants.personal_allowance;
    }
    let reduction = (adjusted_income - constants.taper_threshold) / 2.0;
    (constants.personal_allowance - reduction).max(0.0)
}

/// Income tax on a gross annual income with an optional pension contribution.
///
/// Returns zeroed results for non-positive or non-finite gross income.
pub fn income_tax(
    gross: f64,
    pension_contribution: f64,
    method: PensionMethod,
    constants: &TaxConstants,
) -> IncomeTaxResult {
    if !gross.is_finite() || gross <= 0.0 {
        return IncomeTaxResult::default();
    }
    let pension = if pension_contribution.is_finite() {
        pension_contribution.max(0.0)
    } else {
        0.0
    };

    let (adjusted_income, band_extension) = match method {
        PensionMethod::SalarySacrifice => ((gross - pension).max(0.0), 0.0),
        PensionMethod::ReliefAtSource => (gross, pension),
    };

    let allowance = tapered_allowance(adjusted_income, constants);
    let taxable_income = (adjusted_income - allowance).max(0.0);

    // Walk the bands bottom-up over adjusted income. The higher-rate band
    // starts where the (possibly tapered) allowance plus the (possibly
    // extended) basic band ends; the additional rate threshold is fixed.
    let basic_top = allowance + constants.basic_rate_band + band_extension;
    let additional_top = constants.additional_rate_threshold.max(basic_top);

    let basic_portion = (adjusted_income.min(basic_top) - allowance).max(0.0);
    let higher_portion = (adjusted_income.min(additional_top) - basic_top).max(0.0);
    let additional_portion = (adjusted_income - additional_top).max(0.0);

    let tax = basic_portion * constants.basic_rate
        + higher_portion * constants.higher_rate
        + additional_portion * constants.additional_rate;

    IncomeTaxResult {
        adjusted_income,
        personal_allowance: allowance,
        taxable_income,
        tax,
    }
}

/// Class 1 employee National Insurance for the year.
///
/// Only salary sacrifice reduces NIable pay; relief-at-source contributions
/// come out of net salary and leave NI unchanged.
pub fn national_insurance(
    gross: f64,
    pension_contribution: f64,
    method: PensionMethod,
    constants: &TaxConstants,
) -> f64 {
    if !gross.is_finite() || gross <= 0.0 {
        return 0.0;
    }
    let niable = match method {
        PensionMethod::SalarySacrifice => (gross - pension_contribution.max(0.0)).max(0.0),
        PensionMethod::ReliefAtSource => gross,
    };

    let main_band = (niable.min(constants.ni_upper_limit) - constants.ni_primary_threshold).max(0.0);
    let upper_band = (niable - constants.ni_upper_limit).max(0.0);

    main_band * constants.ni_main_rate + upper_band * constants.ni_upper_rate
}

/// Marginal income tax on additional income given income already received
/// this year. Used for taxing the 75% taxed slice of pension withdrawals on
/// top of state pension and other taxable amounts.
pub fn marginal_income_tax(additional: f64, ytd_income: f64, constants: &TaxConstants) -> f64 {
    if !additional.is_finite() || additional <= 0.0 {
        return 0.0;
    }
    let ytd = if ytd_income.is_finite() {
        ytd_income.max(0.0)
    } else {
        0.0
    };
    let with_additional = income_tax(ytd + additional, 0.0, PensionMethod::SalarySacrifice, constants);
    let without = income_tax(ytd, 0.0, PensionMethod::SalarySacrifice, constants);
    with_additional.tax - without.tax
}

/// Annual take-home pay: gross less pension contribution, tax and NI
pub fn take_home_pay(
    gross: f64,
    pension_contribution: f64,
    method: PensionMethod,
    constants: &TaxConstants,
) -> f64 {
    if !gross.is_finite() || gross <= 0.0 {
        return 0.0;
    }
    let pension = pension_contribution.max(0.0);
    let tax = income_tax(gross, pension, method, constants).tax;
    let ni = national_insurance(gross, pension, method, constants);
    gross - pension - tax - ni
}
