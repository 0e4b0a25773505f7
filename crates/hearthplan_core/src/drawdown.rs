//! Retirement drawdown sequencing
//!
//! Simulates year-by-year withdrawals from the four wrapper pots to meet an
//! annual net spending need, under either a tax-optimal ordering
//! (GIA → ISA → cash → pension) or a proportional split across pots.
//!
//! Two deliberate modelling simplifications live here and nowhere else:
//! a GIA withdrawal is assumed to be 50% capital gain (no cost-basis
//! tracking in this sub-routine — the CGT engine owns the real Section 104
//! arithmetic), and a pension withdrawal is 25% tax-free with the rest
//! taxed as marginal income. The pension gross-up uses a fixed 3-iteration
//! proportional adjustment; the iteration count is part of the contract.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TaxConstants;
use crate::model::AccountPot;
use crate::taxes::marginal_income_tax;

/// Assumed capital-gain share of any GIA withdrawal
const GIA_GAIN_FRACTION: f64 = 0.5;
/// Tax-free (PCLS) share of a pension withdrawal
const PENSION_TAX_FREE_FRACTION: f64 = 0.25;
/// Taxed share of a pension withdrawal
const PENSION_TAXED_FRACTION: f64 = 1.0 - PENSION_TAX_FREE_FRACTION;
/// Fixed iteration count for the pension gross-up
const GROSS_UP_ITERATIONS: usize = 3;

/// Withdrawal sequencing strategy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// GIA first, then ISA and cash, pension last
    #[default]
    TaxOptimal,
    /// Each pot drawn in proportion to its share of the total balance
    Proportional,
}

/// Inputs for one drawdown simulation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DrawdownParams {
    pub pots: AccountPot,
    /// Net annual spending need
    pub annual_need: f64,
    pub state_pension_annual: f64,
    pub state_pension_age: u8,
    pub start_age: u8,
    /// Final simulated age, inclusive
    pub end_age: u8,
    /// Annual growth applied to invested pots (cash excluded)
    pub growth_rate: f64,
    pub strategy: Strategy,
    pub constants: TaxConstants,
}

/// One simulated year. Monetary fields are rounded to the nearest whole
/// unit; the simulation itself carries full precision between years.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DrawdownYearResult {
    pub age: u8,
    pub gia_drawn: f64,
    pub isa_drawn: f64,
    pub cash_drawn: f64,
    /// Gross pension withdrawal including the tax-free portion
    pub pension_drawn: f64,
    pub state_pension: f64,
    pub tax_paid: f64,
    pub net_income: f64,
    /// Balances at year end, after growth
    pub balances: AccountPot,
}

/// Full-lifetime plan for one strategy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrawdownPlan {
    pub strategy: Strategy,
    pub years: Vec<DrawdownYearResult>,
    pub total_tax: f64,
    pub total_net_income: f64,
    /// First age the pots hit zero with need left unmet, if they ever do
    pub exhaustion_age: Option<u8>,
}

/// Both strategies on identical inputs, with the headline tax difference
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyComparison {
    pub tax_optimal: DrawdownPlan,
    pub proportional: DrawdownPlan,
    /// Tax paid under proportional minus tax paid under tax-optimal
    pub tax_saved: f64,
}

/// Replace non-finite intermediates with zero before they can propagate
fn sanitise(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Tax on the gain assumed inside a GIA withdrawal. Returns the tax and the
/// taxable gain (after the annual exemption), which feeds the income base
/// used when taxing any pension withdrawal later in the same year.
fn gia_withdrawal_tax(
    gia_drawn: f64,
    taxable_income: f64,
    constants: &TaxConstants,
) -> (f64, f64) {
    if gia_drawn <= 0.0 {
        return (0.0, 0.0);
    }
    let gain = gia_drawn * GIA_GAIN_FRACTION;
    let taxable_gain = (gain - constants.cgt_annual_exemption).max(0.0);
    let rate = if taxable_income > constants.basic_rate_upper() {
        constants.cgt_higher_rate
    } else {
        constants.cgt_basic_rate
    };
    (sanitise(taxable_gain * rate), sanitise(taxable_gain))
}

/// Income tax on the 75% taxed slice of a gross pension withdrawal
fn pension_withdrawal_tax(gross: f64, taxable_income: f64, constants: &TaxConstants) -> f64 {
    if gross <= 0.0 {
        return 0.0;
    }
    sanitise(marginal_income_tax(
        gross * PENSION_TAXED_FRACTION,
        taxable_income,
        constants,
    ))
}

/// Solve the gross pension withdrawal whose net proceeds meet `target_net`,
/// by proportional adjustment from a `target_net / 0.75` seed. Exactly
/// three iterations, then a clamp to the available balance — this is a
/// pinned approximation, not a convergence loop.
fn pension_gross_up(
    target_net: f64,
    available: f64,
    taxable_income: f64,
    constants: &TaxConstants,
) -> f64 {
    if target_net <= 0.0 || available <= 0.0 {
        return 0.0;
    }
    let seed = target_net / PENSION_TAXED_FRACTION;
    let mut gross = seed;
    for _ in 0..GROSS_UP_ITERATIONS {
        let tax = pension_withdrawal_tax(gross, taxable_income, constants);
        let net = gross - tax;
        if net > 0.0 && net.is_finite() {
            gross *= target_net / net;
        }
        if !gross.is_finite() {
            gross = seed;
        }
    }
    gross.clamp(0.0, available)
}

/// What one year drew from each pot, before tax is applied
#[derive(Debug, Clone, Copy, Default)]
struct YearDraws {
    gia: f64,
    isa: f64,
    cash: f64,
    pension: f64,
}

/// Tax-optimal ordering: GIA, then the tax-free pots, pension last
fn draw_tax_optimal(
    pots: &AccountPot,
    net_need: f64,
    taxable_income: f64,
    constants: &TaxConstants,
) -> YearDraws {
    let mut draws = YearDraws::default();
    let mut remaining = net_need;

    draws.gia = remaining.min(pots.gia).max(0.0);
    remaining -= draws.gia;

    draws.isa = remaining.min(pots.isa).max(0.0);
    remaining -= draws.isa;

    draws.cash = remaining.min(pots.cash).max(0.0);
    remaining -= draws.cash;

    if remaining > 0.0 && pots.pension > 0.0 {
        // Income base for the gross-up includes the GIA taxable gain
        let (_, taxable_gain) = gia_withdrawal_tax(draws.gia, taxable_income, constants);
        draws.pension =
            pension_gross_up(remaining, pots.pension, taxable_income + taxable_gain, constants);
    }

    draws
}

/// Proportional split: each pot contributes its share of the total balance.
/// Draws are gross; tax reduces the year's net income rather than
/// increasing the withdrawal.
fn draw_proportional(pots: &AccountPot, net_need: f64) -> YearDraws {
    let total = pots.total();
    if total <= 0.0 || net_need <= 0.0 {
        return YearDraws::default();
    }
    let amount = net_need.min(total);
    YearDraws {
        gia: amount * pots.gia / total,
        isa: amount * pots.isa / total,
        cash: amount * pots.cash / total,
        pension: amount * pots.pension / total,
    }
}

/// Run one strategy over the full age range
pub fn simulate_drawdown(params: &DrawdownParams) -> DrawdownPlan {
    let constants = &params.constants;
    let mut pots = params.pots;
    let mut years = Vec::new();
    let mut exhaustion_age = None;
    let mut total_tax = 0.0;
    let mut total_net_income = 0.0;

    for age in params.start_age..=params.end_age {
        let state_pension = if age >= params.state_pension_age {
            params.state_pension_annual.max(0.0)
        } else {
            0.0
        };
        let net_need = (params.annual_need - state_pension).max(0.0);
        // Taxable income before any pot is touched
        let taxable_income = state_pension;

        let draws = match params.strategy {
            Strategy::TaxOptimal => draw_tax_optimal(&pots, net_need, taxable_income, constants),
            Strategy::Proportional => draw_proportional(&pots, net_need),
        };

        let (cgt_tax, taxable_gain) = gia_withdrawal_tax(draws.gia, taxable_income, constants);
        let income_tax =
            pension_withdrawal_tax(draws.pension, taxable_income + taxable_gain, constants);
        let tax_paid = sanitise(cgt_tax + income_tax);

        pots.gia = (pots.gia - draws.gia).max(0.0);
        pots.isa = (pots.isa - draws.isa).max(0.0);
        pots.cash = (pots.cash - draws.cash).max(0.0);
        pots.pension = (pots.pension - draws.pension).max(0.0);

        // Exhaustion latches on the first year the pots run dry with need
        // still unmet; it is never reset by later growth
        if exhaustion_age.is_none() && pots.total() <= 0.0 && net_need > 0.0 {
            exhaustion_age = Some(age);
        }

        let net_income = sanitise(
            state_pension + draws.gia + draws.isa + draws.cash + draws.pension - tax_paid,
        );

        // Growth after this year's draws; cash does not grow
        let growth = 1.0 + params.growth_rate;
        pots.pension = sanitise(pots.pension * growth).max(0.0);
        pots.isa = sanitise(pots.isa * growth).max(0.0);
        pots.gia = sanitise(pots.gia * growth).max(0.0);
        pots.cash = sanitise(pots.cash).max(0.0);

        debug!(
            age,
            gia = draws.gia,
            isa = draws.isa,
            cash = draws.cash,
            pension = draws.pension,
            tax_paid,
            remaining = pots.total(),
            "drawdown year"
        );

        let year = DrawdownYearResult {
            age,
            gia_drawn: sanitise(draws.gia).round(),
            isa_drawn: sanitise(draws.isa).round(),
            cash_drawn: sanitise(draws.cash).round(),
            pension_drawn: sanitise(draws.pension).round(),
            state_pension: state_pension.round(),
            tax_paid: tax_paid.round(),
            net_income: net_income.round(),
            balances: AccountPot {
                pension: pots.pension.round(),
                isa: pots.isa.round(),
                gia: pots.gia.round(),
                cash: pots.cash.round(),
            },
        };
        total_tax += year.tax_paid;
        total_net_income += year.net_income;
        years.push(year);
    }

    DrawdownPlan {
        strategy: params.strategy,
        years,
        total_tax,
        total_net_income,
        exhaustion_age,
    }
}

/// Run both strategies on identical inputs. The tax-paid difference is the
/// headline "tax saved by sequencing" figure.
pub fn compare_strategies(params: &DrawdownParams) -> StrategyComparison {
    let tax_optimal = simulate_drawdown(&DrawdownParams {
        strategy: Strategy::TaxOptimal,
        ..*params
    });
    let proportional = simulate_drawdown(&DrawdownParams {
        strategy: Strategy::Proportional,
        ..*params
    });
    let tax_saved = proportional.total_tax - tax_optimal.total_tax;

    StrategyComparison {
        tax_optimal,
        proportional,
        tax_saved,
    }
}
