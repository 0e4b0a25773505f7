//! UK capital gains tax engine
//!
//! Applies the HMRC share identification rules to a transaction history,
//! in strict precedence order for every sell:
//!
//! 1. Same-day rule — match against acquisitions on the identical date
//! 2. Bed & breakfast rule — match against acquisitions in the following
//!    30 calendar days
//! 3. Section 104 pool — cost the remainder at the pooled average
//!
//! Pools are derived fresh from the ordered history on every call; there is
//! no persisted pool state. Units consumed by rules 1 and 2 never enter the
//! pool, so a "sell" only removes its Section 104 remainder.

use jiff::ToSpan;
use jiff::civil::Date;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Transaction, TransactionKind};
use crate::tax_year::TaxYear;

/// Which HMRC matching rule costed a disposal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    SameDay,
    BedAndBreakfast,
    Section104,
}

impl MatchRule {
    pub fn label(self) -> &'static str {
        match self {
            MatchRule::SameDay => "same-day",
            MatchRule::BedAndBreakfast => "bed & breakfast",
            MatchRule::Section104 => "section 104",
        }
    }
}

/// Section 104 holding for one (account, fund) position
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Section104Pool {
    pub account_id: String,
    pub fund_id: String,
    /// Units currently pooled
    pub units: f64,
    /// Total pooled cost of those units
    pub cost: f64,
}

impl Section104Pool {
    fn new(account_id: &str, fund_id: &str) -> Self {
        Section104Pool {
            account_id: account_id.to_string(),
            fund_id: fund_id.to_string(),
            units: 0.0,
            cost: 0.0,
        }
    }

    /// Rolling average cost per unit; zero for an empty pool
    pub fn average_cost(&self) -> f64 {
        if self.units <= 0.0 {
            0.0
        } else {
            self.cost / self.units
        }
    }

    fn add(&mut self, units: f64, cost: f64) {
        self.units += units;
        self.cost += cost;
        debug!(
            fund = %self.fund_id,
            units,
            cost,
            pool_units = self.units,
            pool_cost = self.cost,
            "pool add"
        );
    }

    /// Remove units at the current average cost, returning the allowable
    /// cost. Removing at least the whole pool clears it and returns the
    /// full pooled cost — an over-sell never produces negative state.
    fn remove(&mut self, units: f64) -> f64 {
        if units <= 0.0 {
            return 0.0;
        }
        let cost = if units >= self.units {
            let all = self.cost;
            self.units = 0.0;
            self.cost = 0.0;
            all
        } else {
            let removed = self.cost * units / self.units;
            self.units -= units;
            self.cost -= removed;
            removed
        };
        debug!(
            fund = %self.fund_id,
            units,
            cost,
            pool_units = self.units,
            pool_cost = self.cost,
            "pool remove"
        );
        cost
    }
}

/// One sell's gain outcome under a single matching rule.
///
/// A sell that splits across rules yields one record per rule, so at most
/// three records. Bed & breakfast tranches against several later buy dates
/// collapse into the one B&B record, keeping the earliest matched date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Disposal {
    pub account_id: String,
    pub fund_id: String,
    pub date: Date,
    pub tax_year: TaxYear,
    pub rule: MatchRule,
    pub units: f64,
    pub proceeds: f64,
    pub cost: f64,
    pub gain: f64,
    /// For B&B matches, the acquisition date matched against
    pub matched_date: Option<Date>,
}

/// Everything the engine derives from one pass over the history
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CgtComputation {
    /// All disposals, ordered by date then position
    pub disposals: Vec<Disposal>,
    /// Final pool state per position, ordered by (account, fund)
    pub pools: Vec<Section104Pool>,
}

impl CgtComputation {
    pub fn pool(&self, account_id: &str, fund_id: &str) -> Option<&Section104Pool> {
        self.pools
            .iter()
            .find(|p| p.account_id == account_id && p.fund_id == fund_id)
    }
}

/// Realized gains aggregated over one UK tax year
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TaxYearGains {
    pub tax_year: TaxYear,
    /// Sum of positive gains
    pub total_gains: f64,
    /// Sum of losses, as a positive magnitude
    pub total_losses: f64,
    pub net_gain: f64,
    /// Net gain after the annual exempt amount, floored at zero
    pub taxable_gain: f64,
}

/// Unrealised position gain against the Section 104 average cost
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnrealisedGain {
    pub account_id: String,
    pub fund_id: String,
    /// Fund display name, or the raw id when no name is known
    pub label: String,
    pub units: f64,
    pub market_value: f64,
    pub cost: f64,
    pub gain: f64,
}

// ============================================================================
// Matching engine
// ============================================================================

type PositionKey = (String, String);

/// Per-day acquisition availability within one position
#[derive(Debug, Default, Clone, Copy)]
struct DayAcquisitions {
    /// Units not yet consumed by same-day/B&B matching
    remaining: f64,
    total_units: f64,
    total_cost: f64,
}

impl DayAcquisitions {
    /// Cost of `units` at this day's average acquisition price
    fn cost_of(&self, units: f64) -> f64 {
        if self.total_units <= 0.0 {
            0.0
        } else {
            self.total_cost * units / self.total_units
        }
    }
}

/// Apply the HMRC matching rules to the full transaction history.
///
/// Matching is independent per (account, fund) position. Dividend and
/// contribution transactions never affect pools or matching. A sell with no
/// acquisitions anywhere yields a zero-cost Section 104 disposal — the full
/// proceeds are the gain; nothing panics.
pub fn compute_disposals(transactions: &[Transaction]) -> CgtComputation {
    // Group by position, preserving input order within each group
    let mut groups: FxHashMap<PositionKey, Vec<&Transaction>> = FxHashMap::default();
    for tx in transactions {
        groups
            .entry((tx.account_id.clone(), tx.fund_id.clone()))
            .or_default()
            .push(tx);
    }

    // Deterministic position order regardless of map iteration
    let mut keys: Vec<PositionKey> = groups.keys().cloned().collect();
    keys.sort();

    let mut disposals = Vec::new();
    let mut pools = Vec::new();

    for key in keys {
        let group = &groups[&key];
        let (position_disposals, pool) = process_position(&key.0, &key.1, group);
        disposals.extend(position_disposals);
        if pool.units > 0.0 || pool.cost > 0.0 {
            pools.push(pool);
        }
    }

    disposals.sort_by(|a, b| {
        (a.date, &a.account_id, &a.fund_id, a.rule).cmp(&(
            b.date,
            &b.account_id,
            &b.fund_id,
            b.rule,
        ))
    });

    CgtComputation { disposals, pools }
}

/// Run the matching rules over one position's transactions
fn process_position(
    account_id: &str,
    fund_id: &str,
    transactions: &[&Transaction],
) -> (Vec<Disposal>, Section104Pool) {
    // Date order; sells ahead of buys on the same day so same-day matching
    // happens before the day's acquisitions reach the pool
    let mut ordered: Vec<&Transaction> = transactions.to_vec();
    ordered.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| b.kind.is_disposal().cmp(&a.kind.is_disposal()))
    });

    // Acquisition availability per calendar day, for rules 1 and 2
    let mut acquisitions: FxHashMap<Date, DayAcquisitions> = FxHashMap::default();
    for tx in &ordered {
        if tx.kind.is_acquisition() {
            let day = acquisitions.entry(tx.date).or_default();
            day.remaining += tx.units;
            day.total_units += tx.units;
            day.total_cost += tx.total_amount();
        }
    }

    let mut pool = Section104Pool::new(account_id, fund_id);
    let mut disposals = Vec::new();

    for tx in &ordered {
        match tx.kind {
            TransactionKind::Buy => {
                // Only the share not claimed by same-day/B&B matching joins
                // the pool. Earlier sells have already decremented
                // `remaining` for this day by the time we get here.
                let day = acquisitions[&tx.date];
                if day.total_units > 0.0 {
                    let share = tx.units / day.total_units;
                    let units_to_pool = day.remaining * share;
                    if units_to_pool > 0.0 {
                        pool.add(units_to_pool, day.cost_of(units_to_pool));
                    }
                }
            }
            TransactionKind::Sell => {
                disposals.extend(match_sell(tx, &mut acquisitions, &mut pool));
            }
            TransactionKind::Dividend | TransactionKind::Contribution => {}
        }
    }

    (disposals, pool)
}

/// Match one sell against same-day buys, then the 30-day window, then the
/// pool. Returns one disposal record per rule that claimed units.
fn match_sell(
    sell: &Transaction,
    acquisitions: &mut FxHashMap<Date, DayAcquisitions>,
    pool: &mut Section104Pool,
) -> Vec<Disposal> {
    let proceeds_per_unit = if sell.units > 0.0 {
        sell.total_amount() / sell.units
    } else {
        sell.price
    };
    let tax_year = TaxYear::containing(sell.date);
    let mut remaining = sell.units;
    let mut disposals = Vec::new();

    let mut push = |rule: MatchRule, units: f64, cost: f64, matched_date: Option<Date>| {
        let proceeds = units * proceeds_per_unit;
        debug!(
            fund = %sell.fund_id,
            rule = rule.label(),
            units,
            proceeds,
            cost,
            "disposal matched"
        );
        disposals.push(Disposal {
            account_id: sell.account_id.clone(),
            fund_id: sell.fund_id.clone(),
            date: sell.date,
            tax_year,
            rule,
            units,
            proceeds,
            cost,
            gain: proceeds - cost,
            matched_date,
        });
    };

    // 1. Same-day rule
    if let Some(day) = acquisitions.get_mut(&sell.date)
        && day.remaining > 0.0
    {
        let matched = remaining.min(day.remaining);
        let cost = day.cost_of(matched);
        day.remaining -= matched;
        remaining -= matched;
        push(MatchRule::SameDay, matched, cost, None);
    }

    // 2. Bed & breakfast: acquisitions in the following 30 calendar days,
    //    earliest first. Tranches aggregate into a single record.
    if remaining > 0.0 {
        let mut bnb_units = 0.0;
        let mut bnb_cost = 0.0;
        let mut bnb_date: Option<Date> = None;
        for days_ahead in 1..=30 {
            if remaining <= 0.0 {
                break;
            }
            let future = sell.date.saturating_add((days_ahead as i64).days());
            if let Some(day) = acquisitions.get_mut(&future)
                && day.remaining > 0.0
            {
                let matched = remaining.min(day.remaining);
                bnb_cost += day.cost_of(matched);
                bnb_units += matched;
                bnb_date.get_or_insert(future);
                day.remaining -= matched;
                remaining -= matched;
            }
        }
        if bnb_units > 0.0 {
            push(MatchRule::BedAndBreakfast, bnb_units, bnb_cost, bnb_date);
        }
    }

    // 3. Section 104 remainder at the pool average. An empty pool yields a
    //    zero cost basis.
    if remaining > 0.0 {
        let cost = pool.remove(remaining);
        push(MatchRule::Section104, remaining, cost, None);
    }

    disposals
}

// ============================================================================
// Aggregation
// ============================================================================

/// Sum realized gains for one UK tax year and apply the annual exemption
pub fn tax_year_gains(disposals: &[Disposal], year: TaxYear, annual_exemption: f64) -> TaxYearGains {
    let mut total_gains = 0.0;
    let mut total_losses = 0.0;

    for disposal in disposals.iter().filter(|d| d.tax_year == year) {
        let gain = if disposal.gain.is_finite() {
            disposal.gain
        } else {
            0.0
        };
        if gain >= 0.0 {
            total_gains += gain;
        } else {
            total_losses += -gain;
        }
    }

    let net_gain = total_gains - total_losses;
    TaxYearGains {
        tax_year: year,
        total_gains,
        total_losses,
        net_gain,
        taxable_gain: (net_gain - annual_exemption.max(0.0)).max(0.0),
    }
}

/// Unrealised gain per currently-held position: market value at the given
/// prices against the Section 104 pooled cost.
///
/// A fund with no entry in `prices` is valued at its pooled average cost,
/// i.e. shown with zero unrealised gain rather than a spurious loss. Labels
/// degrade to the raw fund id when `fund_names` has no entry.
pub fn unrealised_gains(
    transactions: &[Transaction],
    prices: &FxHashMap<String, f64>,
    fund_names: &FxHashMap<String, String>,
) -> Vec<UnrealisedGain> {
    let computation = compute_disposals(transactions);

    computation
        .pools
        .into_iter()
        .filter(|pool| pool.units > 0.0)
        .map(|pool| {
            let price = prices
                .get(&pool.fund_id)
                .copied()
                .filter(|p| p.is_finite() && *p > 0.0)
                .unwrap_or_else(|| pool.average_cost());
            let market_value = pool.units * price;
            let label = fund_names
                .get(&pool.fund_id)
                .cloned()
                .unwrap_or_else(|| pool.fund_id.clone());
            UnrealisedGain {
                account_id: pool.account_id,
                fund_id: pool.fund_id,
                label,
                units: pool.units,
                market_value,
                cost: pool.cost,
                gain: market_value - pool.cost,
            }
        })
        .collect()
}
