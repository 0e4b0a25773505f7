//! Criterion benchmarks for hearthplan_core
//!
//! Run with: cargo bench -p hearthplan_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use jiff::ToSpan;
use jiff::civil::date;

use hearthplan_core::cgt::compute_disposals;
use hearthplan_core::config::DrawdownBuilder;
use hearthplan_core::drawdown::{compare_strategies, simulate_drawdown};
use hearthplan_core::model::{Transaction, TransactionKind};

/// A GIA history with a monthly buy and a quarterly sell over `years` years
fn create_history(years: usize) -> Vec<Transaction> {
    let start = date(2015, 1, 15);
    let mut transactions = Vec::new();
    for month in 0..(years * 12) {
        let day = start.saturating_add((month as i64).months());
        transactions.push(Transaction {
            id: format!("buy-{month}"),
            account_id: "gia-1".to_string(),
            fund_id: "fund-a".to_string(),
            date: day,
            kind: TransactionKind::Buy,
            units: 100.0,
            price: 10.0 + (month % 24) as f64 * 0.25,
            amount: 0.0,
        });
        if month % 3 == 2 {
            transactions.push(Transaction {
                id: format!("sell-{month}"),
                account_id: "gia-1".to_string(),
                fund_id: "fund-a".to_string(),
                date: day.saturating_add(10.days()),
                kind: TransactionKind::Sell,
                units: 80.0,
                price: 11.0 + (month % 24) as f64 * 0.25,
                amount: 0.0,
            });
        }
    }
    transactions
}

fn bench_cgt_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("cgt_matching");
    for years in [5, 20, 40] {
        let history = create_history(years);
        group.bench_with_input(
            BenchmarkId::from_parameter(years),
            &history,
            |b, history| b.iter(|| compute_disposals(black_box(history))),
        );
    }
    group.finish();
}

fn bench_drawdown(c: &mut Criterion) {
    let params = DrawdownBuilder::new()
        .pension(600_000.0)
        .isa(200_000.0)
        .gia(150_000.0)
        .cash(50_000.0)
        .annual_need(40_000.0)
        .state_pension(11_500.0, 67)
        .ages(60, 100)
        .growth_rate(0.04)
        .build()
        .unwrap();

    c.bench_function("drawdown_single_strategy", |b| {
        b.iter(|| simulate_drawdown(black_box(&params)))
    });
    c.bench_function("drawdown_strategy_comparison", |b| {
        b.iter(|| compare_strategies(black_box(&params)))
    });
}

criterion_group!(benches, bench_cgt_matching, bench_drawdown);
criterion_main!(benches);
