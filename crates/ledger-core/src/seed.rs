//! Fixed fallback collections used on first run and on reset.
//!
//! Identifiers are fixed too, so a reset always reproduces the exact same
//! ledger.

use crate::{CashflowEntry, CostItem, Ledger, Month, PlotRecord, RecordId};
use rust_decimal::Decimal;

fn id(s: &str) -> RecordId {
    RecordId(s.to_string())
}

fn cost(key: &str, category: &str, amount: i64) -> CostItem {
    CostItem {
        id: id(key),
        category: category.to_string(),
        amount: Decimal::new(amount, 0),
    }
}

fn plot(key: &str, name: &str, cost: i64, revenue: i64) -> PlotRecord {
    PlotRecord {
        id: id(key),
        plot_name: name.to_string(),
        cost: Decimal::new(cost, 0),
        revenue: Decimal::new(revenue, 0),
    }
}

fn flow(key: &str, period: Month, outflow: i64, inflow: i64) -> CashflowEntry {
    CashflowEntry {
        id: id(key),
        period,
        outflow: Decimal::new(outflow, 0),
        inflow: Decimal::new(inflow, 0),
    }
}

/// Seed cost items; they total 20,000,000.
pub fn seed_cost_items() -> Vec<CostItem> {
    vec![
        cost("seed-cost-1", "Seed", 3_000_000),
        cost("seed-cost-2", "Fertilizer", 5_000_000),
        cost("seed-cost-3", "Pesticide", 2_000_000),
        cost("seed-cost-4", "Labor", 7_000_000),
        cost("seed-cost-5", "Equipment Rental", 3_000_000),
    ]
}

pub fn seed_plot_records() -> Vec<PlotRecord> {
    vec![
        plot("seed-plot-1", "Plot A", 8_000_000, 14_000_000),
        plot("seed-plot-2", "Plot B", 7_000_000, 10_500_000),
        plot("seed-plot-3", "Plot C", 5_000_000, 6_000_000),
    ]
}

pub fn seed_cashflow_entries() -> Vec<CashflowEntry> {
    vec![
        flow("seed-flow-1", Month::Jan, -5_000_000, 0),
        flow("seed-flow-2", Month::Feb, -3_000_000, 1_500_000),
        flow("seed-flow-3", Month::Mar, -2_000_000, 4_000_000),
        flow("seed-flow-4", Month::Apr, -1_500_000, 9_000_000),
        flow("seed-flow-5", Month::May, -1_000_000, 16_000_000),
    ]
}

pub fn seed_ledger() -> Ledger {
    Ledger {
        cost_items: seed_cost_items(),
        plot_records: seed_plot_records(),
        cashflow_entries: seed_cashflow_entries(),
    }
}
