#![deny(warnings)]

//! Financial analytics over the farm ledger.
//!
//! This crate provides pure, side-effect free helpers for:
//! - Aggregate totals, profit, margin and average ROI
//! - Per-plot profitability and cost-composition shares
//! - Monthly cashflow summaries
//! - What-if calculators (cost per area, yield/price simulation)
//! - Currency and magnitude formatting for display
//!
//! Every ratio guards its denominator: an empty ledger yields zeros, never an
//! error.

pub mod calc;
pub mod cashflow;
pub mod format;

pub use calc::{plan_cost, simulate_yield, CostPlan, CostPlanInput, YieldOutcome, YieldScenario};
pub use cashflow::{summarize_cashflow, CashflowSummary, MonthlyCashflow};

use ledger_core::money::percent_of;
use ledger_core::{CostItem, Ledger, PlotRecord, RecordId};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Decimal places kept for cost-composition shares.
pub const SHARE_DP: u32 = 2;

/// Profitability of a single plot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotMetrics {
    pub id: RecordId,
    pub plot_name: String,
    pub cost: Decimal,
    pub revenue: Decimal,
    /// `revenue - cost`.
    pub profit: Decimal,
    /// `profit / cost * 100`, 0 when cost is 0.
    pub roi: Decimal,
}

/// One cost item's percentage of total cost.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostShare {
    pub id: RecordId,
    pub category: String,
    pub amount: Decimal,
    /// Percent of total cost, rounded to two places.
    pub share: Decimal,
}

/// Aggregate metrics for the whole ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerMetrics {
    pub total_cost: Decimal,
    pub total_revenue: Decimal,
    pub total_profit: Decimal,
    pub margin_percent: Decimal,
    pub average_roi: Decimal,
    pub plots: Vec<PlotMetrics>,
    pub composition: Vec<CostShare>,
}

/// Sum of all cost item amounts.
pub fn total_cost(items: &[CostItem]) -> Decimal {
    items
        .iter()
        .fold(Decimal::ZERO, |acc, c| acc.saturating_add(c.amount))
}

/// Sum of all plot revenues.
pub fn total_revenue(plots: &[PlotRecord]) -> Decimal {
    plots
        .iter()
        .fold(Decimal::ZERO, |acc, p| acc.saturating_add(p.revenue))
}

/// Whole-ledger margin: `profit / cost * 100`, 0 when there is no cost.
pub fn margin_percent(total_profit: Decimal, total_cost: Decimal) -> Decimal {
    percent_of(total_profit, total_cost)
}

pub fn plot_metrics(plot: &PlotRecord) -> PlotMetrics {
    PlotMetrics {
        id: plot.id.clone(),
        plot_name: plot.plot_name.clone(),
        cost: plot.cost,
        revenue: plot.revenue,
        profit: plot.profit(),
        roi: plot.roi(),
    }
}

/// Mean ROI over all plots, or 0 when there are none.
pub fn average_roi(plots: &[PlotMetrics]) -> Decimal {
    if plots.is_empty() {
        return Decimal::ZERO;
    }
    let sum = plots
        .iter()
        .fold(Decimal::ZERO, |acc, p| acc.saturating_add(p.roi));
    sum / Decimal::from(plots.len())
}

/// Share of each cost item in `total`, using a floor of 1 in the denominator.
///
/// Shares are rounded half away from zero to two places, so a non-empty
/// composition sums to 100 within `0.005 * items.len()`.
pub fn cost_composition(items: &[CostItem], total: Decimal) -> Vec<CostShare> {
    let denom = total.max(Decimal::ONE);
    items
        .iter()
        .map(|c| CostShare {
            id: c.id.clone(),
            category: c.category.clone(),
            amount: c.amount,
            share: percent_of(c.amount, denom)
                .round_dp_with_strategy(SHARE_DP, RoundingStrategy::MidpointAwayFromZero),
        })
        .collect()
}

/// Compute every derived metric for `ledger`.
///
/// Example:
/// let m = compute_metrics(&ledger_core::seed_ledger());
/// assert_eq!(m.total_cost, Decimal::new(20_000_000, 0));
pub fn compute_metrics(ledger: &Ledger) -> LedgerMetrics {
    let total_cost = total_cost(&ledger.cost_items);
    let total_revenue = total_revenue(&ledger.plot_records);
    let total_profit = total_revenue.saturating_sub(total_cost);
    let plots: Vec<PlotMetrics> = ledger.plot_records.iter().map(plot_metrics).collect();
    let metrics = LedgerMetrics {
        total_cost,
        total_revenue,
        total_profit,
        margin_percent: margin_percent(total_profit, total_cost),
        average_roi: average_roi(&plots),
        composition: cost_composition(&ledger.cost_items, total_cost),
        plots,
    };
    trace!(
        total_cost = %metrics.total_cost,
        total_revenue = %metrics.total_revenue,
        plots = metrics.plots.len(),
        "computed ledger metrics"
    );
    metrics
}

/// Plots ordered by ROI, highest first. Ties keep display order.
pub fn rank_plots_by_roi(plots: &[PlotMetrics]) -> Vec<PlotMetrics> {
    let mut ranked = plots.to_vec();
    ranked.sort_by(|a, b| b.roi.cmp(&a.roi));
    ranked
}
