#![deny(warnings)]

//! Insight selection for narrative summaries.
//!
//! Picks the standout records from computed metrics; wording is left to the
//! caller.

use ledger_core::CostItem;
use ledger_econ::{LedgerMetrics, PlotMetrics};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    /// Plot with the highest ROI; `None` without plots.
    pub best_plot: Option<PlotMetrics>,
    /// Cost item with the largest amount; `None` without cost items.
    pub largest_cost_category: Option<CostItem>,
    /// Plots whose revenue does not cover their cost.
    pub plots_at_loss: Vec<PlotMetrics>,
}

/// First plot with the maximum ROI.
pub fn best_plot(plots: &[PlotMetrics]) -> Option<&PlotMetrics> {
    plots.iter().reduce(|best, p| if p.roi > best.roi { p } else { best })
}

/// First cost item with the maximum amount.
pub fn largest_cost_category(items: &[CostItem]) -> Option<&CostItem> {
    items
        .iter()
        .reduce(|top, c| if c.amount > top.amount { c } else { top })
}

pub fn select_insights(items: &[CostItem], metrics: &LedgerMetrics) -> Insights {
    Insights {
        best_plot: best_plot(&metrics.plots).cloned(),
        largest_cost_category: largest_cost_category(items).cloned(),
        plots_at_loss: metrics
            .plots
            .iter()
            .filter(|p| p.profit < Decimal::ZERO)
            .cloned()
            .collect(),
    }
}
