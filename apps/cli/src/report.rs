//! Plain-text rendering of the dashboard and calculator results.

use ledger_econ::format::CurrencyFormat;
use ledger_econ::{rank_plots_by_roi, CostPlan, YieldOutcome};
use ledger_runtime::Dashboard;
use std::fmt::{self, Write};

pub fn summary(d: &Dashboard, money: &CurrencyFormat) -> Result<String, fmt::Error> {
    let m = &d.metrics;
    let mut out = String::new();
    writeln!(out, "Total cost     {}", money.currency(m.total_cost))?;
    writeln!(out, "Total revenue  {}", money.currency(m.total_revenue))?;
    writeln!(
        out,
        "Profit         {} (margin {})",
        money.currency(m.total_profit),
        money.percent(m.margin_percent)
    )?;
    writeln!(out, "Average ROI    {}", money.percent(m.average_roi))?;

    writeln!(out, "\nCost composition")?;
    if m.composition.is_empty() {
        writeln!(out, "  (no cost items)")?;
    }
    for s in &m.composition {
        writeln!(
            out,
            "  {:<20} {:>18} {:>9}  [{}]",
            s.category,
            money.currency(s.amount),
            money.percent(s.share),
            s.id
        )?;
    }

    writeln!(out, "\nPlots by ROI")?;
    if m.plots.is_empty() {
        writeln!(out, "  (no plots)")?;
    }
    for p in rank_plots_by_roi(&m.plots) {
        writeln!(
            out,
            "  {:<20} cost {:>10} revenue {:>10} profit {:>10} ROI {:>9}  [{}]",
            p.plot_name,
            money.compact(p.cost),
            money.compact(p.revenue),
            money.compact(p.profit),
            money.percent(p.roi),
            p.id
        )?;
    }

    writeln!(out, "\nCashflow")?;
    for month in &d.cashflow.months {
        writeln!(
            out,
            "  {:<4} in {:>10} out {:>10} net {:>10} balance {:>10}",
            month.period,
            money.compact(month.inflow),
            money.compact(month.outflow),
            money.compact(month.net),
            money.compact(month.balance)
        )?;
    }
    writeln!(
        out,
        "  total in {} out {} net {}",
        money.currency(d.cashflow.total_inflow),
        money.currency(d.cashflow.total_outflow),
        money.currency(d.cashflow.net)
    )?;
    for e in &d.ledger.cashflow_entries {
        writeln!(
            out,
            "    entry {:<4} out {:>10} in {:>10}  [{}]",
            e.period,
            money.compact(e.outflow),
            money.compact(e.inflow),
            e.id
        )?;
    }

    writeln!(out, "\nInsights")?;
    match &d.insights.best_plot {
        Some(p) => writeln!(
            out,
            "  {} is the most profitable plot with ROI {}.",
            p.plot_name,
            money.percent(p.roi)
        )?,
        None => writeln!(out, "  No plots recorded yet.")?,
    }
    if let Some(c) = &d.insights.largest_cost_category {
        let share = m
            .composition
            .iter()
            .find(|s| s.id == c.id)
            .map(|s| money.percent(s.share))
            .unwrap_or_default();
        writeln!(
            out,
            "  {} is the largest expense at {} ({} of total cost).",
            c.category,
            money.currency(c.amount),
            share
        )?;
    }
    for p in &d.insights.plots_at_loss {
        writeln!(
            out,
            "  {} is running at a loss of {}.",
            p.plot_name,
            money.currency(-p.profit)
        )?;
    }
    Ok(out)
}

pub fn plan(plan: &CostPlan, money: &CurrencyFormat) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "Cost per unit     {}", money.currency(plan.cost_per_unit))?;
    writeln!(out, "Required revenue  {}", money.currency(plan.required_revenue))?;
    writeln!(
        out,
        "Required margin   {}",
        money.percent(plan.required_margin_percent)
    )?;
    Ok(out)
}

pub fn simulation(outcome: &YieldOutcome, money: &CurrencyFormat) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "Revenue           {}", money.currency(outcome.revenue))?;
    writeln!(out, "Profit            {}", money.currency(outcome.profit))?;
    writeln!(out, "ROI               {}", money.percent(outcome.roi))?;
    writeln!(
        out,
        "Break-even price  {}",
        money.currency(outcome.break_even_price)
    )?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_econ::{simulate_yield, YieldScenario};
    use ledger_runtime::LedgerService;
    use persistence::MemoryBackend;
    use rust_decimal::Decimal;

    #[test]
    fn summary_mentions_seed_highlights() {
        let svc = LedgerService::open(MemoryBackend::new(), &Default::default());
        let text = summary(&svc.dashboard(), &CurrencyFormat::default()).unwrap();
        assert!(text.contains("Total cost     Rp 20.000.000"));
        assert!(text.contains("Plot A is the most profitable plot with ROI 75,00%."));
        assert!(text.contains("Labor is the largest expense at Rp 7.000.000 (35,00% of total cost)."));
    }

    #[test]
    fn simulation_lines() {
        let outcome = simulate_yield(
            Decimal::new(20_000_000, 0),
            &YieldScenario::new(Decimal::new(5_000, 0), Decimal::new(8_000, 0)),
        );
        let text = simulation(&outcome, &CurrencyFormat::default()).unwrap();
        assert!(text.contains("Revenue           Rp 40.000.000"));
        assert!(text.contains("Break-even price  Rp 4.000"));
    }
}
