//! Monthly cashflow aggregation.

use ledger_core::{CashflowEntry, Month};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Totals for one month, with the running balance up to and including it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCashflow {
    pub period: Month,
    pub inflow: Decimal,
    pub outflow: Decimal,
    pub net: Decimal,
    pub balance: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashflowSummary {
    /// Months that have at least one entry, in calendar order.
    pub months: Vec<MonthlyCashflow>,
    pub total_inflow: Decimal,
    pub total_outflow: Decimal,
    pub net: Decimal,
}

/// Group entries by month (several entries may share one) and accumulate.
pub fn summarize_cashflow(entries: &[CashflowEntry]) -> CashflowSummary {
    let mut by_month: BTreeMap<Month, (Decimal, Decimal)> = BTreeMap::new();
    for e in entries {
        let slot = by_month
            .entry(e.period)
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        slot.0 = slot.0.saturating_add(e.inflow);
        slot.1 = slot.1.saturating_add(e.outflow);
    }

    let mut summary = CashflowSummary::default();
    let mut balance = Decimal::ZERO;
    for (period, (inflow, outflow)) in by_month {
        let net = inflow.saturating_add(outflow);
        balance = balance.saturating_add(net);
        summary.total_inflow = summary.total_inflow.saturating_add(inflow);
        summary.total_outflow = summary.total_outflow.saturating_add(outflow);
        summary.months.push(MonthlyCashflow {
            period,
            inflow,
            outflow,
            net,
            balance,
        });
    }
    summary.net = balance;
    summary
}
