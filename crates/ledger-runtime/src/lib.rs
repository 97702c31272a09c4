#![deny(warnings)]

//! Ledger runtime: owns the in-memory ledger and its record store.
//!
//! Every successful create/update/delete writes the full ledger back to the
//! store before it becomes visible in memory, so a failed write leaves both
//! sides unchanged. Reads are computed on demand from the current ledger.

use ledger_core::{
    CashflowEntry, CashflowEntryPatch, CostItem, CostItemPatch, EngineConfig, IdGenerator, Keyed,
    Ledger, NewCashflowEntry, NewCostItem, NewPlotRecord, PlotRecord, PlotRecordPatch, RecordId,
    ValidationError,
};
use ledger_econ::{
    compute_metrics, summarize_cashflow, total_cost, CashflowSummary, CostPlan, CostPlanInput,
    LedgerMetrics, YieldOutcome, YieldScenario,
};
use ledger_insight::{select_insights, Insights};
use persistence::{LoadDiagnostic, RecordStore, SlotBackend, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum LedgerError {
    /// A create request was rejected; nothing was written.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// The store could not persist the change; in-memory state is unchanged.
    #[error("storage failed: {0}")]
    Store(#[from] StoreError),
    #[error("unknown collection: {0:?} (expected cost, plot or cashflow)")]
    UnknownCollection(String),
}

/// The three ledger collections, for collection-agnostic requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Collection {
    CostItems,
    PlotRecords,
    CashflowEntries,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Collection::CostItems => "cost item",
            Collection::PlotRecords => "plot record",
            Collection::CashflowEntries => "cashflow entry",
        })
    }
}

impl FromStr for Collection {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cost" | "costs" | "cost-item" | "cost-items" => Ok(Collection::CostItems),
            "plot" | "plots" | "plot-record" | "plot-records" => Ok(Collection::PlotRecords),
            "cashflow" | "cashflows" | "cashflow-entry" | "cashflow-entries" => {
                Ok(Collection::CashflowEntries)
            }
            _ => Err(LedgerError::UnknownCollection(s.to_string())),
        }
    }
}

/// Everything a renderer or exporter needs, computed from one ledger state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub ledger: Ledger,
    pub metrics: LedgerMetrics,
    pub cashflow: CashflowSummary,
    pub insights: Insights,
}

impl Dashboard {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Draw identifiers until one is not already used in `existing`.
fn fresh_id<T: Keyed>(ids: &mut IdGenerator, existing: &[T]) -> RecordId {
    loop {
        let id = ids.next_id();
        if !existing.iter().any(|r| r.key() == &id) {
            return id;
        }
    }
}

fn position<T: Keyed>(items: &[T], id: &RecordId) -> Option<usize> {
    items.iter().position(|r| r.key() == id)
}

/// Create/update/delete service over the ledger, backed by a record store.
#[derive(Debug)]
pub struct LedgerService<B> {
    store: RecordStore<B>,
    ledger: Ledger,
    ids: IdGenerator,
}

impl<B: SlotBackend> LedgerService<B> {
    /// Open the configured slot on `backend` and load it (seed on fallback).
    pub fn open(backend: B, config: &EngineConfig) -> Self {
        let store = RecordStore::new(backend, config.slot.clone());
        Self::with_store(store, IdGenerator::from_seed(config.id_seed))
    }

    pub fn with_store(mut store: RecordStore<B>, ids: IdGenerator) -> Self {
        let ledger = store.load();
        Self { store, ledger, ids }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn store(&self) -> &RecordStore<B> {
        &self.store
    }

    /// How the ledger was obtained on the last load.
    pub fn load_diagnostic(&self) -> Option<&LoadDiagnostic> {
        self.store.last_load()
    }

    /// Discard in-memory state and read the slot again.
    pub fn reload(&mut self) -> &Ledger {
        self.ledger = self.store.load();
        &self.ledger
    }

    /// Restore the seed ledger in storage and memory.
    pub fn reset(&mut self) -> Result<&Ledger, LedgerError> {
        self.ledger = self.store.reset()?;
        info!("ledger reset");
        Ok(&self.ledger)
    }

    // ---- reads ----

    pub fn metrics(&self) -> LedgerMetrics {
        compute_metrics(&self.ledger)
    }

    pub fn cashflow(&self) -> CashflowSummary {
        summarize_cashflow(&self.ledger.cashflow_entries)
    }

    pub fn insights(&self) -> Insights {
        select_insights(&self.ledger.cost_items, &self.metrics())
    }

    pub fn dashboard(&self) -> Dashboard {
        let metrics = self.metrics();
        let insights = select_insights(&self.ledger.cost_items, &metrics);
        Dashboard {
            ledger: self.ledger.clone(),
            cashflow: self.cashflow(),
            metrics,
            insights,
        }
    }

    /// Cost-per-area / target-profit calculator against the current total cost.
    pub fn plan_cost(&self, input: &CostPlanInput) -> CostPlan {
        ledger_econ::plan_cost(total_cost(&self.ledger.cost_items), input)
    }

    /// Yield/price simulator against the current total cost.
    pub fn simulate_yield(&self, scenario: &YieldScenario) -> YieldOutcome {
        ledger_econ::simulate_yield(total_cost(&self.ledger.cost_items), scenario)
    }

    // ---- mutations ----

    fn commit(&mut self, next: Ledger) -> Result<(), LedgerError> {
        self.store.save(&next)?;
        self.ledger = next;
        Ok(())
    }

    fn create_in<T, P>(&mut self, pick: P, record: T) -> Result<T, LedgerError>
    where
        T: Keyed + Clone,
        P: Fn(&mut Ledger) -> &mut Vec<T>,
    {
        let mut next = self.ledger.clone();
        pick(&mut next).insert(0, record.clone());
        self.commit(next)?;
        Ok(record)
    }

    fn update_in<T, P, F>(
        &mut self,
        kind: Collection,
        pick: P,
        id: &RecordId,
        apply: F,
    ) -> Result<Option<T>, LedgerError>
    where
        T: Keyed + Clone,
        P: Fn(&mut Ledger) -> &mut Vec<T>,
        F: FnOnce(&mut T),
    {
        let Some(pos) = position(pick(&mut self.ledger), id) else {
            debug!(%kind, %id, "update ignored: unknown id");
            return Ok(None);
        };
        let mut next = self.ledger.clone();
        let record = &mut pick(&mut next)[pos];
        apply(record);
        let updated = record.clone();
        self.commit(next)?;
        debug!(%kind, %id, "updated record");
        Ok(Some(updated))
    }

    fn delete_in<T, P>(&mut self, kind: Collection, pick: P, id: &RecordId) -> Result<bool, LedgerError>
    where
        T: Keyed + Clone,
        P: Fn(&mut Ledger) -> &mut Vec<T>,
    {
        let Some(pos) = position(pick(&mut self.ledger), id) else {
            debug!(%kind, %id, "delete ignored: unknown id");
            return Ok(false);
        };
        let mut next = self.ledger.clone();
        pick(&mut next).remove(pos);
        self.commit(next)?;
        debug!(%kind, %id, "deleted record");
        Ok(true)
    }

    /// Validate, then assign an id, prepend and save. Blank category is
    /// rejected before any id is drawn.
    pub fn create_cost_item(&mut self, input: NewCostItem) -> Result<CostItem, LedgerError> {
        let mut item = input.into_record(RecordId(String::new()))?;
        item.id = fresh_id(&mut self.ids, &self.ledger.cost_items);
        let item = self.create_in(|l| &mut l.cost_items, item)?;
        debug!(id = %item.id, category = %item.category, amount = %item.amount, "created cost item");
        Ok(item)
    }

    /// Merge `patch` into the item; `Ok(None)` when `id` is unknown.
    pub fn update_cost_item(
        &mut self,
        id: &RecordId,
        patch: &CostItemPatch,
    ) -> Result<Option<CostItem>, LedgerError> {
        self.update_in(Collection::CostItems, |l| &mut l.cost_items, id, |c| {
            patch.apply_to(c)
        })
    }

    /// Remove the item; `Ok(false)` when `id` is unknown.
    pub fn delete_cost_item(&mut self, id: &RecordId) -> Result<bool, LedgerError> {
        self.delete_in(Collection::CostItems, |l| &mut l.cost_items, id)
    }

    pub fn create_plot_record(&mut self, input: NewPlotRecord) -> Result<PlotRecord, LedgerError> {
        let mut plot = input.into_record(RecordId(String::new()))?;
        plot.id = fresh_id(&mut self.ids, &self.ledger.plot_records);
        let plot = self.create_in(|l| &mut l.plot_records, plot)?;
        debug!(id = %plot.id, name = %plot.plot_name, "created plot record");
        Ok(plot)
    }

    pub fn update_plot_record(
        &mut self,
        id: &RecordId,
        patch: &PlotRecordPatch,
    ) -> Result<Option<PlotRecord>, LedgerError> {
        self.update_in(Collection::PlotRecords, |l| &mut l.plot_records, id, |p| {
            patch.apply_to(p)
        })
    }

    pub fn delete_plot_record(&mut self, id: &RecordId) -> Result<bool, LedgerError> {
        self.delete_in(Collection::PlotRecords, |l| &mut l.plot_records, id)
    }

    pub fn create_cashflow_entry(
        &mut self,
        input: NewCashflowEntry,
    ) -> Result<CashflowEntry, LedgerError> {
        let id = fresh_id(&mut self.ids, &self.ledger.cashflow_entries);
        let entry = input.into_record(id);
        let entry = self.create_in(|l| &mut l.cashflow_entries, entry)?;
        debug!(id = %entry.id, period = %entry.period, "created cashflow entry");
        Ok(entry)
    }

    pub fn update_cashflow_entry(
        &mut self,
        id: &RecordId,
        patch: &CashflowEntryPatch,
    ) -> Result<Option<CashflowEntry>, LedgerError> {
        self.update_in(
            Collection::CashflowEntries,
            |l| &mut l.cashflow_entries,
            id,
            |e| patch.apply_to(e),
        )
    }

    pub fn delete_cashflow_entry(&mut self, id: &RecordId) -> Result<bool, LedgerError> {
        self.delete_in(Collection::CashflowEntries, |l| &mut l.cashflow_entries, id)
    }

    /// Delete from whichever collection `kind` names.
    pub fn delete(&mut self, kind: Collection, id: &RecordId) -> Result<bool, LedgerError> {
        match kind {
            Collection::CostItems => self.delete_cost_item(id),
            Collection::PlotRecords => self.delete_plot_record(id),
            Collection::CashflowEntries => self.delete_cashflow_entry(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::{seed_ledger, Month};
    use persistence::{FileBackend, MemoryBackend};
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn d(v: i64) -> Decimal {
        Decimal::new(v, 0)
    }

    fn service() -> LedgerService<MemoryBackend> {
        let config = EngineConfig {
            id_seed: Some(7),
            ..EngineConfig::default()
        };
        LedgerService::open(MemoryBackend::new(), &config)
    }

    fn writes(svc: &LedgerService<MemoryBackend>) -> usize {
        svc.store().backend().writes()
    }

    #[test]
    fn opens_with_seed_when_slot_missing() {
        let svc = service();
        assert_eq!(svc.ledger(), &seed_ledger());
        assert_eq!(svc.load_diagnostic(), Some(&LoadDiagnostic::Missing));
        assert_eq!(writes(&svc), 0);
    }

    #[test]
    fn adding_irrigation_shifts_composition() {
        let mut svc = service();
        let item = svc
            .create_cost_item(NewCostItem {
                category: "Irrigation".into(),
                amount: d(1_000_000),
            })
            .unwrap();
        assert_eq!(svc.ledger().cost_items[0], item);
        let m = svc.metrics();
        assert_eq!(m.total_cost, d(21_000_000));
        let share = m
            .composition
            .iter()
            .find(|s| s.category == "Irrigation")
            .unwrap();
        assert_eq!(share.share, Decimal::new(476, 2));
        assert_eq!(writes(&svc), 1);
    }

    #[test]
    fn plot_roi_of_four_hundred() {
        let mut svc = service();
        let plot = svc
            .create_plot_record(NewPlotRecord {
                plot_name: "Plot D".into(),
                cost: d(4_000_000),
                revenue: d(20_000_000),
            })
            .unwrap();
        let m = svc.metrics();
        let pm = m.plots.iter().find(|p| p.id == plot.id).unwrap();
        assert_eq!(pm.profit, d(16_000_000));
        assert_eq!(pm.roi, d(400));
        assert_eq!(svc.insights().best_plot.unwrap().id, plot.id);
    }

    #[test]
    fn simulator_uses_ledger_total_cost() {
        let svc = service();
        let out = svc.simulate_yield(&YieldScenario::new(d(5_000), d(8_000)));
        assert_eq!(out.revenue, d(40_000_000));
        assert_eq!(out.profit, d(20_000_000));
        assert_eq!(out.roi, d(100));
        assert_eq!(out.break_even_price, d(4_000));
    }

    #[test]
    fn plan_cost_against_ledger() {
        let svc = service();
        let plan = svc.plan_cost(&CostPlanInput::new(d(4), d(10_000_000)));
        assert_eq!(plan.cost_per_unit, d(5_000_000));
        assert_eq!(plan.required_revenue, d(30_000_000));
    }

    #[test]
    fn blank_category_is_rejected_without_save() {
        let mut svc = service();
        let before = svc.ledger().cost_items.len();
        let err = svc
            .create_cost_item(NewCostItem {
                category: "   ".into(),
                amount: d(10),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::BlankField { field: "category" })
        ));
        assert_eq!(svc.ledger().cost_items.len(), before);
        assert_eq!(writes(&svc), 0);
    }

    #[test]
    fn blank_plot_name_is_rejected() {
        let mut svc = service();
        let err = svc
            .create_plot_record(NewPlotRecord::default())
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(svc.ledger().plot_records.len(), 3);
    }

    #[test]
    fn reset_restores_seed_after_mutations() {
        let mut svc = service();
        svc.create_cashflow_entry(NewCashflowEntry {
            period: Month::Jun,
            outflow: d(-500),
            inflow: d(900),
        })
        .unwrap();
        svc.delete_plot_record(&"seed-plot-1".into()).unwrap();
        svc.update_cost_item(
            &"seed-cost-4".into(),
            &CostItemPatch {
                amount: Some(d(1)),
                ..CostItemPatch::default()
            },
        )
        .unwrap();
        assert_ne!(svc.ledger(), &seed_ledger());
        assert_eq!(svc.reset().unwrap(), &seed_ledger());
        assert_eq!(svc.reload(), &seed_ledger());
    }

    #[test]
    fn update_merges_and_normalizes() {
        let mut svc = service();
        let id = RecordId::from("seed-cost-1");
        let updated = svc
            .update_cost_item(
                &id,
                &CostItemPatch {
                    category: Some(" ".into()),
                    amount: Some(d(-40)),
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.category, "Seed");
        assert_eq!(updated.amount, Decimal::ZERO);
        assert_eq!(svc.ledger().cost_items[0], updated);
    }

    #[test]
    fn unknown_ids_are_noops() {
        let mut svc = service();
        let ghost = RecordId::from("ghost");
        assert_eq!(
            svc.update_plot_record(&ghost, &PlotRecordPatch::default())
                .unwrap(),
            None
        );
        assert!(!svc.delete_cashflow_entry(&ghost).unwrap());
        assert_eq!(svc.ledger(), &seed_ledger());
        assert_eq!(writes(&svc), 0);
    }

    #[test]
    fn delete_is_idempotent() {
        let mut svc = service();
        let id = RecordId::from("seed-flow-3");
        assert!(svc.delete(Collection::CashflowEntries, &id).unwrap());
        assert!(!svc.delete(Collection::CashflowEntries, &id).unwrap());
        assert_eq!(svc.ledger().cashflow_entries.len(), 4);
        assert_eq!(writes(&svc), 1);
    }

    #[test]
    fn cashflow_update_moves_period() {
        let mut svc = service();
        let id = RecordId::from("seed-flow-1");
        let entry = svc
            .update_cashflow_entry(
                &id,
                &CashflowEntryPatch {
                    period: Some(Month::Feb),
                    inflow: Some(d(250)),
                    ..CashflowEntryPatch::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(entry.period, Month::Feb);
        assert_eq!(entry.outflow, d(-5_000_000));
        let summary = svc.cashflow();
        assert_eq!(summary.months.len(), 4);
    }

    #[test]
    fn seeded_ids_are_reproducible() {
        let mut a = service();
        let mut b = service();
        let input = NewCostItem {
            category: "Fuel".into(),
            amount: d(5),
        };
        let x = a.create_cost_item(input.clone()).unwrap();
        let y = b.create_cost_item(input).unwrap();
        assert_eq!(x.id, y.id);
    }

    #[test]
    fn colliding_ids_are_redrawn() {
        let mut twin = IdGenerator::seeded(3);
        let taken = twin.next_id();
        let existing = vec![CostItem {
            id: taken.clone(),
            category: "x".into(),
            amount: Decimal::ZERO,
        }];
        let fresh = fresh_id(&mut IdGenerator::seeded(3), &existing);
        assert_ne!(fresh, taken);
    }

    #[test]
    fn collection_names_parse() {
        assert_eq!("cost".parse::<Collection>().unwrap(), Collection::CostItems);
        assert_eq!("Plots".parse::<Collection>().unwrap(), Collection::PlotRecords);
        assert_eq!(
            "cashflow".parse::<Collection>().unwrap(),
            Collection::CashflowEntries
        );
        assert!(matches!(
            "harvest".parse::<Collection>(),
            Err(LedgerError::UnknownCollection(_))
        ));
    }

    #[test]
    fn dashboard_exports_camel_case_json() {
        let svc = service();
        let json = svc.dashboard().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let total: Decimal = value["metrics"]["totalCost"].as_str().unwrap().parse().unwrap();
        assert_eq!(total, d(20_000_000));
        assert_eq!(value["insights"]["bestPlot"]["plotName"], "Plot A");
        assert_eq!(value["ledger"]["costItems"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn file_backed_service_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::default();
        let created = {
            let mut svc = LedgerService::open(FileBackend::new(dir.path()), &config);
            svc.create_plot_record(NewPlotRecord {
                plot_name: "Terrace".into(),
                cost: d(100),
                revenue: d(300),
            })
            .unwrap()
        };
        let svc = LedgerService::open(FileBackend::new(dir.path()), &config);
        assert_eq!(svc.load_diagnostic(), Some(&LoadDiagnostic::Restored));
        assert_eq!(svc.ledger().plot_records[0], created);
        assert_eq!(svc.ledger().plot_records.len(), 4);
    }

    /// Backend whose disk is gone: every read and write fails.
    #[derive(Debug)]
    struct BrokenDisk;

    impl SlotBackend for BrokenDisk {
        fn read_slot(&self, slot: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Read {
                slot: slot.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "bad sector"),
            })
        }

        fn write_slot(&mut self, slot: &str, _contents: &str) -> Result<(), StoreError> {
            Err(StoreError::Write {
                slot: slot.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            })
        }
    }

    fn is_write_failure<T>(r: Result<T, LedgerError>) -> bool {
        matches!(r, Err(LedgerError::Store(StoreError::Write { .. })))
    }

    #[test]
    fn unreadable_slot_falls_back_to_seed() {
        let svc = LedgerService::open(BrokenDisk, &EngineConfig::default());
        assert!(matches!(
            svc.load_diagnostic(),
            Some(LoadDiagnostic::Unreadable(reason)) if reason.contains("bad sector")
        ));
        assert_eq!(svc.ledger(), &seed_ledger());
    }

    #[test]
    fn failed_save_leaves_ledger_untouched() {
        let mut svc = LedgerService::open(BrokenDisk, &EngineConfig::default());
        let before = svc.ledger().clone();

        assert!(is_write_failure(svc.create_cost_item(NewCostItem {
            category: "Fuel".into(),
            amount: d(10),
        })));
        assert!(is_write_failure(svc.create_plot_record(NewPlotRecord {
            plot_name: "East".into(),
            cost: d(1),
            revenue: d(2),
        })));
        assert!(is_write_failure(svc.create_cashflow_entry(NewCashflowEntry {
            period: Month::Jul,
            outflow: d(-1),
            inflow: d(1),
        })));
        assert!(is_write_failure(svc.update_plot_record(
            &"seed-plot-1".into(),
            &PlotRecordPatch {
                revenue: Some(d(1)),
                ..PlotRecordPatch::default()
            },
        )));
        assert!(is_write_failure(svc.delete_cost_item(&"seed-cost-1".into())));
        assert!(is_write_failure(svc.reset()));

        assert_eq!(svc.ledger(), &before);
    }

    #[test]
    fn rejected_create_does_not_consume_an_id() {
        let mut a = service();
        let mut b = service();
        assert!(a
            .create_plot_record(NewPlotRecord {
                plot_name: " ".into(),
                ..NewPlotRecord::default()
            })
            .is_err());
        assert!(a
            .create_cost_item(NewCostItem {
                category: "".into(),
                amount: d(1),
            })
            .is_err());
        let input = NewCostItem {
            category: "Fuel".into(),
            amount: d(5),
        };
        let x = a.create_cost_item(input.clone()).unwrap();
        let y = b.create_cost_item(input).unwrap();
        assert_eq!(x.id, y.id);
    }

    #[derive(Clone, Debug)]
    enum Op {
        AddCost(i64),
        AddPlot(i64, i64),
        AddFlow(i64, i64),
        PatchCost(usize, i64),
        PatchPlot(usize, i64, i64),
        PatchFlow(usize, i64, i64),
        DropCost(usize),
        DropPlot(usize),
        DropFlow(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        let amt = -5_000_000i64..5_000_000;
        prop_oneof![
            amt.clone().prop_map(Op::AddCost),
            (amt.clone(), amt.clone()).prop_map(|(c, r)| Op::AddPlot(c, r)),
            (amt.clone(), amt.clone()).prop_map(|(o, i)| Op::AddFlow(o, i)),
            (0usize..16, amt.clone()).prop_map(|(n, a)| Op::PatchCost(n, a)),
            (0usize..16, amt.clone(), amt.clone()).prop_map(|(n, c, r)| Op::PatchPlot(n, c, r)),
            (0usize..16, amt.clone(), amt).prop_map(|(n, o, i)| Op::PatchFlow(n, o, i)),
            (0usize..16).prop_map(Op::DropCost),
            (0usize..16).prop_map(Op::DropPlot),
            (0usize..16).prop_map(Op::DropFlow),
        ]
    }

    fn nth_id<T: Keyed>(items: &[T], n: usize) -> Option<RecordId> {
        if items.is_empty() {
            return None;
        }
        Some(items[n % items.len()].key().clone())
    }

    fn apply(svc: &mut LedgerService<MemoryBackend>, op: &Op) {
        let ledger = svc.ledger().clone();
        match *op {
            Op::AddCost(a) => {
                svc.create_cost_item(NewCostItem {
                    category: "cost".into(),
                    amount: d(a),
                })
                .unwrap();
            }
            Op::AddPlot(c, r) => {
                svc.create_plot_record(NewPlotRecord {
                    plot_name: "plot".into(),
                    cost: d(c),
                    revenue: d(r),
                })
                .unwrap();
            }
            Op::AddFlow(o, i) => {
                svc.create_cashflow_entry(NewCashflowEntry {
                    period: Month::Aug,
                    outflow: d(o),
                    inflow: d(i),
                })
                .unwrap();
            }
            Op::PatchCost(n, a) => {
                if let Some(id) = nth_id(&ledger.cost_items, n) {
                    let patch = CostItemPatch {
                        amount: Some(d(a)),
                        ..CostItemPatch::default()
                    };
                    assert!(svc.update_cost_item(&id, &patch).unwrap().is_some());
                }
            }
            Op::PatchPlot(n, c, r) => {
                if let Some(id) = nth_id(&ledger.plot_records, n) {
                    let patch = PlotRecordPatch {
                        cost: Some(d(c)),
                        revenue: Some(d(r)),
                        ..PlotRecordPatch::default()
                    };
                    assert!(svc.update_plot_record(&id, &patch).unwrap().is_some());
                }
            }
            Op::PatchFlow(n, o, i) => {
                if let Some(id) = nth_id(&ledger.cashflow_entries, n) {
                    let patch = CashflowEntryPatch {
                        outflow: Some(d(o)),
                        inflow: Some(d(i)),
                        ..CashflowEntryPatch::default()
                    };
                    assert!(svc.update_cashflow_entry(&id, &patch).unwrap().is_some());
                }
            }
            Op::DropCost(n) => {
                if let Some(id) = nth_id(&ledger.cost_items, n) {
                    assert!(svc.delete_cost_item(&id).unwrap());
                }
            }
            Op::DropPlot(n) => {
                if let Some(id) = nth_id(&ledger.plot_records, n) {
                    assert!(svc.delete_plot_record(&id).unwrap());
                }
            }
            Op::DropFlow(n) => {
                if let Some(id) = nth_id(&ledger.cashflow_entries, n) {
                    assert!(svc.delete_cashflow_entry(&id).unwrap());
                }
            }
        }
    }

    proptest! {
        #[test]
        fn money_invariants_hold_after_any_mutations(ops in proptest::collection::vec(op(), 1..40)) {
            let mut svc = service();
            for op in &ops {
                apply(&mut svc, op);
                let l = svc.ledger();
                prop_assert!(l.cost_items.iter().all(|c| c.amount >= Decimal::ZERO));
                prop_assert!(l.plot_records.iter().all(|p| p.cost >= Decimal::ZERO && p.revenue >= Decimal::ZERO));
                prop_assert!(l.cashflow_entries.iter().all(|e| e.inflow >= Decimal::ZERO));
                let m = svc.metrics();
                prop_assert_eq!(m.total_profit, m.total_revenue - m.total_cost);
                prop_assert_eq!(m.total_cost, l.cost_items.iter().map(|c| c.amount).sum::<Decimal>());
            }
        }
    }
}
