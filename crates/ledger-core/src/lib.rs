#![deny(warnings)]

//! Core domain models and invariants for the farm ledger.
//!
//! This crate defines the three serializable collections (cost items, plot
//! records, cashflow entries), the normalization applied to every monetary
//! field, and validation helpers used at the mutation boundary.

pub mod id;
pub mod money;
pub mod seed;

pub use id::IdGenerator;
pub use seed::seed_ledger;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default name of the storage slot holding the ledger snapshot.
pub const DEFAULT_SLOT: &str = "farm-ledger";

/// Unique identifier of a record within its collection.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId(s.to_string())
    }
}

/// Records addressable by identifier.
pub trait Keyed {
    fn key(&self) -> &RecordId;
}

/// Calendar month used as a cashflow period label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    /// All months in calendar order.
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// Short label, e.g. "Jan".
    pub fn label(self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }

    /// 1-based month number.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Month {
    type Err = ValidationError;

    /// Accepts short or full English names in any case, or a month number 1-12.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if let Ok(n) = t.parse::<usize>() {
            if (1..=12).contains(&n) {
                return Ok(Month::ALL[n - 1]);
            }
        }
        let lower = t.to_ascii_lowercase();
        Month::ALL
            .iter()
            .copied()
            .find(|m| {
                let short = m.label().to_ascii_lowercase();
                lower.len() >= 3 && lower.starts_with(&short) && full_name(*m).starts_with(&lower)
            })
            .ok_or_else(|| ValidationError::UnknownPeriod(s.to_string()))
    }
}

impl TryFrom<String> for Month {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

fn full_name(m: Month) -> &'static str {
    match m {
        Month::Jan => "january",
        Month::Feb => "february",
        Month::Mar => "march",
        Month::Apr => "april",
        Month::May => "may",
        Month::Jun => "june",
        Month::Jul => "july",
        Month::Aug => "august",
        Month::Sep => "september",
        Month::Oct => "october",
        Month::Nov => "november",
        Month::Dec => "december",
    }
}

/// A single production cost line (seed, fertilizer, labor, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostItem {
    pub id: RecordId,
    /// Free-text label, not required to be unique.
    #[serde(default)]
    pub category: String,
    /// Amount spent (>= 0).
    #[serde(default, deserialize_with = "money::lenient")]
    pub amount: Decimal,
}

/// Cost and revenue attributed to one cultivated plot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotRecord {
    pub id: RecordId,
    #[serde(default)]
    pub plot_name: String,
    /// Production cost (>= 0).
    #[serde(default, deserialize_with = "money::lenient")]
    pub cost: Decimal,
    /// Estimated or actual revenue (>= 0).
    #[serde(default, deserialize_with = "money::lenient")]
    pub revenue: Decimal,
}

/// Money moving in and out during one month.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashflowEntry {
    pub id: RecordId,
    pub period: Month,
    /// Conventionally <= 0; sign is not enforced.
    #[serde(default, deserialize_with = "money::lenient")]
    pub outflow: Decimal,
    /// Money received (>= 0).
    #[serde(default, deserialize_with = "money::lenient")]
    pub inflow: Decimal,
}

impl Keyed for CostItem {
    fn key(&self) -> &RecordId {
        &self.id
    }
}

impl Keyed for PlotRecord {
    fn key(&self) -> &RecordId {
        &self.id
    }
}

impl Keyed for CashflowEntry {
    fn key(&self) -> &RecordId {
        &self.id
    }
}

impl CostItem {
    pub fn normalize(&mut self) {
        self.amount = money::clamp_non_negative(self.amount);
    }
}

impl PlotRecord {
    pub fn normalize(&mut self) {
        self.cost = money::clamp_non_negative(self.cost);
        self.revenue = money::clamp_non_negative(self.revenue);
    }

    /// `revenue - cost`.
    pub fn profit(&self) -> Decimal {
        self.revenue.saturating_sub(self.cost)
    }

    /// Profit relative to this plot's own cost, in percent; 0 when cost is 0.
    pub fn roi(&self) -> Decimal {
        money::percent_of(self.profit(), self.cost)
    }
}

impl CashflowEntry {
    pub fn normalize(&mut self) {
        self.outflow = money::clamp_signed(self.outflow);
        self.inflow = money::clamp_non_negative(self.inflow);
    }

    /// `inflow + outflow`.
    pub fn net(&self) -> Decimal {
        self.inflow.saturating_add(self.outflow)
    }
}

/// The full ledger: three independent collections in display order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    pub cost_items: Vec<CostItem>,
    pub plot_records: Vec<PlotRecord>,
    pub cashflow_entries: Vec<CashflowEntry>,
}

impl Ledger {
    /// Apply the monetary invariants to every record in place.
    pub fn normalize(&mut self) {
        self.cost_items.iter_mut().for_each(CostItem::normalize);
        self.plot_records.iter_mut().for_each(PlotRecord::normalize);
        self.cashflow_entries
            .iter_mut()
            .for_each(CashflowEntry::normalize);
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.cost_items.is_empty() && self.plot_records.is_empty() && self.cashflow_entries.is_empty()
    }
}

/// Fields accepted when creating a cost item.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewCostItem {
    pub category: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPlotRecord {
    pub plot_name: String,
    pub cost: Decimal,
    pub revenue: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewCashflowEntry {
    pub period: Month,
    pub outflow: Decimal,
    pub inflow: Decimal,
}

/// Partial update of a cost item; `None` keeps the current value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CostItemPatch {
    pub category: Option<String>,
    pub amount: Option<Decimal>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotRecordPatch {
    pub plot_name: Option<String>,
    pub cost: Option<Decimal>,
    pub revenue: Option<Decimal>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CashflowEntryPatch {
    pub period: Option<Month>,
    pub outflow: Option<Decimal>,
    pub inflow: Option<Decimal>,
}

impl NewCostItem {
    /// Validate and normalize into a stored record.
    pub fn into_record(self, id: RecordId) -> Result<CostItem, ValidationError> {
        let category = required_label("category", &self.category)?;
        let mut item = CostItem {
            id,
            category,
            amount: self.amount,
        };
        item.normalize();
        Ok(item)
    }
}

impl NewPlotRecord {
    pub fn into_record(self, id: RecordId) -> Result<PlotRecord, ValidationError> {
        let plot_name = required_label("plotName", &self.plot_name)?;
        let mut plot = PlotRecord {
            id,
            plot_name,
            cost: self.cost,
            revenue: self.revenue,
        };
        plot.normalize();
        Ok(plot)
    }
}

impl NewCashflowEntry {
    /// Cashflow entries have no free-text fields, so this cannot fail.
    pub fn into_record(self, id: RecordId) -> CashflowEntry {
        let mut entry = CashflowEntry {
            id,
            period: self.period,
            outflow: self.outflow,
            inflow: self.inflow,
        };
        entry.normalize();
        entry
    }
}

/// Replace `label` only when `patch` carries non-blank text.
fn merge_label(label: &mut String, patch: &Option<String>) {
    if let Some(text) = patch {
        let t = text.trim();
        if !t.is_empty() {
            *label = t.to_string();
        }
    }
}

impl CostItemPatch {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.amount.is_none()
    }

    pub fn apply_to(&self, item: &mut CostItem) {
        merge_label(&mut item.category, &self.category);
        if let Some(v) = self.amount {
            item.amount = v;
        }
        item.normalize();
    }
}

impl PlotRecordPatch {
    pub fn is_empty(&self) -> bool {
        self.plot_name.is_none() && self.cost.is_none() && self.revenue.is_none()
    }

    pub fn apply_to(&self, plot: &mut PlotRecord) {
        merge_label(&mut plot.plot_name, &self.plot_name);
        if let Some(v) = self.cost {
            plot.cost = v;
        }
        if let Some(v) = self.revenue {
            plot.revenue = v;
        }
        plot.normalize();
    }
}

impl CashflowEntryPatch {
    pub fn is_empty(&self) -> bool {
        self.period.is_none() && self.outflow.is_none() && self.inflow.is_none()
    }

    pub fn apply_to(&self, entry: &mut CashflowEntry) {
        if let Some(p) = self.period {
            entry.period = p;
        }
        if let Some(v) = self.outflow {
            entry.outflow = v;
        }
        if let Some(v) = self.inflow {
            entry.inflow = v;
        }
        entry.normalize();
    }
}

/// Engine-level settings shared by the store and the mutation service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Name of the storage slot holding the snapshot.
    pub slot: String,
    /// Seed for deterministic record identifiers; random when absent.
    pub id_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            slot: DEFAULT_SLOT.to_string(),
            id_seed: None,
        }
    }
}

/// Validation errors for ledger invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field was empty or whitespace.
    #[error("{field} must not be blank")]
    BlankField { field: &'static str },
    /// Period text did not name a month.
    #[error("unknown period: {0:?}")]
    UnknownPeriod(String),
    /// Two records in one collection share an identifier.
    #[error("duplicate record id: {0}")]
    DuplicateId(String),
    /// Identifier is empty.
    #[error("record id must not be empty")]
    EmptyId,
}

/// Trimmed label, or an error naming `field` when it is blank.
pub fn required_label(field: &'static str, text: &str) -> Result<String, ValidationError> {
    let t = text.trim();
    if t.is_empty() {
        return Err(ValidationError::BlankField { field });
    }
    Ok(t.to_string())
}

fn check_ids<'a>(ids: impl Iterator<Item = &'a RecordId>) -> Result<(), ValidationError> {
    let mut seen: BTreeSet<&RecordId> = BTreeSet::new();
    for id in ids {
        if id.0.is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateId(id.0.clone()));
        }
    }
    Ok(())
}

/// Validate identifier uniqueness in every collection.
pub fn validate_ledger(ledger: &Ledger) -> Result<(), ValidationError> {
    check_ids(ledger.cost_items.iter().map(Keyed::key))?;
    check_ids(ledger.plot_records.iter().map(Keyed::key))?;
    check_ids(ledger.cashflow_entries.iter().map(Keyed::key))?;
    Ok(())
}
