#![deny(warnings)]

//! Persistence layer: the ledger snapshot and its storage slot.
//!
//! The whole ledger is saved as one JSON document under a single named slot.
//! Loading never fails: a missing, empty or malformed slot yields the seed
//! ledger, and the reason is kept as a [`LoadDiagnostic`].

pub mod backend;

pub use backend::{FileBackend, MemoryBackend, SlotBackend};

use chrono::{DateTime, Utc};
use ledger_core::seed::{seed_cashflow_entries, seed_cost_items, seed_plot_records};
use ledger_core::{seed_ledger, validate_ledger, CashflowEntry, CostItem, Ledger, PlotRecord};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can surface from the store. Only I/O on write is fatal; read
/// problems are folded into [`LoadDiagnostic`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read slot {slot}: {source}")]
    Read {
        slot: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write slot {slot}: {source}")]
    Write {
        slot: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// How the most recent load obtained its ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadDiagnostic {
    /// A saved snapshot was parsed and used.
    Restored,
    /// A saved snapshot was used, minus `dropped` records that could not be
    /// parsed (unknown period, wrong shape).
    Repaired { dropped: usize },
    /// The slot has never been written; seed data used.
    Missing,
    /// The slot exists but is blank; seed data used.
    Empty,
    /// The backend failed to read the slot; seed data used.
    Unreadable(String),
    /// The slot contents could not be parsed or violated an invariant; seed data used.
    Corrupt(String),
}

impl LoadDiagnostic {
    /// True when seed data replaced the stored snapshot.
    pub fn used_seed(&self) -> bool {
        !matches!(
            self,
            LoadDiagnostic::Restored | LoadDiagnostic::Repaired { .. }
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotOut<'a> {
    cost_items: &'a [CostItem],
    plot_records: &'a [PlotRecord],
    cashflow_entries: &'a [CashflowEntry],
    saved_at: DateTime<Utc>,
}

/// A collection key that is absent or `null` falls back to its seed set.
/// Records are parsed one by one so a single bad entry does not cost the
/// rest of its collection.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotIn {
    #[serde(default)]
    cost_items: Option<Vec<Value>>,
    #[serde(default)]
    plot_records: Option<Vec<Value>>,
    #[serde(default)]
    cashflow_entries: Option<Vec<Value>>,
}

fn parse_records<T: DeserializeOwned>(
    collection: &'static str,
    raw: Option<Vec<Value>>,
    seed: fn() -> Vec<T>,
    dropped: &mut usize,
) -> Vec<T> {
    let Some(values) = raw else {
        return seed();
    };
    values
        .into_iter()
        .filter_map(|v| match serde_json::from_value(v) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(collection, error = %e, "dropping unreadable record");
                *dropped += 1;
                None
            }
        })
        .collect()
}

/// Parse snapshot text into a normalized, validated ledger and the number of
/// records that had to be dropped.
pub fn decode_snapshot(text: &str) -> Result<(Ledger, usize), String> {
    let raw: SnapshotIn = serde_json::from_str(text).map_err(|e| e.to_string())?;
    let mut dropped = 0;
    let ledger = Ledger {
        cost_items: parse_records("costItems", raw.cost_items, seed_cost_items, &mut dropped),
        plot_records: parse_records("plotRecords", raw.plot_records, seed_plot_records, &mut dropped),
        cashflow_entries: parse_records(
            "cashflowEntries",
            raw.cashflow_entries,
            seed_cashflow_entries,
            &mut dropped,
        ),
    }
    .normalized();
    validate_ledger(&ledger).map_err(|e| e.to_string())?;
    Ok((ledger, dropped))
}

/// Serialize a normalized copy of `ledger` as snapshot JSON.
pub fn encode_snapshot(ledger: &Ledger) -> Result<String, StoreError> {
    let normalized = ledger.clone().normalized();
    let snapshot = SnapshotOut {
        cost_items: &normalized.cost_items,
        plot_records: &normalized.plot_records,
        cashflow_entries: &normalized.cashflow_entries,
        saved_at: Utc::now(),
    };
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

/// The ledger's durable home: load with seed fallback, save, reset.
#[derive(Debug)]
pub struct RecordStore<B> {
    backend: B,
    slot: String,
    last_load: Option<LoadDiagnostic>,
}

impl<B: SlotBackend> RecordStore<B> {
    pub fn new(backend: B, slot: impl Into<String>) -> Self {
        Self {
            backend,
            slot: slot.into(),
            last_load: None,
        }
    }

    /// Load the saved ledger, or the seed ledger when nothing usable is stored.
    pub fn load(&mut self) -> Ledger {
        let (ledger, diagnostic) = self.read_snapshot();
        match &diagnostic {
            LoadDiagnostic::Restored => debug!(slot = %self.slot, "restored ledger snapshot"),
            LoadDiagnostic::Repaired { dropped } => {
                warn!(slot = %self.slot, dropped, "restored ledger snapshot with records dropped")
            }
            LoadDiagnostic::Missing | LoadDiagnostic::Empty => {
                info!(slot = %self.slot, "no saved ledger; starting from seed data")
            }
            LoadDiagnostic::Unreadable(reason) | LoadDiagnostic::Corrupt(reason) => {
                warn!(slot = %self.slot, %reason, "discarding unusable ledger snapshot; starting from seed data")
            }
        }
        self.last_load = Some(diagnostic);
        ledger
    }

    fn read_snapshot(&self) -> (Ledger, LoadDiagnostic) {
        let text = match self.backend.read_slot(&self.slot) {
            Ok(Some(text)) => text,
            Ok(None) => return (seed_ledger(), LoadDiagnostic::Missing),
            Err(e) => return (seed_ledger(), LoadDiagnostic::Unreadable(e.to_string())),
        };
        if text.trim().is_empty() {
            return (seed_ledger(), LoadDiagnostic::Empty);
        }
        match decode_snapshot(&text) {
            Ok((ledger, 0)) => (ledger, LoadDiagnostic::Restored),
            Ok((ledger, dropped)) => (ledger, LoadDiagnostic::Repaired { dropped }),
            Err(reason) => (seed_ledger(), LoadDiagnostic::Corrupt(reason)),
        }
    }

    /// Normalize and write the full ledger, replacing the previous snapshot.
    pub fn save(&mut self, ledger: &Ledger) -> Result<(), StoreError> {
        let json = encode_snapshot(ledger)?;
        self.backend.write_slot(&self.slot, &json)?;
        debug!(
            slot = %self.slot,
            bytes = json.len(),
            cost_items = ledger.cost_items.len(),
            plots = ledger.plot_records.len(),
            cashflow = ledger.cashflow_entries.len(),
            "saved ledger snapshot"
        );
        Ok(())
    }

    /// Overwrite the slot with seed data and return it.
    pub fn reset(&mut self) -> Result<Ledger, StoreError> {
        let seed = seed_ledger();
        self.save(&seed)?;
        info!(slot = %self.slot, "ledger reset to seed data");
        Ok(seed)
    }

    /// Diagnostic of the most recent [`load`](Self::load), if any.
    pub fn last_load(&self) -> Option<&LoadDiagnostic> {
        self.last_load.as_ref()
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
