#![deny(warnings)]

//! Rewrite a stored ledger snapshot in canonical form.
//!
//! Usage: migrate <data-dir> [slot]

use anyhow::{bail, Result};
use ledger_core::DEFAULT_SLOT;
use persistence::{FileBackend, RecordStore};

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(dir) = args.next() else {
        bail!("usage: migrate <data-dir> [slot]");
    };
    let slot = args.next().unwrap_or_else(|| DEFAULT_SLOT.to_string());

    let backend = FileBackend::new(&dir);
    let path = backend.slot_path(&slot);
    let mut store = RecordStore::new(backend, slot);
    let ledger = store.load();
    if let Some(diag) = store.last_load() {
        println!("loaded {}: {:?}", path.display(), diag);
    }
    store.save(&ledger)?;
    println!(
        "snapshot rewritten | cost items: {} | plots: {} | cashflow: {}",
        ledger.cost_items.len(),
        ledger.plot_records.len(),
        ledger.cashflow_entries.len()
    );
    Ok(())
}
