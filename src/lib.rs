//! # Household Ledger
//!
//! Core of a shared household expense tracker: daily spending records are
//! folded ("reflected") into per-category monthly ledger entries, exactly
//! once each, and unfolded again when a record is deleted.
//!
//! The [`domain`] module holds the reconciliation and repair services and
//! the model types; [`storage`] holds the document-store abstraction and
//! the JSON file backend. [`Backend`] bundles the services over one opened
//! store for callers that just want the whole thing wired up.
//!
//! ```no_run
//! use household_ledger::{Backend, MonthKey};
//!
//! let month = MonthKey::new(2025, 7).unwrap();
//! let backend = Backend::open("./data", month).unwrap();
//! ```

pub mod domain;
pub mod storage;

pub use domain::{
    AddExpenseCommand, DailyExpense, ExpenseType, LedgerError, MonthKey, MonthRepairOutcome,
    MonthlyLedger, MonthlyLedgerEntry, OrphanRepairOutcome, Owner, Ownership,
    ReconciliationService, ReflectOutcome, ReflectionStatus, RepairService, UnreflectOutcome,
};
pub use storage::{Connection, JsonConnection, StorageError};

use std::path::Path;

/// The services wired over one opened JSON store.
pub struct Backend {
    pub reconciliation_service: ReconciliationService<JsonConnection>,
    pub repair_service: RepairService<JsonConnection>,
}

impl Backend {
    /// Open (or create) the store under `data_dir` and load `month`.
    pub fn open(data_dir: impl AsRef<Path>, month: MonthKey) -> Result<Self, LedgerError> {
        let connection = JsonConnection::new(data_dir)?;
        let repair_service = RepairService::new(&connection);
        let reconciliation_service = ReconciliationService::new(connection, month)?;
        Ok(Backend {
            reconciliation_service,
            repair_service,
        })
    }

    /// Run both repair scans, using the loaded month as the backfill
    /// fallback. Intended for startup, before the first reflection.
    pub fn repair_all(&self) -> Result<usize, LedgerError> {
        let orphans = self.repair_service.repair_orphans()?;
        let months = self
            .repair_service
            .repair_month_strings(self.reconciliation_service.current_month())?;
        Ok(orphans.repaired + months.total())
    }
}
