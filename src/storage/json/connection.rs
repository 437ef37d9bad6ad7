//! JSON-backed document store connection.
//!
//! The whole store is one JSON document on disk (`ledger.json`) holding
//! both collections, keyed by record id:
//!
//! ```json
//! {
//!   "expenses":      { "grocery": { ... }, "my_grocery": { ... } },
//!   "dailyExpenses": { "exp-1625846400123-af3c": { ... } }
//! }
//! ```
//!
//! Every mutation rewrites the document to a temp file and renames it over
//! the old one, so a commit — including an atomic transaction that touched
//! both collections — is a single rename. The in-memory copy is only
//! swapped after the rename succeeds, which keeps reads consistent with
//! what is actually on disk.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::models::{DailyExpense, MonthlyLedgerEntry};
use crate::storage::traits::{Connection, StorageError, StoreTransaction};

use super::{DailyExpenseRepository, MonthlyEntryRepository};

const STORE_FILE: &str = "ledger.json";
const STORE_TMP_FILE: &str = "ledger.json.tmp";

/// Both collections of the document store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoreState {
    #[serde(default)]
    pub(crate) expenses: BTreeMap<String, MonthlyLedgerEntry>,
    #[serde(default)]
    pub(crate) daily_expenses: BTreeMap<String, DailyExpense>,
}

/// Connection to a JSON document store rooted in a data directory.
#[derive(Clone)]
pub struct JsonConnection {
    path: PathBuf,
    state: Arc<Mutex<StoreState>>,
}

impl JsonConnection {
    /// Open (or create) the store in `data_dir`.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self, StorageError> {
        let data_dir = data_dir.as_ref();
        if !data_dir.exists() {
            fs::create_dir_all(data_dir)?;
        }
        let path = data_dir.join(STORE_FILE);

        let state = if path.exists() {
            let file = File::open(&path)?;
            let state: StoreState = serde_json::from_reader(BufReader::new(file))?;
            info!(
                "opened store at {} ({} entries, {} daily expenses)",
                path.display(),
                state.expenses.len(),
                state.daily_expenses.len()
            );
            state
        } else {
            info!("no store at {}, starting empty", path.display());
            StoreState::default()
        };

        Ok(Self {
            path,
            state: Arc::new(Mutex::new(state)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StorageError> {
        self.state
            .lock()
            .map_err(|_| StorageError::Backend("store mutex poisoned".to_string()))
    }

    /// Write `state` durably: serialize to a sibling temp file, then rename
    /// it over the store document.
    fn persist(&self, state: &StoreState) -> Result<(), StorageError> {
        let tmp_path = self
            .path
            .parent()
            .map(|dir| dir.join(STORE_TMP_FILE))
            .unwrap_or_else(|| PathBuf::from(STORE_TMP_FILE));

        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, state)?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        debug!("persisted store to {}", self.path.display());
        Ok(())
    }

    /// Read access to the current state.
    pub(crate) fn with_state<T>(&self, f: impl FnOnce(&StoreState) -> T) -> Result<T, StorageError> {
        let guard = self.lock()?;
        Ok(f(&guard))
    }

    /// Single-record mutation: apply `f` to a staged copy, persist it, then
    /// swap it in. The in-memory state never reflects an unpersisted write.
    pub(crate) fn mutate<T>(
        &self,
        f: impl FnOnce(&mut StoreState) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let mut guard = self.lock()?;
        let mut staged = guard.clone();
        let out = f(&mut staged)?;
        self.persist(&staged)?;
        *guard = staged;
        Ok(out)
    }
}

/// Transaction handle over a staged copy of the store. Reads observe the
/// staged writes; nothing persists unless the whole closure succeeds.
struct JsonTransaction {
    staged: StoreState,
}

impl StoreTransaction for JsonTransaction {
    fn get_daily_expense(&self, id: &str) -> Result<Option<DailyExpense>, StorageError> {
        Ok(self.staged.daily_expenses.get(id).cloned())
    }

    fn put_daily_expense(&mut self, expense: &DailyExpense) -> Result<(), StorageError> {
        self.staged
            .daily_expenses
            .insert(expense.id.clone(), expense.clone());
        Ok(())
    }

    fn delete_daily_expense(&mut self, id: &str) -> Result<(), StorageError> {
        self.staged.daily_expenses.remove(id);
        Ok(())
    }

    fn get_monthly_entry(&self, id: &str) -> Result<Option<MonthlyLedgerEntry>, StorageError> {
        Ok(self.staged.expenses.get(id).cloned())
    }

    fn put_monthly_entry(&mut self, entry: &MonthlyLedgerEntry) -> Result<(), StorageError> {
        self.staged.expenses.insert(entry.id.clone(), entry.clone());
        Ok(())
    }

    fn delete_monthly_entry(&mut self, id: &str) -> Result<(), StorageError> {
        self.staged.expenses.remove(id);
        Ok(())
    }
}

impl Connection for JsonConnection {
    type DailyExpenses = DailyExpenseRepository;
    type MonthlyEntries = MonthlyEntryRepository;

    fn daily_expenses(&self) -> DailyExpenseRepository {
        DailyExpenseRepository::new(self.clone())
    }

    fn monthly_entries(&self) -> MonthlyEntryRepository {
        MonthlyEntryRepository::new(self.clone())
    }

    fn run_atomic<T, E>(
        &self,
        op: impl FnOnce(&mut dyn StoreTransaction) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StorageError>,
    {
        let mut guard = self.lock().map_err(E::from)?;
        let mut txn = JsonTransaction {
            staged: guard.clone(),
        };
        let out = op(&mut txn)?;
        self.persist(&txn.staged).map_err(E::from)?;
        *guard = txn.staged;
        Ok(out)
    }
}
