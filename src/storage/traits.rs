//! Storage abstraction traits.
//!
//! The domain layer talks to the document store only through the traits in
//! this module, so storage backends can be swapped without touching any
//! reconciliation logic. Two collections exist: `dailyExpenses` (one record
//! per spending event) and `expenses` (one aggregated entry per category
//! identifier and month).
//!
//! Any mutation that touches both collections — folding an expense into its
//! ledger entry, or reversing that fold on delete — must go through
//! [`Connection::run_atomic`], whose staged writes commit together or not
//! at all. The domain performs no locking and no retries of its own.

use thiserror::Error;

use crate::domain::models::{DailyExpense, MonthlyLedgerEntry};

/// Failure from the storage collaborator. Propagated to callers unchanged;
/// retry policy, if any, belongs to the backend or the caller.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt store document: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Interface for the `dailyExpenses` collection.
pub trait DailyExpenseStorage: Send + Sync {
    /// Store a new daily expense record.
    fn store_daily_expense(&self, expense: &DailyExpense) -> Result<(), StorageError>;

    /// Retrieve a specific daily expense by ID.
    fn get_daily_expense(&self, id: &str) -> Result<Option<DailyExpense>, StorageError>;

    /// List every daily expense across all months. Used by the repair
    /// operations, which scan the whole collection.
    fn list_daily_expenses(&self) -> Result<Vec<DailyExpense>, StorageError>;

    /// List the daily expenses whose `monthString` equals `month`.
    fn list_daily_expenses_for_month(&self, month: &str)
        -> Result<Vec<DailyExpense>, StorageError>;

    /// Replace an existing daily expense record.
    fn update_daily_expense(&self, expense: &DailyExpense) -> Result<(), StorageError>;

    /// Delete a daily expense. Returns true if a record was found and
    /// deleted, false otherwise.
    fn delete_daily_expense(&self, id: &str) -> Result<bool, StorageError>;
}

/// Interface for the `expenses` collection of monthly ledger entries.
pub trait MonthlyEntryStorage: Send + Sync {
    /// Store a new ledger entry keyed by its category identifier.
    fn store_monthly_entry(&self, entry: &MonthlyLedgerEntry) -> Result<(), StorageError>;

    /// Retrieve a ledger entry by category identifier.
    fn get_monthly_entry(&self, id: &str) -> Result<Option<MonthlyLedgerEntry>, StorageError>;

    /// List every ledger entry across all months.
    fn list_monthly_entries(&self) -> Result<Vec<MonthlyLedgerEntry>, StorageError>;

    /// List the ledger entries whose `monthString` equals `month`.
    fn list_monthly_entries_for_month(
        &self,
        month: &str,
    ) -> Result<Vec<MonthlyLedgerEntry>, StorageError>;

    /// Replace an existing ledger entry.
    fn update_monthly_entry(&self, entry: &MonthlyLedgerEntry) -> Result<(), StorageError>;

    /// Delete a ledger entry. Returns true if an entry was found and
    /// deleted, false otherwise.
    fn delete_monthly_entry(&self, id: &str) -> Result<bool, StorageError>;
}

/// Handle passed to the closure of [`Connection::run_atomic`].
///
/// Reads observe the staged writes of the same transaction. Nothing reaches
/// the store until the closure returns `Ok` and the commit succeeds.
pub trait StoreTransaction {
    fn get_daily_expense(&self, id: &str) -> Result<Option<DailyExpense>, StorageError>;
    fn put_daily_expense(&mut self, expense: &DailyExpense) -> Result<(), StorageError>;
    fn delete_daily_expense(&mut self, id: &str) -> Result<(), StorageError>;

    fn get_monthly_entry(&self, id: &str) -> Result<Option<MonthlyLedgerEntry>, StorageError>;
    fn put_monthly_entry(&mut self, entry: &MonthlyLedgerEntry) -> Result<(), StorageError>;
    fn delete_monthly_entry(&mut self, id: &str) -> Result<(), StorageError>;
}

/// A connection to the document store.
///
/// Provides factory methods for the per-collection repositories and the
/// atomic read-modify-write primitive that multi-record operations require.
pub trait Connection: Send + Sync + Clone {
    /// The repository type for the `dailyExpenses` collection.
    type DailyExpenses: DailyExpenseStorage;

    /// The repository type for the `expenses` collection.
    type MonthlyEntries: MonthlyEntryStorage;

    /// Create a repository over the `dailyExpenses` collection.
    fn daily_expenses(&self) -> Self::DailyExpenses;

    /// Create a repository over the `expenses` collection.
    fn monthly_entries(&self) -> Self::MonthlyEntries;

    /// Run `op` against a transaction handle whose staged writes commit
    /// together or not at all. An `Err` from the closure aborts the
    /// transaction and leaves the store untouched; commit failures surface
    /// through the same error type via `From<StorageError>`.
    fn run_atomic<T, E>(
        &self,
        op: impl FnOnce(&mut dyn StoreTransaction) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StorageError>;
}
