//! Domain logic for household expense reconciliation.
//!
//! The model is two collections: daily expense records (one per spending
//! event) and monthly ledger entries (one per category identifier per
//! month). [`reconciliation_service`] keeps the two consistent as records
//! are added, reflected, and deleted; [`repair_service`] fixes the states a
//! partial failure can leave behind. Everything below talks to storage only
//! through the traits in [`crate::storage`].

pub mod category;
pub mod commands;
pub mod errors;
pub mod ledger;
pub mod models;
pub mod month;
pub mod reconciliation_service;
pub mod repair_service;

pub use commands::{
    AddExpenseCommand, MonthRepairOutcome, OrphanRepairOutcome, ReflectOutcome, UnreflectOutcome,
};
pub use errors::LedgerError;
pub use ledger::MonthlyLedger;
pub use models::{DailyExpense, ExpenseType, MonthlyLedgerEntry, Owner, Ownership, ReflectionStatus};
pub use month::MonthKey;
pub use reconciliation_service::ReconciliationService;
pub use repair_service::RepairService;
