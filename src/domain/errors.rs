//! Error taxonomy for ledger operations.
//!
//! Callers need to tell a validation failure apart from a missing record or
//! a storage fault before deciding whether to retry, surface the failure,
//! or reach for the repair tooling, so every failure carries its reason.
//! An orphaned reflection is deliberately NOT an error: `reflect` reports it
//! as an outcome, since the expense itself is valid — only its bookkeeping
//! is broken.

use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// The expense is missing a field reconciliation requires (its
    /// category). Rejected before any write is attempted.
    #[error("expense {0} is missing its category")]
    InvalidExpense(String),

    /// A non-positive delta was passed to a ledger adjustment.
    #[error("ledger adjustments require a positive amount, got {0}")]
    InvalidAmount(i64),

    /// A referenced record is absent. The caller decides whether this is a
    /// user-facing failure or an already-resolved state.
    #[error("{collection} record {id} not found")]
    NotFound {
        collection: &'static str,
        id: String,
    },

    /// Failure from the storage collaborator, propagated unchanged.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl LedgerError {
    pub(crate) fn daily_expense_not_found(id: &str) -> Self {
        LedgerError::NotFound {
            collection: "dailyExpenses",
            id: id.to_string(),
        }
    }

    pub(crate) fn monthly_entry_not_found(id: &str) -> Self {
        LedgerError::NotFound {
            collection: "expenses",
            id: id.to_string(),
        }
    }
}
