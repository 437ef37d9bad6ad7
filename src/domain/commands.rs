//! Domain-level command and outcome types.
//!
//! These structs are the inputs and results of the reconciliation and
//! repair services. The UI (or whatever collaborator drives the core) maps
//! its own forms onto these.

use chrono::NaiveDate;

use crate::domain::models::{ExpenseType, MonthlyLedgerEntry, Ownership};

/// Input for recording a new daily expense.
#[derive(Debug, Clone)]
pub struct AddExpenseCommand {
    /// Display label, e.g. "Supermarket".
    pub name: String,
    /// Category tag, e.g. "grocery". Required for later reflection.
    pub category: String,
    /// Whole-unit amount, must be positive.
    pub amount: i64,
    pub ownership: Ownership,
    pub expense_type: ExpenseType,
    /// Display icon; a default is applied when empty.
    pub icon: String,
    pub memo: Option<String>,
    /// Calendar date the expense occurred; determines its month partition.
    pub date: NaiveDate,
}

/// Result of asking the engine to reflect a daily expense.
#[derive(Debug, Clone, PartialEq)]
pub enum ReflectOutcome {
    /// The expense was folded into the ledger in this call.
    Reflected {
        category_id: String,
        entry: MonthlyLedgerEntry,
    },
    /// The expense had already been reflected; nothing was added again.
    AlreadyReflected { category_id: String },
    /// The expense is marked reflected but carries no linkage. Reflecting
    /// again could double count, so nothing was written; the repair service
    /// resolves this state.
    OrphanDetected,
}

impl ReflectOutcome {
    /// The category identifier the expense is (or was) linked to, when one
    /// is known.
    pub fn category_id(&self) -> Option<&str> {
        match self {
            ReflectOutcome::Reflected { category_id, .. }
            | ReflectOutcome::AlreadyReflected { category_id } => Some(category_id),
            ReflectOutcome::OrphanDetected => None,
        }
    }
}

/// Result of deleting a daily expense (and reversing its reflection).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreflectOutcome {
    /// Whether a ledger entry was actually adjusted. False when the record
    /// was never reflected or its ledger entry had already vanished.
    pub ledger_adjusted: bool,
    /// Whether the adjustment emptied the ledger entry and removed it.
    pub ledger_entry_removed: bool,
}

/// Result of the orphan-linkage repair scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanRepairOutcome {
    /// Records found marked reflected without a linkage.
    pub orphaned: usize,
    /// Records whose linkage was restored. Always ≤ `orphaned`: orphans
    /// with no matching ledger entry are left alone.
    pub repaired: usize,
}

/// Result of the month-string backfill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthRepairOutcome {
    pub daily_repaired: usize,
    pub monthly_repaired: usize,
}

impl MonthRepairOutcome {
    pub fn total(&self) -> usize {
        self.daily_repaired + self.monthly_repaired
    }
}
