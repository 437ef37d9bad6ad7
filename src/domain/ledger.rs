//! Monthly ledger aggregation.
//!
//! The fold math lives here as pure functions so that the same arithmetic
//! runs in two places without drifting: inside a storage transaction (where
//! reflection reads the persisted entry) and against the in-memory month
//! mirror ([`MonthlyLedger`]) the reconciliation service keeps for its
//! collaborators to read.

use chrono::Utc;
use log::warn;
use std::collections::BTreeMap;

use crate::domain::errors::LedgerError;
use crate::domain::models::{DailyExpense, MonthlyLedgerEntry, DEFAULT_ICON};

/// Result of subtracting from a ledger entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Withdrawal {
    /// The entry after subtraction, or `None` when it hit zero and was
    /// removed.
    pub remaining: Option<MonthlyLedgerEntry>,
    pub removed: bool,
    /// True when the subtraction went below zero and was clamped. The
    /// ledger never stores a negative amount, but a clamp means the entry
    /// and its contributing records had already diverged, so callers log it.
    pub clamped: bool,
}

/// Fold a daily expense's amount into a ledger entry, creating the entry if
/// none exists yet.
///
/// On an existing entry the amount is added and `category`/`monthString`
/// are refreshed from the most recent contributor; display fields (`name`,
/// `icon`) and ownership are preserved. A new entry takes all of its
/// metadata from the contributor.
pub fn fold_contribution(
    existing: Option<&MonthlyLedgerEntry>,
    id: &str,
    expense: &DailyExpense,
    month: &str,
) -> Result<MonthlyLedgerEntry, LedgerError> {
    let delta = expense.amount;
    if delta <= 0 {
        return Err(LedgerError::InvalidAmount(delta));
    }

    let entry = match existing {
        Some(existing) => MonthlyLedgerEntry {
            amount: existing.amount + delta,
            category: expense.category.clone(),
            month_string: month.to_string(),
            last_updated: Some(Utc::now()),
            ..existing.clone()
        },
        None => MonthlyLedgerEntry {
            id: id.to_string(),
            name: if expense.name.is_empty() {
                expense.category.clone()
            } else {
                expense.name.clone()
            },
            category: expense.category.clone(),
            amount: delta,
            ownership: expense.ownership,
            expense_type: expense.expense_type,
            icon: if expense.icon.is_empty() {
                DEFAULT_ICON.to_string()
            } else {
                expense.icon.clone()
            },
            month_string: month.to_string(),
            date: Some(expense.date),
            last_updated: Some(Utc::now()),
        },
    };
    Ok(entry)
}

/// Subtract `delta` from an entry, clamping at zero. An entry that reaches
/// exactly zero is removed rather than retained.
pub fn withdraw(entry: &MonthlyLedgerEntry, delta: i64) -> Result<Withdrawal, LedgerError> {
    if delta <= 0 {
        return Err(LedgerError::InvalidAmount(delta));
    }

    let clamped = delta > entry.amount;
    let new_amount = (entry.amount - delta).max(0);

    if new_amount == 0 {
        Ok(Withdrawal {
            remaining: None,
            removed: true,
            clamped,
        })
    } else {
        let mut updated = entry.clone();
        updated.amount = new_amount;
        updated.last_updated = Some(Utc::now());
        Ok(Withdrawal {
            remaining: Some(updated),
            removed: false,
            clamped,
        })
    }
}

/// Result of [`MonthlyLedger::subtract_or_remove`].
#[derive(Debug, Clone, PartialEq)]
pub struct Subtraction {
    pub entry: Option<MonthlyLedgerEntry>,
    pub removed: bool,
}

/// The identifier → entry mapping for one loaded month.
///
/// Owned by the reconciliation service as its read mirror of the `expenses`
/// collection; only committed storage results are applied to it.
#[derive(Debug, Clone, Default)]
pub struct MonthlyLedger {
    entries: BTreeMap<String, MonthlyLedgerEntry>,
}

impl MonthlyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<MonthlyLedgerEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.id.clone(), e)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&MonthlyLedgerEntry> {
        self.entries.get(id)
    }

    pub fn entries(&self) -> impl Iterator<Item = &MonthlyLedgerEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace or insert an entry wholesale. Used when mirroring a
    /// committed storage result.
    pub fn insert(&mut self, entry: MonthlyLedgerEntry) {
        self.entries.insert(entry.id.clone(), entry);
    }

    /// Drop an entry wholesale. Used when mirroring a committed removal.
    pub fn remove(&mut self, id: &str) -> Option<MonthlyLedgerEntry> {
        self.entries.remove(id)
    }

    /// Add a contribution under `id`, creating the entry if absent.
    /// Fails with [`LedgerError::InvalidAmount`] on a non-positive amount.
    pub fn upsert_add(
        &mut self,
        id: &str,
        expense: &DailyExpense,
        month: &str,
    ) -> Result<MonthlyLedgerEntry, LedgerError> {
        let updated = fold_contribution(self.entries.get(id), id, expense, month)?;
        self.entries.insert(id.to_string(), updated.clone());
        Ok(updated)
    }

    /// Subtract `delta` from the entry under `id`, removing it when the
    /// amount reaches zero. Fails with [`LedgerError::NotFound`] when no
    /// such entry exists; checking linkage first is the caller's job.
    pub fn subtract_or_remove(&mut self, id: &str, delta: i64) -> Result<Subtraction, LedgerError> {
        let entry = self
            .entries
            .get(id)
            .ok_or_else(|| LedgerError::monthly_entry_not_found(id))?;
        let withdrawal = withdraw(entry, delta)?;
        if withdrawal.clamped {
            warn!(
                "ledger entry {} clamped to zero subtracting {} from {}; entry and records had diverged",
                id, delta, entry.amount
            );
        }
        match withdrawal.remaining {
            Some(updated) => {
                self.entries.insert(id.to_string(), updated.clone());
                Ok(Subtraction {
                    entry: Some(updated),
                    removed: false,
                })
            }
            None => {
                self.entries.remove(id);
                Ok(Subtraction {
                    entry: None,
                    removed: true,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ExpenseType, Owner, Ownership, ReflectionStatus};
    use chrono::NaiveDate;

    fn expense(category: &str, amount: i64, ownership: Ownership) -> DailyExpense {
        DailyExpense {
            id: format!("exp-{}-{}", category, amount),
            name: String::new(),
            category: category.to_string(),
            amount,
            ownership,
            expense_type: ExpenseType::Variable,
            icon: String::new(),
            memo: None,
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            month_string: "2025-03".to_string(),
            status: ReflectionStatus::Unreflected,
        }
    }

    #[test]
    fn upsert_creates_entry_from_contributor() {
        let mut ledger = MonthlyLedger::new();
        let entry = ledger
            .upsert_add("grocery", &expense("grocery", 1000, Ownership::Shared), "2025-03")
            .unwrap();
        assert_eq!(entry.id, "grocery");
        assert_eq!(entry.amount, 1000);
        assert_eq!(entry.name, "grocery"); // falls back to the category tag
        assert_eq!(entry.icon, DEFAULT_ICON);
        assert_eq!(entry.month_string, "2025-03");
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn upsert_adds_and_preserves_display_fields() {
        let mut ledger = MonthlyLedger::new();
        let mut first = expense("grocery", 1000, Ownership::Shared);
        first.name = "Supermarket".to_string();
        first.icon = "🛒".to_string();
        ledger.upsert_add("grocery", &first, "2025-03").unwrap();

        let second = expense("grocery", 500, Ownership::Shared);
        let entry = ledger.upsert_add("grocery", &second, "2025-03").unwrap();
        assert_eq!(entry.amount, 1500);
        // Display fields from the first contributor survive later folds.
        assert_eq!(entry.name, "Supermarket");
        assert_eq!(entry.icon, "🛒");
    }

    #[test]
    fn upsert_is_commutative_over_amounts() {
        let a = expense("grocery", 700, Ownership::Shared);
        let b = expense("grocery", 300, Ownership::Shared);

        let mut forward = MonthlyLedger::new();
        forward.upsert_add("grocery", &a, "2025-03").unwrap();
        forward.upsert_add("grocery", &b, "2025-03").unwrap();

        let mut backward = MonthlyLedger::new();
        backward.upsert_add("grocery", &b, "2025-03").unwrap();
        backward.upsert_add("grocery", &a, "2025-03").unwrap();

        assert_eq!(forward.get("grocery").unwrap().amount, 1000);
        assert_eq!(backward.get("grocery").unwrap().amount, 1000);
    }

    #[test]
    fn upsert_rejects_non_positive_amounts() {
        let mut ledger = MonthlyLedger::new();
        let zero = expense("grocery", 0, Ownership::Shared);
        assert!(matches!(
            ledger.upsert_add("grocery", &zero, "2025-03"),
            Err(LedgerError::InvalidAmount(0))
        ));
        let negative = expense("grocery", -5, Ownership::Shared);
        assert!(matches!(
            ledger.upsert_add("grocery", &negative, "2025-03"),
            Err(LedgerError::InvalidAmount(-5))
        ));
        assert!(ledger.is_empty());
    }

    #[test]
    fn subtract_leaves_remainder() {
        let mut ledger = MonthlyLedger::new();
        ledger
            .upsert_add("grocery", &expense("grocery", 1500, Ownership::Shared), "2025-03")
            .unwrap();
        let result = ledger.subtract_or_remove("grocery", 1000).unwrap();
        assert!(!result.removed);
        assert_eq!(result.entry.unwrap().amount, 500);
        assert_eq!(ledger.get("grocery").unwrap().amount, 500);
    }

    #[test]
    fn subtract_to_exactly_zero_removes_the_entry() {
        let mut ledger = MonthlyLedger::new();
        ledger
            .upsert_add("grocery", &expense("grocery", 1000, Ownership::Shared), "2025-03")
            .unwrap();
        let result = ledger.subtract_or_remove("grocery", 1000).unwrap();
        assert!(result.removed);
        assert!(result.entry.is_none());
        assert!(ledger.get("grocery").is_none());
    }

    #[test]
    fn subtract_clamps_at_zero_instead_of_going_negative() {
        let mut ledger = MonthlyLedger::new();
        ledger
            .upsert_add("grocery", &expense("grocery", 300, Ownership::Shared), "2025-03")
            .unwrap();
        // Over-subtraction clamps to zero and removes, never negative.
        let result = ledger.subtract_or_remove("grocery", 1000).unwrap();
        assert!(result.removed);
        assert!(ledger.get("grocery").is_none());
    }

    #[test]
    fn subtract_from_unknown_id_is_not_found() {
        let mut ledger = MonthlyLedger::new();
        assert!(matches!(
            ledger.subtract_or_remove("grocery", 100),
            Err(LedgerError::NotFound { .. })
        ));
    }

    #[test]
    fn withdraw_never_returns_negative_amounts() {
        let mut ledger = MonthlyLedger::new();
        let entry = ledger
            .upsert_add("grocery", &expense("grocery", 100, Ownership::Shared), "2025-03")
            .unwrap();
        for delta in [1, 50, 99, 100, 101, 10_000] {
            let withdrawal = withdraw(&entry, delta).unwrap();
            let amount = withdrawal.remaining.map(|e| e.amount).unwrap_or(0);
            assert_eq!(amount, (entry.amount - delta).max(0));
            assert!(amount >= 0);
        }
    }

    #[test]
    fn distinct_identifiers_do_not_interfere() {
        let mut ledger = MonthlyLedger::new();
        ledger
            .upsert_add("grocery", &expense("grocery", 1000, Ownership::Shared), "2025-03")
            .unwrap();
        ledger
            .upsert_add(
                "my_grocery",
                &expense("grocery", 500, Ownership::Individual(Owner::Me)),
                "2025-03",
            )
            .unwrap();
        ledger
            .upsert_add(
                "partner_grocery",
                &expense("grocery", 300, Ownership::Individual(Owner::Partner)),
                "2025-03",
            )
            .unwrap();

        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.get("grocery").unwrap().amount, 1000);
        assert_eq!(ledger.get("my_grocery").unwrap().amount, 500);
        assert_eq!(ledger.get("partner_grocery").unwrap().amount, 300);
    }
}
