//! Expense-to-ledger reconciliation.
//!
//! [`ReconciliationService`] is the only writer of the reflection linkage:
//! it records daily expenses, folds them into their monthly ledger entry
//! exactly once, and reverses that fold when a record is deleted. Every
//! mutation that touches both collections goes through the connection's
//! atomic primitive, and the service's in-memory month mirrors are updated
//! only from committed results, so a failed commit leaves memory and store
//! agreeing with each other.

use std::time::{SystemTime, UNIX_EPOCH};

use log::{info, warn};

use crate::domain::category;
use crate::domain::commands::{AddExpenseCommand, ReflectOutcome, UnreflectOutcome};
use crate::domain::errors::LedgerError;
use crate::domain::ledger::{self, MonthlyLedger};
use crate::domain::models::{DailyExpense, MonthlyLedgerEntry, ReflectionStatus, DEFAULT_ICON};
use crate::domain::month::MonthKey;
use crate::storage::{Connection, DailyExpenseStorage, MonthlyEntryStorage, StoreTransaction};

/// Reconciliation engine over one loaded month.
///
/// Holds read mirrors of both collections for the loaded month so callers
/// can render without re-querying storage. The store remains the source of
/// truth; the mirrors follow it.
pub struct ReconciliationService<C: Connection> {
    connection: C,
    daily_repository: C::DailyExpenses,
    entry_repository: C::MonthlyEntries,
    current_month: MonthKey,
    ledger: MonthlyLedger,
    daily_mirror: Vec<DailyExpense>,
}

impl<C: Connection> ReconciliationService<C> {
    /// Create a service and load the given month's records into the
    /// mirrors.
    pub fn new(connection: C, month: MonthKey) -> Result<Self, LedgerError> {
        let daily_repository = connection.daily_expenses();
        let entry_repository = connection.monthly_entries();
        let mut service = Self {
            connection,
            daily_repository,
            entry_repository,
            current_month: month,
            ledger: MonthlyLedger::new(),
            daily_mirror: Vec::new(),
        };
        service.load_month(month)?;
        Ok(service)
    }

    /// Replace the mirrors with the records of `month`.
    pub fn load_month(&mut self, month: MonthKey) -> Result<(), LedgerError> {
        let key = month.to_string();
        let entries = self.entry_repository.list_monthly_entries_for_month(&key)?;
        let daily = self.daily_repository.list_daily_expenses_for_month(&key)?;
        info!(
            "loaded month {}: {} ledger entries, {} daily expenses",
            key,
            entries.len(),
            daily.len()
        );
        self.current_month = month;
        self.ledger = MonthlyLedger::from_entries(entries);
        self.daily_mirror = daily;
        Ok(())
    }

    pub fn current_month(&self) -> MonthKey {
        self.current_month
    }

    /// The loaded month's ledger, keyed by category identifier.
    pub fn monthly_ledger(&self) -> &MonthlyLedger {
        &self.ledger
    }

    /// The loaded month's daily expenses.
    pub fn daily_expenses(&self) -> &[DailyExpense] {
        &self.daily_mirror
    }

    /// Record a new daily expense. The record starts unreflected; callers
    /// decide when to fold it into the ledger with [`reflect`].
    ///
    /// [`reflect`]: ReconciliationService::reflect
    pub fn add_expense(&mut self, command: AddExpenseCommand) -> Result<DailyExpense, LedgerError> {
        if command.category.trim().is_empty() {
            let label = if command.name.is_empty() {
                "(unnamed)".to_string()
            } else {
                command.name.clone()
            };
            return Err(LedgerError::InvalidExpense(label));
        }
        if command.amount <= 0 {
            return Err(LedgerError::InvalidAmount(command.amount));
        }

        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let month = MonthKey::from_date(command.date);
        let expense = DailyExpense {
            id: DailyExpense::generate_id(timestamp_ms),
            name: command.name,
            category: command.category,
            amount: command.amount,
            ownership: command.ownership,
            expense_type: command.expense_type,
            icon: if command.icon.is_empty() {
                DEFAULT_ICON.to_string()
            } else {
                command.icon
            },
            memo: command.memo,
            date: command.date,
            month_string: month.to_string(),
            status: ReflectionStatus::Unreflected,
        };

        self.daily_repository.store_daily_expense(&expense)?;
        info!(
            "recorded daily expense {} ({}: {})",
            expense.id, expense.category, expense.amount
        );
        if month == self.current_month {
            self.daily_mirror.push(expense.clone());
        }
        Ok(expense)
    }

    /// Fold a daily expense into its monthly ledger entry, exactly once.
    ///
    /// An already-reflected record short-circuits without touching the
    /// ledger, as does an orphaned one (reflected flag set, no linkage):
    /// reflecting an orphan again could double count, so it is left to the
    /// repair service. The fold and the linkage write commit atomically.
    pub fn reflect(&mut self, expense_id: &str) -> Result<ReflectOutcome, LedgerError> {
        let expense = self
            .daily_repository
            .get_daily_expense(expense_id)?
            .ok_or_else(|| LedgerError::daily_expense_not_found(expense_id))?;

        if expense.category.trim().is_empty() {
            return Err(LedgerError::InvalidExpense(expense.id));
        }

        let category_id = category::derive_id(&expense.category, expense.ownership);
        match &expense.status {
            ReflectionStatus::Reflected { monthly_id } => {
                if *monthly_id != category_id {
                    warn!(
                        "expense {} is linked to {} but its attributes now derive {}; keeping the recorded linkage",
                        expense.id, monthly_id, category_id
                    );
                }
                return Ok(ReflectOutcome::AlreadyReflected {
                    category_id: monthly_id.clone(),
                });
            }
            ReflectionStatus::Orphaned => {
                warn!(
                    "expense {} is marked reflected without a linkage; not reflecting again",
                    expense.id
                );
                return Ok(ReflectOutcome::OrphanDetected);
            }
            ReflectionStatus::Unreflected => {}
        }

        let month = MonthKey::from_date(expense.date).to_string();
        let mut linked = expense.clone();
        linked.status = ReflectionStatus::Reflected {
            monthly_id: category_id.clone(),
        };

        let entry = self.connection.run_atomic(|txn| {
            let existing = txn.get_monthly_entry(&category_id)?;
            let entry = ledger::fold_contribution(existing.as_ref(), &category_id, &expense, &month)?;
            txn.put_monthly_entry(&entry)?;
            txn.put_daily_expense(&linked)?;
            Ok::<_, LedgerError>(entry)
        })?;

        info!(
            "reflected expense {} into {} (entry amount now {})",
            expense_id, category_id, entry.amount
        );
        if month == self.current_month.to_string() {
            self.ledger.insert(entry.clone());
        }
        self.replace_in_mirror(linked);
        Ok(ReflectOutcome::Reflected { category_id, entry })
    }

    /// Delete a daily expense, reversing its reflection first.
    ///
    /// The ledger subtraction (or entry removal, when the amount reaches
    /// zero) and the record deletion commit atomically. A record marked
    /// reflected without a linkage has its category identifier re-derived
    /// from its attributes so the delete still reverses the earlier fold.
    pub fn unreflect(&mut self, expense_id: &str) -> Result<UnreflectOutcome, LedgerError> {
        let expense = self
            .daily_repository
            .get_daily_expense(expense_id)?
            .ok_or_else(|| LedgerError::daily_expense_not_found(expense_id))?;

        let monthly_id = match &expense.status {
            ReflectionStatus::Unreflected => None,
            ReflectionStatus::Reflected { monthly_id } => Some(monthly_id.clone()),
            ReflectionStatus::Orphaned => {
                let derived = category::derive_id(&expense.category, expense.ownership);
                warn!(
                    "expense {} has no recorded linkage; deriving {} from its attributes for the delete",
                    expense.id, derived
                );
                Some(derived)
            }
        };

        let outcome = match monthly_id {
            None => {
                self.daily_repository.delete_daily_expense(expense_id)?;
                UnreflectOutcome {
                    ledger_adjusted: false,
                    ledger_entry_removed: false,
                }
            }
            Some(monthly_id) => {
                let amount = expense.amount;
                let (adjusted, updated_entry) = self.connection.run_atomic(|txn| {
                    let result = match txn.get_monthly_entry(&monthly_id)? {
                        None => {
                            warn!(
                                "no ledger entry {} for expense {}; deleting the record anyway",
                                monthly_id, expense_id
                            );
                            (false, None)
                        }
                        Some(entry) => {
                            let withdrawal = ledger::withdraw(&entry, amount)?;
                            if withdrawal.clamped {
                                warn!(
                                    "entry {} holds {} but expense {} contributes {}; clamping at zero",
                                    monthly_id, entry.amount, expense_id, amount
                                );
                            }
                            match withdrawal.remaining {
                                Some(updated) => {
                                    txn.put_monthly_entry(&updated)?;
                                    (true, Some(updated))
                                }
                                None => {
                                    txn.delete_monthly_entry(&monthly_id)?;
                                    (true, None)
                                }
                            }
                        }
                    };
                    txn.delete_daily_expense(expense_id)?;
                    Ok::<_, LedgerError>(result)
                })?;

                let removed = adjusted && updated_entry.is_none();
                if adjusted {
                    match updated_entry {
                        Some(entry) => {
                            if self.ledger.get(&monthly_id).is_some()
                                || entry.month_string == self.current_month.to_string()
                            {
                                self.ledger.insert(entry);
                            }
                        }
                        None => {
                            self.ledger.remove(&monthly_id);
                        }
                    }
                }
                UnreflectOutcome {
                    ledger_adjusted: adjusted,
                    ledger_entry_removed: removed,
                }
            }
        };

        info!("deleted daily expense {}", expense_id);
        self.daily_mirror.retain(|e| e.id != expense_id);
        Ok(outcome)
    }

    /// Swap an updated record into the daily mirror, or append it when it
    /// belongs to the loaded month but is not mirrored yet.
    fn replace_in_mirror(&mut self, updated: DailyExpense) {
        if let Some(slot) = self.daily_mirror.iter_mut().find(|e| e.id == updated.id) {
            *slot = updated;
        } else if updated.month_string == self.current_month.to_string() {
            self.daily_mirror.push(updated);
        }
    }

    #[cfg(test)]
    pub(crate) fn daily_repository(&self) -> &C::DailyExpenses {
        &self.daily_repository
    }

    #[cfg(test)]
    pub(crate) fn entry_repository(&self) -> &C::MonthlyEntries {
        &self.entry_repository
    }
}
