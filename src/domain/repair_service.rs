//! Consistency repair over the stored collections.
//!
//! Two maintenance scans live here. [`RepairService::repair_orphans`]
//! restores the ledger linkage of records a broken commit left marked
//! reflected without one. [`RepairService::repair_month_strings`] backfills
//! the month partition field on records written before it existed. Both
//! scan the whole store, fix records one at a time as write-throughs, and
//! log-and-skip individual failures so one bad record never aborts the
//! whole pass.

use log::{info, warn};

use crate::domain::category;
use crate::domain::commands::{MonthRepairOutcome, OrphanRepairOutcome};
use crate::domain::errors::LedgerError;
use crate::domain::models::ReflectionStatus;
use crate::domain::month::MonthKey;
use crate::storage::{Connection, DailyExpenseStorage, MonthlyEntryStorage};

pub struct RepairService<C: Connection> {
    daily_repository: C::DailyExpenses,
    entry_repository: C::MonthlyEntries,
}

impl<C: Connection> RepairService<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            daily_repository: connection.daily_expenses(),
            entry_repository: connection.monthly_entries(),
        }
    }

    /// Scan for records marked reflected without a linkage and restore it.
    ///
    /// An orphan's category identifier is re-derived from its attributes.
    /// The linkage is restored only when a ledger entry with that
    /// identifier exists; the entry's amount is never changed, since the
    /// orphan's contribution may or may not already be in it and adding
    /// blindly could double count. Orphans with no matching entry are
    /// counted but left alone.
    pub fn repair_orphans(&self) -> Result<OrphanRepairOutcome, LedgerError> {
        let records = self.daily_repository.list_daily_expenses()?;
        let mut orphaned = 0;
        let mut repaired = 0;

        for record in records {
            if record.status != ReflectionStatus::Orphaned || record.category.trim().is_empty() {
                continue;
            }
            orphaned += 1;

            let category_id = category::derive_id(&record.category, record.ownership);
            match self.entry_repository.get_monthly_entry(&category_id) {
                Ok(Some(_)) => {
                    let mut fixed = record.clone();
                    fixed.status = ReflectionStatus::Reflected {
                        monthly_id: category_id.clone(),
                    };
                    match self.daily_repository.update_daily_expense(&fixed) {
                        Ok(()) => {
                            repaired += 1;
                            info!("restored linkage {} on expense {}", category_id, record.id);
                        }
                        Err(err) => {
                            warn!("failed to repair expense {}: {}", record.id, err);
                        }
                    }
                }
                Ok(None) => {
                    info!(
                        "expense {} derives {} but no such ledger entry exists; leaving it alone",
                        record.id, category_id
                    );
                }
                Err(err) => {
                    warn!(
                        "failed to look up entry {} for expense {}: {}",
                        category_id, record.id, err
                    );
                }
            }
        }

        if orphaned > 0 {
            info!("orphan scan: {} found, {} repaired", orphaned, repaired);
        }
        Ok(OrphanRepairOutcome { orphaned, repaired })
    }

    /// Backfill the month partition field on records missing it.
    ///
    /// Daily expenses derive it from their date. Ledger entries derive it
    /// from their date when one is stored; entries without a date take
    /// `fallback` and have their date set to its first day so later
    /// backfills stay consistent.
    pub fn repair_month_strings(&self, fallback: MonthKey) -> Result<MonthRepairOutcome, LedgerError> {
        let mut daily_repaired = 0;
        for record in self.daily_repository.list_daily_expenses()? {
            if !record.month_string.is_empty() {
                continue;
            }
            let mut fixed = record.clone();
            fixed.month_string = record.derived_month().to_string();
            match self.daily_repository.update_daily_expense(&fixed) {
                Ok(()) => daily_repaired += 1,
                Err(err) => warn!("failed to backfill expense {}: {}", record.id, err),
            }
        }

        let mut monthly_repaired = 0;
        for entry in self.entry_repository.list_monthly_entries()? {
            if !entry.month_string.is_empty() {
                continue;
            }
            let mut fixed = entry.clone();
            match entry.date {
                Some(date) => {
                    fixed.month_string = MonthKey::from_date(date).to_string();
                }
                None => {
                    fixed.month_string = fallback.to_string();
                    fixed.date = Some(fallback.first_day());
                }
            }
            match self.entry_repository.update_monthly_entry(&fixed) {
                Ok(()) => monthly_repaired += 1,
                Err(err) => warn!("failed to backfill entry {}: {}", entry.id, err),
            }
        }

        if daily_repaired > 0 || monthly_repaired > 0 {
            info!(
                "month backfill: {} daily records, {} ledger entries",
                daily_repaired, monthly_repaired
            );
        }
        Ok(MonthRepairOutcome {
            daily_repaired,
            monthly_repaired,
        })
    }
}
