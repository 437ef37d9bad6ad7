//! JSON-backed repository for the `expenses` collection of monthly ledger
//! entries.

use crate::domain::models::MonthlyLedgerEntry;
use crate::storage::traits::{MonthlyEntryStorage, StorageError};

use super::connection::JsonConnection;

#[derive(Clone)]
pub struct MonthlyEntryRepository {
    connection: JsonConnection,
}

impl MonthlyEntryRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }
}

impl MonthlyEntryStorage for MonthlyEntryRepository {
    fn store_monthly_entry(&self, entry: &MonthlyLedgerEntry) -> Result<(), StorageError> {
        self.connection.mutate(|state| {
            state.expenses.insert(entry.id.clone(), entry.clone());
            Ok(())
        })
    }

    fn get_monthly_entry(&self, id: &str) -> Result<Option<MonthlyLedgerEntry>, StorageError> {
        self.connection
            .with_state(|state| state.expenses.get(id).cloned())
    }

    fn list_monthly_entries(&self) -> Result<Vec<MonthlyLedgerEntry>, StorageError> {
        self.connection
            .with_state(|state| state.expenses.values().cloned().collect())
    }

    fn list_monthly_entries_for_month(
        &self,
        month: &str,
    ) -> Result<Vec<MonthlyLedgerEntry>, StorageError> {
        self.connection.with_state(|state| {
            state
                .expenses
                .values()
                .filter(|e| e.month_string == month)
                .cloned()
                .collect()
        })
    }

    fn update_monthly_entry(&self, entry: &MonthlyLedgerEntry) -> Result<(), StorageError> {
        self.connection.mutate(|state| {
            if !state.expenses.contains_key(&entry.id) {
                return Err(StorageError::Backend(format!(
                    "update of missing expenses record {}",
                    entry.id
                )));
            }
            state.expenses.insert(entry.id.clone(), entry.clone());
            Ok(())
        })
    }

    fn delete_monthly_entry(&self, id: &str) -> Result<bool, StorageError> {
        self.connection
            .mutate(|state| Ok(state.expenses.remove(id).is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ExpenseType, Ownership};

    fn entry(id: &str, month: &str, amount: i64) -> MonthlyLedgerEntry {
        MonthlyLedgerEntry {
            id: id.to_string(),
            name: id.to_string(),
            category: id.to_string(),
            amount,
            ownership: Ownership::Shared,
            expense_type: ExpenseType::Variable,
            icon: "💰".to_string(),
            month_string: month.to_string(),
            date: None,
            last_updated: None,
        }
    }

    fn repository() -> (MonthlyEntryRepository, tempfile::TempDir) {
        let dir = tempfile::TempDir::new().unwrap();
        let connection = JsonConnection::new(dir.path()).unwrap();
        (MonthlyEntryRepository::new(connection), dir)
    }

    #[test]
    fn keyed_by_category_identifier() {
        let (repo, _dir) = repository();
        repo.store_monthly_entry(&entry("grocery", "2025-03", 1000)).unwrap();
        repo.store_monthly_entry(&entry("my_grocery", "2025-03", 500)).unwrap();

        assert_eq!(repo.get_monthly_entry("grocery").unwrap().unwrap().amount, 1000);
        assert_eq!(repo.get_monthly_entry("my_grocery").unwrap().unwrap().amount, 500);
        assert!(repo.get_monthly_entry("partner_grocery").unwrap().is_none());
    }

    #[test]
    fn month_query_filters_on_month_string() {
        let (repo, _dir) = repository();
        repo.store_monthly_entry(&entry("grocery", "2025-03", 1000)).unwrap();
        repo.store_monthly_entry(&entry("rent", "2025-04", 100000)).unwrap();

        let march = repo.list_monthly_entries_for_month("2025-03").unwrap();
        assert_eq!(march.len(), 1);
        assert_eq!(march[0].id, "grocery");
    }

    #[test]
    fn delete_reports_whether_an_entry_existed() {
        let (repo, _dir) = repository();
        repo.store_monthly_entry(&entry("grocery", "2025-03", 1000)).unwrap();
        assert!(repo.delete_monthly_entry("grocery").unwrap());
        assert!(!repo.delete_monthly_entry("grocery").unwrap());
    }
}
