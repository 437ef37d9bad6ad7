//! JSON-backed repository for the `dailyExpenses` collection.

use crate::domain::models::DailyExpense;
use crate::storage::traits::{DailyExpenseStorage, StorageError};

use super::connection::JsonConnection;

#[derive(Clone)]
pub struct DailyExpenseRepository {
    connection: JsonConnection,
}

impl DailyExpenseRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }
}

impl DailyExpenseStorage for DailyExpenseRepository {
    fn store_daily_expense(&self, expense: &DailyExpense) -> Result<(), StorageError> {
        self.connection.mutate(|state| {
            state
                .daily_expenses
                .insert(expense.id.clone(), expense.clone());
            Ok(())
        })
    }

    fn get_daily_expense(&self, id: &str) -> Result<Option<DailyExpense>, StorageError> {
        self.connection
            .with_state(|state| state.daily_expenses.get(id).cloned())
    }

    fn list_daily_expenses(&self) -> Result<Vec<DailyExpense>, StorageError> {
        let mut expenses = self
            .connection
            .with_state(|state| state.daily_expenses.values().cloned().collect::<Vec<_>>())?;
        expenses.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(expenses)
    }

    fn list_daily_expenses_for_month(
        &self,
        month: &str,
    ) -> Result<Vec<DailyExpense>, StorageError> {
        let mut expenses = self.connection.with_state(|state| {
            state
                .daily_expenses
                .values()
                .filter(|e| e.month_string == month)
                .cloned()
                .collect::<Vec<_>>()
        })?;
        expenses.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(expenses)
    }

    fn update_daily_expense(&self, expense: &DailyExpense) -> Result<(), StorageError> {
        self.connection.mutate(|state| {
            if !state.daily_expenses.contains_key(&expense.id) {
                return Err(StorageError::Backend(format!(
                    "update of missing dailyExpenses record {}",
                    expense.id
                )));
            }
            state
                .daily_expenses
                .insert(expense.id.clone(), expense.clone());
            Ok(())
        })
    }

    fn delete_daily_expense(&self, id: &str) -> Result<bool, StorageError> {
        self.connection
            .mutate(|state| Ok(state.daily_expenses.remove(id).is_some()))
    }
}
