//! # JSON Storage Module
//!
//! File-based document store implementation. The whole store is a single
//! JSON document holding both collections, which makes the atomic
//! transaction primitive a plain temp-file-and-rename commit; see
//! [`connection::JsonConnection`] for the on-disk shape.
//!
//! The domain layer never touches this module directly — it goes through
//! the traits in [`crate::storage::traits`], so this backend can be
//! replaced by any other document store honoring the same contract.

pub mod connection;
pub mod daily_expense_repository;
pub mod monthly_entry_repository;

pub use connection::JsonConnection;
pub use daily_expense_repository::DailyExpenseRepository;
pub use monthly_entry_repository::MonthlyEntryRepository;
