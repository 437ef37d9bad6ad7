//! # Storage Module
//!
//! Handles persistence for the expense ledger.
//!
//! The domain layer depends only on the abstractions in [`traits`]: two
//! per-collection repositories and a connection exposing an atomic
//! read-modify-write primitive. [`json`] provides the concrete file-backed
//! document store; swapping in a different backend means implementing the
//! same traits, not changing domain code.

pub mod json;
pub mod traits;

pub use json::JsonConnection;
pub use traits::{
    Connection, DailyExpenseStorage, MonthlyEntryStorage, StorageError, StoreTransaction,
};
