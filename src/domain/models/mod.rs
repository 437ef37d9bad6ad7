//! Domain models for the expense ledger.
//!
//! The persisted document shape is the one the remote store has always used
//! (camelCase field names, `split`/`owner` and `reflected`/`monthlyId`
//! pairs). In memory those pairs are replaced by tagged enums so that the
//! illegal combinations cannot be constructed by normal code; the serde
//! conversions in this module are the only place the raw shape appears.

pub mod daily_expense;
pub mod monthly_entry;

pub use daily_expense::{DailyExpense, ReflectionStatus};
pub use monthly_entry::MonthlyLedgerEntry;

use serde::{Deserialize, Serialize};

/// Icon used when a contributing expense carries none of its own.
pub(crate) const DEFAULT_ICON: &str = "💰";

/// The two parties sharing the household.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Owner {
    Me,
    Partner,
}

/// Who carries an expense.
///
/// Replaces the stored `split: bool` / `owner: Option<Owner>` pair. The
/// invariant `split == true ⇔ owner == null` holds by construction here;
/// a legacy record with `split == false` and no owner loads as `Shared`,
/// which derives the same unprefixed category identifier the original
/// fall-through produced for that shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawOwnership", into = "RawOwnership")]
pub enum Ownership {
    Shared,
    Individual(Owner),
}

impl Ownership {
    pub fn is_split(&self) -> bool {
        matches!(self, Ownership::Shared)
    }

    pub fn owner(&self) -> Option<Owner> {
        match self {
            Ownership::Shared => None,
            Ownership::Individual(owner) => Some(*owner),
        }
    }
}

/// Stored representation of [`Ownership`]; flattened into both document
/// types.
#[derive(Serialize, Deserialize)]
struct RawOwnership {
    #[serde(default)]
    split: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    owner: Option<Owner>,
}

impl From<RawOwnership> for Ownership {
    fn from(raw: RawOwnership) -> Self {
        match (raw.split, raw.owner) {
            (false, Some(owner)) => Ownership::Individual(owner),
            _ => Ownership::Shared,
        }
    }
}

impl From<Ownership> for RawOwnership {
    fn from(ownership: Ownership) -> Self {
        match ownership {
            Ownership::Shared => RawOwnership { split: true, owner: None },
            Ownership::Individual(owner) => RawOwnership {
                split: false,
                owner: Some(owner),
            },
        }
    }
}

/// Fixed versus variable cost. Informational only: reconciliation math
/// never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseType {
    Fixed,
    #[default]
    Variable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ownership_round_trips_through_raw_pair() {
        for ownership in [
            Ownership::Shared,
            Ownership::Individual(Owner::Me),
            Ownership::Individual(Owner::Partner),
        ] {
            let json = serde_json::to_value(ownership).unwrap();
            let back: Ownership = serde_json::from_value(json).unwrap();
            assert_eq!(back, ownership);
        }
    }

    #[test]
    fn shared_serializes_as_split_true_without_owner() {
        let json = serde_json::to_value(Ownership::Shared).unwrap();
        assert_eq!(json, serde_json::json!({ "split": true }));
    }

    #[test]
    fn ownerless_individual_record_normalizes_to_shared() {
        // Legacy shape the original app tolerated; it derived the unprefixed
        // category id for it, which is what Shared derives too.
        let raw = serde_json::json!({ "split": false, "owner": null });
        let ownership: Ownership = serde_json::from_value(raw).unwrap();
        assert_eq!(ownership, Ownership::Shared);
    }
}
