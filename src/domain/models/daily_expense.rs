//! Domain model for a single spending event.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use super::{ExpenseType, Ownership, DEFAULT_ICON};
use crate::domain::month::MonthKey;

/// Reconciliation state of a daily expense.
///
/// Replaces the stored `reflected: bool` / `monthlyId: Option<String>` pair.
/// `Orphaned` is the partial-failure shape (marked reflected, no recorded
/// linkage); nothing in the normal flow constructs it — it can only arrive
/// by deserializing a record a broken commit left behind, and only the
/// repair service resolves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawReflection", into = "RawReflection")]
pub enum ReflectionStatus {
    Unreflected,
    Reflected { monthly_id: String },
    Orphaned,
}

impl ReflectionStatus {
    pub fn is_reflected(&self) -> bool {
        !matches!(self, ReflectionStatus::Unreflected)
    }

    /// The recorded ledger linkage, if any.
    pub fn monthly_id(&self) -> Option<&str> {
        match self {
            ReflectionStatus::Reflected { monthly_id } => Some(monthly_id),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReflection {
    #[serde(default)]
    reflected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    monthly_id: Option<String>,
}

impl From<RawReflection> for ReflectionStatus {
    fn from(raw: RawReflection) -> Self {
        match (raw.reflected, raw.monthly_id) {
            (false, _) => ReflectionStatus::Unreflected,
            (true, Some(monthly_id)) => ReflectionStatus::Reflected { monthly_id },
            (true, None) => ReflectionStatus::Orphaned,
        }
    }
}

impl From<ReflectionStatus> for RawReflection {
    fn from(status: ReflectionStatus) -> Self {
        match status {
            ReflectionStatus::Unreflected => RawReflection {
                reflected: false,
                monthly_id: None,
            },
            ReflectionStatus::Reflected { monthly_id } => RawReflection {
                reflected: true,
                monthly_id: Some(monthly_id),
            },
            ReflectionStatus::Orphaned => RawReflection {
                reflected: true,
                monthly_id: None,
            },
        }
    }
}

/// A single spending event, stored in the `dailyExpenses` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyExpense {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub amount: i64,
    #[serde(flatten)]
    pub ownership: Ownership,
    #[serde(rename = "type", default)]
    pub expense_type: ExpenseType,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub month_string: String,
    #[serde(flatten)]
    pub status: ReflectionStatus,
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

impl DailyExpense {
    /// Generate a unique expense ID from the current timestamp.
    /// Format: exp-<timestamp_ms>-<random_suffix>, e.g. exp-1625846400123-af3c
    pub fn generate_id(timestamp_ms: u64) -> String {
        format!("exp-{}-{}", timestamp_ms, Self::generate_random_suffix(4))
    }

    fn generate_random_suffix(len: usize) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        format!("{:x}", now % (16_u128.pow(len as u32)))
            .chars()
            .take(len)
            .collect()
    }

    /// The month this expense's date falls in. The stored `month_string`
    /// should always agree with this; the repair service backfills records
    /// where it is missing.
    pub fn derived_month(&self) -> MonthKey {
        MonthKey::from_date(self.date)
    }
}
