//! Domain model for an aggregated monthly category total.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{ExpenseType, Ownership, DEFAULT_ICON};

/// Aggregated total for one category identity within one month, stored in
/// the `expenses` collection keyed by its category identifier.
///
/// The entry's `amount` always equals the sum of the amounts of the
/// currently-reflected daily expenses linked to `id` within the month; an
/// entry whose sum reaches zero is deleted rather than kept at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyLedgerEntry {
    /// Category identifier; doubles as the document key.
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// The underlying category tag, without any ownership prefix.
    #[serde(default)]
    pub category: String,
    pub amount: i64,
    #[serde(flatten)]
    pub ownership: Ownership,
    #[serde(rename = "type", default)]
    pub expense_type: ExpenseType,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub month_string: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}
