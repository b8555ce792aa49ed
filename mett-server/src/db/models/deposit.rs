//! Deposit Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Audit row for an admin balance change, append-only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deposit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Admin who booked the change
    pub admin: String,
    /// Account the change was booked against
    pub user: String,
    /// Signed delta
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
}
