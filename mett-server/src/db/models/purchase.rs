//! Purchase Model
//!
//! A purchase is a reimbursement claim: a user paid for something (usually
//! the mett) and wants the amount credited to their account. It stays
//! pending until an admin authorizes or declines it, exactly once.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Purchase ID type
pub type PurchaseId = RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PurchaseId>,
    pub account: String,
    pub amount: Decimal,
    pub purpose: String,
    pub timestamp: DateTime<Utc>,
    /// Resolved flag; flips to true exactly once
    pub processed: bool,
    /// Some(true) = authorized (credited), Some(false) = declined
    #[serde(default)]
    pub authorized: Option<bool>,
    /// Admin who resolved the purchase
    #[serde(default)]
    pub by: Option<String>,
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
}

impl Purchase {
    pub fn new(account: String, amount: Decimal, purpose: String) -> Self {
        Self {
            id: None,
            account,
            amount,
            purpose,
            timestamp: Utc::now(),
            processed: false,
            authorized: None,
            by: None,
            at: None,
        }
    }
}
