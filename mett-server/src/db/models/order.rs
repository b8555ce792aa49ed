//! Order Model
//!
//! An order is the shared window everyone orders buns into. At most one
//! order is active (processed = false) at any time; processing it charges
//! every line item against its account and closes the window for good.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Order ID type
pub type OrderId = RecordId;

/// One ordered bun: who ordered which class
///
/// Line items keep their insertion order; rerouting reassigns the first
/// matching item only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedBun {
    pub account: String,
    pub bun: String,
}

/// The order window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MettOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OrderId>,
    /// The window closes at the configured cutoff time on this date
    pub expiry_date: NaiveDate,
    /// Processed orders are terminal and kept for history
    pub processed: bool,
    #[serde(default)]
    pub buns: Vec<OrderedBun>,
}

impl MettOrder {
    pub fn new(expiry_date: NaiveDate) -> Self {
        Self {
            id: None,
            expiry_date,
            processed: false,
            buns: Vec::new(),
        }
    }
}

/// Aggregated bun counts per class, every catalog class present
pub type BunCounts = BTreeMap<String, u64>;

/// Per-class mean counts over the processed orders a user took part in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderHistory {
    /// Mean count per bun class; denominator is `orders_participated`
    pub means: BTreeMap<String, f64>,
    /// Mean total buns per participated order
    pub total_mean: f64,
    /// Number of processed orders the user ordered at least one bun in
    pub orders_participated: u64,
}
