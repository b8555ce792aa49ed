//! Bun Class Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Bun class ID type (record key is the class name)
pub type BunClassId = RecordId;

/// Catalog entry: a bun class with its price and mett content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BunClass {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BunClassId>,
    pub name: String,
    /// Price charged per bun at processing time
    pub price: Decimal,
    /// Grams of mett that go on one bun
    pub mett: f64,
}

impl BunClass {
    pub fn new(name: String, price: Decimal, mett: f64) -> Self {
        Self {
            id: None,
            name,
            price,
            mett,
        }
    }
}
