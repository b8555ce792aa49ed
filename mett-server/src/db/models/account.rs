//! Account Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Account ID type (record key is the account name)
pub type AccountId = RecordId;

/// Ledger account
///
/// The balance is the only mutable field and is only ever touched by the
/// ledger operations: admin balance changes, order processing and purchase
/// authorization. It may go negative - the ledger is a tab, not a wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AccountId>,
    pub name: String,
    pub balance: Decimal,
}

impl Account {
    pub fn new(name: String) -> Self {
        Self {
            id: None,
            name,
            balance: Decimal::ZERO,
        }
    }
}
