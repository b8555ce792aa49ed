//! Purchase Repository (Reimbursement Workflow)
//!
//! A purchase moves from pending to authorized or declined exactly once.
//! The single-resolution guard runs inside the write transaction, so a
//! racing second resolution aborts instead of crediting twice.

use chrono::Utc;
use rust_decimal::Decimal;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, StoreError, StoreResult, check_transaction};
use crate::db::models::{Account, Purchase, User};

const PURCHASE_TABLE: &str = "purchase";
const ACCOUNT_TABLE: &str = "account";
const USER_TABLE: &str = "user";

const PURCHASE_ALREADY_RESOLVED: &str = "purchase already resolved";

#[derive(Clone)]
pub struct PurchaseRepository {
    base: BaseRepository,
}

impl PurchaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// File a reimbursement claim; starts out pending
    pub async fn state_purchase(
        &self,
        account: &str,
        amount: Decimal,
        purpose: &str,
    ) -> StoreResult<Purchase> {
        let known_account: Option<Account> =
            self.base.db().select((ACCOUNT_TABLE, account)).await?;
        if known_account.is_none() {
            return Err(StoreError::NotFound(format!(
                "Account '{}' not found",
                account
            )));
        }

        let created: Option<Purchase> = self
            .base
            .db()
            .create(PURCHASE_TABLE)
            .content(Purchase::new(
                account.to_string(),
                amount,
                purpose.to_string(),
            ))
            .await?;
        created.ok_or_else(|| StoreError::Database("Failed to create purchase".to_string()))
    }

    /// List purchases by state: pending (false) or resolved (true)
    pub async fn list_purchases(&self, processed: bool) -> StoreResult<Vec<Purchase>> {
        let purchases: Vec<Purchase> = self
            .base
            .db()
            .query("SELECT * FROM purchase WHERE processed = $processed ORDER BY timestamp")
            .bind(("processed", processed))
            .await?
            .take(0)?;
        Ok(purchases)
    }

    pub async fn find_purchase(&self, id: &str) -> StoreResult<Option<Purchase>> {
        let purchase: Option<Purchase> = self.base.db().select((PURCHASE_TABLE, id)).await?;
        Ok(purchase)
    }

    /// Authorize a pending purchase: credit the amount and stamp the admin
    pub async fn authorize_purchase(&self, id: &str, admin: &str) -> StoreResult<()> {
        let purchase = self.require_pending(id, admin).await?;

        let account: Option<Account> = self
            .base
            .db()
            .select((ACCOUNT_TABLE, purchase.account.as_str()))
            .await?;
        let account = account.ok_or_else(|| {
            StoreError::NotFound(format!("Account '{}' not found", purchase.account))
        })?;
        let new_balance = account.balance + purchase.amount;

        let response = self
            .base
            .db()
            .query("BEGIN TRANSACTION")
            .query(
                "LET $resolved = (UPDATE $purchase \
                 SET processed = true, authorized = true, by = $admin, at = $at \
                 WHERE processed = false RETURN AFTER)",
            )
            .bind(("purchase", RecordId::from_table_key(PURCHASE_TABLE, id)))
            .bind(("admin", admin.to_string()))
            .bind(("at", Utc::now()))
            .query(format!(
                "IF array::len($resolved) == 0 {{ THROW '{}' }}",
                PURCHASE_ALREADY_RESOLVED
            ))
            .query("UPDATE $account SET balance = $balance")
            .bind((
                "account",
                RecordId::from_table_key(ACCOUNT_TABLE, purchase.account.as_str()),
            ))
            .bind(("balance", new_balance))
            .query("COMMIT TRANSACTION")
            .await?;
        check_transaction(response)?;

        tracing::info!(
            purchase = %id,
            account = %purchase.account,
            amount = %purchase.amount,
            admin = %admin,
            "Purchase authorized"
        );
        Ok(())
    }

    /// Decline a pending purchase; no balance effect
    pub async fn decline_purchase(&self, id: &str, admin: &str) -> StoreResult<()> {
        let purchase = self.require_pending(id, admin).await?;

        let response = self
            .base
            .db()
            .query("BEGIN TRANSACTION")
            .query(
                "LET $resolved = (UPDATE $purchase \
                 SET processed = true, authorized = false, by = $admin, at = $at \
                 WHERE processed = false RETURN AFTER)",
            )
            .bind(("purchase", RecordId::from_table_key(PURCHASE_TABLE, id)))
            .bind(("admin", admin.to_string()))
            .bind(("at", Utc::now()))
            .query(format!(
                "IF array::len($resolved) == 0 {{ THROW '{}' }}",
                PURCHASE_ALREADY_RESOLVED
            ))
            .query("COMMIT TRANSACTION")
            .await?;
        check_transaction(response)?;

        tracing::info!(purchase = %id, account = %purchase.account, admin = %admin, "Purchase declined");
        Ok(())
    }

    /// Shared preconditions of both resolutions: purchase exists and is
    /// pending, admin identity is known
    async fn require_pending(&self, id: &str, admin: &str) -> StoreResult<Purchase> {
        let admin_user: Option<User> = self.base.db().select((USER_TABLE, admin)).await?;
        if admin_user.is_none() {
            return Err(StoreError::NotFound(format!("Admin '{}' not found", admin)));
        }

        let purchase = self
            .find_purchase(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Purchase '{}' not found", id)))?;
        if purchase.processed {
            return Err(StoreError::Conflict(format!(
                "Purchase '{}' is already resolved",
                id
            )));
        }
        Ok(purchase)
    }
}
