//! Account Repository (Ledger)
//!
//! Owns every balance mutation. Admin-initiated changes write a Deposit
//! audit row in the same transaction as the balance update, so ledger and
//! audit log cannot diverge.

use chrono::Utc;
use rust_decimal::Decimal;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, StoreError, StoreResult, check_transaction, is_already_exists};
use crate::db::models::{Account, Deposit, User};

const ACCOUNT_TABLE: &str = "account";
const DEPOSIT_TABLE: &str = "deposit";
const USER_TABLE: &str = "user";

#[derive(Clone)]
pub struct AccountRepository {
    base: BaseRepository,
}

impl AccountRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create an account with balance 0
    pub async fn create_account(&self, name: &str) -> StoreResult<Account> {
        let created: Option<Account> = self
            .base
            .db()
            .create((ACCOUNT_TABLE, name))
            .content(Account::new(name.to_string()))
            .await
            .map_err(|e| {
                if is_already_exists(&e) {
                    StoreError::Conflict(format!("Account '{}' already exists", name))
                } else {
                    e.into()
                }
            })?;
        created.ok_or_else(|| StoreError::Database("Failed to create account".to_string()))
    }

    pub async fn account_exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.find_account(name).await?.is_some())
    }

    pub async fn find_account(&self, name: &str) -> StoreResult<Option<Account>> {
        let account: Option<Account> = self.base.db().select((ACCOUNT_TABLE, name)).await?;
        Ok(account)
    }

    /// Delete an account
    pub async fn delete_account(&self, name: &str) -> StoreResult<()> {
        let deleted: Option<Account> = self.base.db().delete((ACCOUNT_TABLE, name)).await?;
        if deleted.is_none() {
            return Err(StoreError::NotFound(format!("Account '{}' not found", name)));
        }
        Ok(())
    }

    /// Non-throwing balance lookup: None when the account does not exist
    pub async fn get_balance(&self, name: &str) -> StoreResult<Option<Decimal>> {
        Ok(self.find_account(name).await?.map(|account| account.balance))
    }

    pub async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        let accounts: Vec<Account> = self
            .base
            .db()
            .query("SELECT * FROM account ORDER BY name")
            .await?
            .take(0)?;
        Ok(accounts)
    }

    /// Apply a signed delta to an account balance
    ///
    /// The admin identity is validated against the user store and stamped
    /// into the Deposit audit row. Update and audit row commit together.
    pub async fn change_balance(
        &self,
        account: &str,
        amount: Decimal,
        admin: &str,
    ) -> StoreResult<()> {
        let admin_user: Option<User> = self.base.db().select((USER_TABLE, admin)).await?;
        if admin_user.is_none() {
            return Err(StoreError::NotFound(format!("Admin '{}' not found", admin)));
        }

        let current = self
            .find_account(account)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Account '{}' not found", account)))?;
        let new_balance = current.balance + amount;

        let deposit = Deposit {
            id: None,
            admin: admin.to_string(),
            user: account.to_string(),
            amount,
            timestamp: Utc::now(),
        };

        let response = self
            .base
            .db()
            .query("BEGIN TRANSACTION")
            .query("UPDATE $account SET balance = $balance")
            .bind(("account", RecordId::from_table_key(ACCOUNT_TABLE, account)))
            .bind(("balance", new_balance))
            .query(format!("CREATE {} CONTENT $deposit", DEPOSIT_TABLE))
            .bind(("deposit", deposit))
            .query("COMMIT TRANSACTION")
            .await?;
        check_transaction(response)?;

        tracing::info!(account = %account, %amount, admin = %admin, "Balance changed");
        Ok(())
    }

    /// The append-only audit log of admin balance changes
    pub async fn list_deposits(&self) -> StoreResult<Vec<Deposit>> {
        let deposits: Vec<Deposit> = self
            .base
            .db()
            .query("SELECT * FROM deposit ORDER BY timestamp")
            .await?
            .take(0)?;
        Ok(deposits)
    }
}
