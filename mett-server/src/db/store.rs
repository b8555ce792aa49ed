//! Store Facade
//!
//! [`MettStore`] composes the ledger, catalog, order engine, purchase
//! workflow and user store into the single interface the HTTP layer and
//! tests consume. All methods delegate; the business rules live in the
//! repositories.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::models::{
    Account, BunClass, BunCounts, Deposit, MettOrder, OrderHistory, Purchase, Role, User,
};
use super::repository::{
    AccountRepository, BunClassRepository, OrderRepository, PurchaseRepository, StoreResult,
    UserRepository,
};
use crate::core::MettConfig;

#[derive(Clone)]
pub struct MettStore {
    accounts: AccountRepository,
    catalog: BunClassRepository,
    orders: OrderRepository,
    purchases: PurchaseRepository,
    users: UserRepository,
}

impl MettStore {
    pub fn new(db: Surreal<Db>, mett: MettConfig) -> Self {
        Self {
            accounts: AccountRepository::new(db.clone()),
            catalog: BunClassRepository::new(db.clone()),
            orders: OrderRepository::new(db.clone(), mett),
            purchases: PurchaseRepository::new(db.clone()),
            users: UserRepository::new(db),
        }
    }

    // ========== Ledger ==========

    pub async fn create_account(&self, name: &str) -> StoreResult<Account> {
        self.accounts.create_account(name).await
    }

    pub async fn account_exists(&self, name: &str) -> StoreResult<bool> {
        self.accounts.account_exists(name).await
    }

    pub async fn delete_account(&self, name: &str) -> StoreResult<()> {
        self.accounts.delete_account(name).await
    }

    pub async fn get_balance(&self, name: &str) -> StoreResult<Option<Decimal>> {
        self.accounts.get_balance(name).await
    }

    pub async fn change_balance(
        &self,
        account: &str,
        amount: Decimal,
        admin: &str,
    ) -> StoreResult<()> {
        self.accounts.change_balance(account, amount, admin).await
    }

    pub async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        self.accounts.list_accounts().await
    }

    pub async fn list_deposits(&self) -> StoreResult<Vec<Deposit>> {
        self.accounts.list_deposits().await
    }

    // ========== Catalog ==========

    pub async fn add_bun_class(
        &self,
        name: &str,
        price: Decimal,
        mett: f64,
    ) -> StoreResult<BunClass> {
        self.catalog.add_bun_class(name, price, mett).await
    }

    pub async fn bun_class_exists(&self, name: &str) -> StoreResult<bool> {
        self.catalog.bun_class_exists(name).await
    }

    pub async fn list_bun_classes(&self) -> StoreResult<Vec<String>> {
        self.catalog.list_bun_classes().await
    }

    pub async fn list_bun_classes_with_price(&self) -> StoreResult<Vec<BunClass>> {
        self.catalog.list_bun_classes_with_price().await
    }

    pub async fn change_bun_price(&self, name: &str, price: Decimal) -> StoreResult<BunClass> {
        self.catalog.change_bun_price(name, price).await
    }

    pub async fn change_mett_formula(&self, name: &str, mett: f64) -> StoreResult<BunClass> {
        self.catalog.change_mett_formula(name, mett).await
    }

    // ========== Order engine ==========

    pub async fn create_order(&self, expiry_date: NaiveDate) -> StoreResult<MettOrder> {
        self.orders.create_order(expiry_date).await
    }

    pub async fn active_order_exists(&self) -> StoreResult<bool> {
        self.orders.active_order_exists().await
    }

    pub async fn current_order_is_expired(&self) -> StoreResult<bool> {
        self.orders.current_order_is_expired().await
    }

    pub async fn order_bun(&self, account: &str, bun_class: &str) -> StoreResult<()> {
        self.orders.order_bun(account, bun_class).await
    }

    pub async fn drop_current_order(&self) -> StoreResult<()> {
        self.orders.drop_current_order().await
    }

    pub async fn process_order(&self) -> StoreResult<()> {
        self.orders.process_order().await
    }

    pub async fn get_current_bun_order(&self, include_spares: bool) -> StoreResult<BunCounts> {
        self.orders.get_current_bun_order(include_spares).await
    }

    pub async fn get_current_user_buns(&self, user: &str) -> StoreResult<BunCounts> {
        self.orders.get_current_user_buns(user).await
    }

    pub async fn get_current_mett_order(&self, include_spares: bool) -> StoreResult<f64> {
        self.orders.get_current_mett_order(include_spares).await
    }

    pub async fn reroute_bun(&self, bun_class: &str, user: &str, target: &str) -> StoreResult<()> {
        self.orders.reroute_bun(bun_class, user, target).await
    }

    pub async fn get_order_history(&self, user: &str) -> StoreResult<OrderHistory> {
        self.orders.get_order_history(user).await
    }

    pub async fn get_all_order_information(&self) -> StoreResult<Vec<MettOrder>> {
        self.orders.get_all_order_information().await
    }

    // ========== Purchase workflow ==========

    pub async fn state_purchase(
        &self,
        account: &str,
        amount: Decimal,
        purpose: &str,
    ) -> StoreResult<Purchase> {
        self.purchases.state_purchase(account, amount, purpose).await
    }

    pub async fn list_purchases(&self, processed: bool) -> StoreResult<Vec<Purchase>> {
        self.purchases.list_purchases(processed).await
    }

    pub async fn find_purchase(&self, id: &str) -> StoreResult<Option<Purchase>> {
        self.purchases.find_purchase(id).await
    }

    pub async fn authorize_purchase(&self, id: &str, admin: &str) -> StoreResult<()> {
        self.purchases.authorize_purchase(id, admin).await
    }

    pub async fn decline_purchase(&self, id: &str, admin: &str) -> StoreResult<()> {
        self.purchases.decline_purchase(id, admin).await
    }

    // ========== Users and roles ==========

    pub async fn create_user(&self, name: &str, password: &str) -> StoreResult<User> {
        self.users.create_user(name, password).await
    }

    pub async fn user_exists(&self, name: &str) -> StoreResult<bool> {
        self.users.user_exists(name).await
    }

    pub async fn get_user(&self, name: &str) -> StoreResult<Option<User>> {
        self.users.get_user(name).await
    }

    pub async fn delete_user(&self, name: &str) -> StoreResult<()> {
        self.users.delete_user(name).await
    }

    pub async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.users.list_users().await
    }

    pub async fn password_is_correct(&self, name: &str, password: &str) -> StoreResult<bool> {
        self.users.password_is_correct(name, password).await
    }

    pub async fn change_password(&self, name: &str, password: &str) -> StoreResult<()> {
        self.users.change_password(name, password).await
    }

    pub async fn create_role(&self, name: &str) -> StoreResult<Role> {
        self.users.create_role(name).await
    }

    pub async fn role_exists(&self, name: &str) -> StoreResult<bool> {
        self.users.role_exists(name).await
    }

    pub async fn add_role_to_user(&self, user: &str, role: &str) -> StoreResult<()> {
        self.users.add_role_to_user(user, role).await
    }

    pub async fn remove_role_from_user(&self, user: &str, role: &str) -> StoreResult<()> {
        self.users.remove_role_from_user(user, role).await
    }
}
