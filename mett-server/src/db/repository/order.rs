//! Order Repository (Order Engine)
//!
//! Owns the order window lifecycle: at most one order is unprocessed at any
//! time, buns are appended to it until it expires, and processing charges
//! every line item at the price valid at processing time.
//!
//! The single-active-order invariant is enforced inside the insert
//! transaction with a THROW guard, as is the double-processing guard. Two
//! racing `create_order` calls can still both pass the application-level
//! expiry check, but only one insert commits.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, StoreError, StoreResult, check_transaction};
use crate::core::MettConfig;
use crate::db::models::{Account, BunClass, BunCounts, MettOrder, OrderHistory, OrderedBun};
use crate::utils::time;

const ORDER_TABLE: &str = "mett_order";
const ACCOUNT_TABLE: &str = "account";
const BUN_CLASS_TABLE: &str = "bun_class";

// Sentinels thrown by transaction guards
const ACTIVE_ORDER_EXISTS: &str = "active order already exists";
const ORDER_ALREADY_PROCESSED: &str = "order already processed";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
    mett: MettConfig,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>, mett: MettConfig) -> Self {
        Self {
            base: BaseRepository::new(db),
            mett,
        }
    }

    /// The single unprocessed order, if one exists
    async fn find_active(&self) -> StoreResult<Option<MettOrder>> {
        let orders: Vec<MettOrder> = self
            .base
            .db()
            .query("SELECT * FROM mett_order WHERE processed = false LIMIT 1")
            .await?
            .take(0)?;
        Ok(orders.into_iter().next())
    }

    async fn require_active(&self) -> StoreResult<MettOrder> {
        self.find_active()
            .await?
            .ok_or_else(|| StoreError::NotFound("No active order".to_string()))
    }

    fn order_record_id(order: &MettOrder) -> StoreResult<RecordId> {
        order
            .id
            .clone()
            .ok_or_else(|| StoreError::Database("Order record has no id".to_string()))
    }

    /// Open a new order window
    ///
    /// Fails with `Validation` when the expiry instant (date + cutoff) is
    /// already past, and with `Conflict` when a window is already open. The
    /// conflict check runs inside the insert transaction.
    pub async fn create_order(&self, expiry_date: NaiveDate) -> StoreResult<MettOrder> {
        if time::has_expired(expiry_date, self.mett.expiry_cutoff) {
            return Err(StoreError::Validation(format!(
                "Expiry date {} is already in the past",
                expiry_date
            )));
        }

        let response = self
            .base
            .db()
            .query("BEGIN TRANSACTION")
            .query("LET $active = (SELECT VALUE id FROM mett_order WHERE processed = false)")
            .query(format!(
                "IF array::len($active) > 0 {{ THROW '{}' }}",
                ACTIVE_ORDER_EXISTS
            ))
            .query(format!("CREATE {} CONTENT $order", ORDER_TABLE))
            .bind(("order", MettOrder::new(expiry_date)))
            .query("COMMIT TRANSACTION")
            .await?;
        check_transaction(response)?;

        tracing::info!(expiry = %expiry_date, "Order window opened");
        self.require_active().await
    }

    pub async fn active_order_exists(&self) -> StoreResult<bool> {
        Ok(self.find_active().await?.is_some())
    }

    /// Whether the active window has passed its expiry cutoff
    pub async fn current_order_is_expired(&self) -> StoreResult<bool> {
        let order = self.require_active().await?;
        Ok(time::has_expired(order.expiry_date, self.mett.expiry_cutoff))
    }

    /// Append one bun to the active order
    ///
    /// One line item per call; callers loop to order several buns of the
    /// same class.
    pub async fn order_bun(&self, account: &str, bun_class: &str) -> StoreResult<()> {
        let known_account: Option<Account> =
            self.base.db().select((ACCOUNT_TABLE, account)).await?;
        if known_account.is_none() {
            return Err(StoreError::NotFound(format!(
                "Account '{}' not found",
                account
            )));
        }
        let known_bun: Option<BunClass> =
            self.base.db().select((BUN_CLASS_TABLE, bun_class)).await?;
        if known_bun.is_none() {
            return Err(StoreError::NotFound(format!(
                "Bun class '{}' not found",
                bun_class
            )));
        }

        let order = self.require_active().await?;
        if time::has_expired(order.expiry_date, self.mett.expiry_cutoff) {
            return Err(StoreError::Expired(format!(
                "Order window closed on {}",
                order.expiry_date
            )));
        }

        self.base
            .db()
            .query("UPDATE $order SET buns += $bun WHERE processed = false")
            .bind(("order", Self::order_record_id(&order)?))
            .bind((
                "bun",
                OrderedBun {
                    account: account.to_string(),
                    bun: bun_class.to_string(),
                },
            ))
            .await?
            .check()?;
        Ok(())
    }

    /// Delete the active order without touching any balance
    pub async fn drop_current_order(&self) -> StoreResult<()> {
        let order = self.require_active().await?;
        self.base
            .db()
            .query("DELETE $order")
            .bind(("order", Self::order_record_id(&order)?))
            .await?
            .check()?;
        tracing::info!(expiry = %order.expiry_date, "Order window dropped");
        Ok(())
    }

    /// Charge the active order and mark it processed
    ///
    /// Every line item is charged at the price valid now, not at order
    /// time. All account updates and the processed flip commit in one
    /// transaction; a guard aborts if the order was processed concurrently.
    pub async fn process_order(&self) -> StoreResult<()> {
        let order = self.require_active().await?;
        let order_id = Self::order_record_id(&order)?;

        let prices = self.price_map().await?;

        // Aggregate the charge per account
        let mut totals: HashMap<String, Decimal> = HashMap::new();
        for line in &order.buns {
            let price = prices.get(&line.bun).ok_or_else(|| {
                StoreError::NotFound(format!("Bun class '{}' not found", line.bun))
            })?;
            *totals.entry(line.account.clone()).or_insert(Decimal::ZERO) += *price;
        }

        // New balances, computed before the write transaction
        let mut updates: Vec<(String, Decimal)> = Vec::with_capacity(totals.len());
        for (account, total) in &totals {
            let current: Option<Account> =
                self.base.db().select((ACCOUNT_TABLE, account.as_str())).await?;
            let current = current.ok_or_else(|| {
                StoreError::NotFound(format!("Account '{}' not found", account))
            })?;
            updates.push((account.clone(), current.balance - *total));
        }

        let mut query = self.base.db().query("BEGIN TRANSACTION");
        for (index, (account, balance)) in updates.iter().enumerate() {
            query = query
                .query(format!(
                    "UPDATE $account_{index} SET balance = $balance_{index}"
                ))
                .bind((
                    format!("account_{index}"),
                    RecordId::from_table_key(ACCOUNT_TABLE, account.as_str()),
                ))
                .bind((format!("balance_{index}"), *balance));
        }
        query = query
            .query(
                "LET $flipped = (UPDATE mett_order SET processed = true \
                 WHERE id = $order_id AND processed = false RETURN AFTER)",
            )
            .bind(("order_id", order_id))
            .query(format!(
                "IF array::len($flipped) == 0 {{ THROW '{}' }}",
                ORDER_ALREADY_PROCESSED
            ))
            .query("COMMIT TRANSACTION");

        check_transaction(query.await?)?;

        tracing::info!(
            buns = order.buns.len(),
            accounts = updates.len(),
            "Order processed"
        );
        Ok(())
    }

    /// Aggregated bun counts of the active order, all accounts
    pub async fn get_current_bun_order(&self, include_spares: bool) -> StoreResult<BunCounts> {
        let order = self.require_active().await?;
        let classes = self.catalog().await?;
        let mut counts = aggregate(&order.buns, &classes, None);
        if include_spares {
            self.apply_spares(&mut counts);
        }
        Ok(counts)
    }

    /// Aggregated bun counts of the active order for one account, no spares
    pub async fn get_current_user_buns(&self, user: &str) -> StoreResult<BunCounts> {
        let known_account: Option<Account> = self.base.db().select((ACCOUNT_TABLE, user)).await?;
        if known_account.is_none() {
            return Err(StoreError::NotFound(format!("Account '{}' not found", user)));
        }
        let order = self.require_active().await?;
        let classes = self.catalog().await?;
        Ok(aggregate(&order.buns, &classes, Some(user)))
    }

    /// Grams of mett needed for the (optionally spare-adjusted) bun order
    pub async fn get_current_mett_order(&self, include_spares: bool) -> StoreResult<f64> {
        let counts = self.get_current_bun_order(include_spares).await?;
        let classes = self.catalog().await?;
        let grams: HashMap<&str, f64> = classes
            .iter()
            .map(|class| (class.name.as_str(), class.mett))
            .collect();
        Ok(counts
            .iter()
            .map(|(name, count)| grams.get(name.as_str()).copied().unwrap_or(0.0) * *count as f64)
            .sum())
    }

    /// Reassign the first matching line item from `user` to `target`
    pub async fn reroute_bun(&self, bun_class: &str, user: &str, target: &str) -> StoreResult<()> {
        let known_target: Option<Account> = self.base.db().select((ACCOUNT_TABLE, target)).await?;
        if known_target.is_none() {
            return Err(StoreError::NotFound(format!(
                "Account '{}' not found",
                target
            )));
        }

        let order = self.require_active().await?;
        let mut buns = order.buns.clone();
        let position = buns
            .iter()
            .position(|line| line.account == user && line.bun == bun_class)
            .ok_or_else(|| {
                StoreError::Validation(format!(
                    "'{}' has no '{}' on the current order",
                    user, bun_class
                ))
            })?;
        buns[position].account = target.to_string();

        self.base
            .db()
            .query("UPDATE $order SET buns = $buns WHERE processed = false")
            .bind(("order", Self::order_record_id(&order)?))
            .bind(("buns", buns))
            .await?
            .check()?;
        Ok(())
    }

    /// Per-class mean counts over the processed orders `user` took part in
    ///
    /// The denominator is the number of processed orders in which the user
    /// ordered at least one bun, not the number of all processed orders.
    pub async fn get_order_history(&self, user: &str) -> StoreResult<OrderHistory> {
        let known_account: Option<Account> = self.base.db().select((ACCOUNT_TABLE, user)).await?;
        if known_account.is_none() {
            return Err(StoreError::NotFound(format!("Account '{}' not found", user)));
        }

        let processed: Vec<MettOrder> = self
            .base
            .db()
            .query("SELECT * FROM mett_order WHERE processed = true")
            .await?
            .take(0)?;
        let classes = self.catalog().await?;

        let mut sums: BunCounts = classes.iter().map(|class| (class.name.clone(), 0)).collect();
        let mut participated = 0u64;
        let mut total_sum = 0u64;
        for order in &processed {
            let counts = aggregate(&order.buns, &classes, Some(user));
            let total: u64 = counts.values().sum();
            if total == 0 {
                continue;
            }
            participated += 1;
            total_sum += total;
            for (name, count) in counts {
                *sums.entry(name).or_insert(0) += count;
            }
        }

        let divisor = participated.max(1) as f64;
        Ok(OrderHistory {
            means: sums
                .into_iter()
                .map(|(name, sum)| (name, sum as f64 / divisor))
                .collect(),
            total_mean: total_sum as f64 / divisor,
            orders_participated: participated,
        })
    }

    /// All orders, processed and unprocessed, for display
    pub async fn get_all_order_information(&self) -> StoreResult<Vec<MettOrder>> {
        let orders: Vec<MettOrder> = self
            .base
            .db()
            .query("SELECT * FROM mett_order ORDER BY expiry_date")
            .await?
            .take(0)?;
        Ok(orders)
    }

    async fn catalog(&self) -> StoreResult<Vec<BunClass>> {
        let classes: Vec<BunClass> = self
            .base
            .db()
            .query("SELECT * FROM bun_class ORDER BY name")
            .await?
            .take(0)?;
        Ok(classes)
    }

    async fn price_map(&self) -> StoreResult<HashMap<String, Decimal>> {
        Ok(self
            .catalog()
            .await?
            .into_iter()
            .map(|class| (class.name, class.price))
            .collect())
    }

    /// Spare-bun adjustment for physical packaging: buns come in pairs.
    ///
    /// An odd half-bun count is rounded up to the next pair and eats one of
    /// the configured spares; otherwise the full spare count is added to the
    /// default spare class.
    fn apply_spares(&self, counts: &mut BunCounts) {
        let spare_count = self.mett.spare_count;
        let odd_half_buns = self
            .mett
            .half_bun()
            .is_some_and(|half| counts.get(half).copied().unwrap_or(0) % 2 == 1);

        if odd_half_buns {
            let half = self.mett.half_bun().unwrap_or_default().to_string();
            *counts.entry(half).or_insert(0) += 1;
            *counts.entry(self.mett.default_spare.clone()).or_insert(0) +=
                spare_count.saturating_sub(1);
        } else {
            *counts.entry(self.mett.default_spare.clone()).or_insert(0) += spare_count;
        }
    }
}

/// Count line items per catalog class, optionally for a single account.
///
/// Every catalog class is present in the result, zero-count classes
/// included.
fn aggregate(lines: &[OrderedBun], classes: &[BunClass], account: Option<&str>) -> BunCounts {
    let mut counts: BunCounts = classes.iter().map(|class| (class.name.clone(), 0)).collect();
    for line in lines {
        if account.is_none_or(|name| name == line.account)
            && let Some(count) = counts.get_mut(&line.bun)
        {
            *count += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn classes() -> Vec<BunClass> {
        ["Weizen", "Roggen", "Roeggelchen"]
            .iter()
            .map(|name| BunClass::new(name.to_string(), Decimal::new(100, 2), 66.0))
            .collect()
    }

    fn line(account: &str, bun: &str) -> OrderedBun {
        OrderedBun {
            account: account.to_string(),
            bun: bun.to_string(),
        }
    }

    fn repo_config(half_buns: &[&str], spare_count: u64) -> MettConfig {
        MettConfig {
            expiry_cutoff: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            default_buns: vec!["Weizen".into(), "Roggen".into(), "Roeggelchen".into()],
            default_price: Decimal::new(100, 2),
            default_mett_grams: 66.0,
            half_buns: half_buns.iter().map(|s| s.to_string()).collect(),
            default_spare: "Weizen".into(),
            spare_count,
        }
    }

    fn spare_adjusted(lines: &[OrderedBun], half_buns: &[&str], spare_count: u64) -> BunCounts {
        // apply_spares is private; exercise it through a detached repository
        // instance that never touches the database
        let repo = OrderRepository {
            base: BaseRepository::new(Surreal::init()),
            mett: repo_config(half_buns, spare_count),
        };
        let mut counts = aggregate(lines, &classes(), None);
        repo.apply_spares(&mut counts);
        counts
    }

    #[test]
    fn test_aggregate_includes_zero_classes() {
        let counts = aggregate(&[line("alice", "Weizen")], &classes(), None);
        assert_eq!(counts["Weizen"], 1);
        assert_eq!(counts["Roggen"], 0);
        assert_eq!(counts["Roeggelchen"], 0);
    }

    #[test]
    fn test_aggregate_filters_by_account() {
        let lines = [line("alice", "Weizen"), line("bob", "Weizen")];
        let counts = aggregate(&lines, &classes(), Some("alice"));
        assert_eq!(counts["Weizen"], 1);
    }

    #[test]
    fn test_spares_without_half_bun_add_full_spare_count() {
        let counts = spare_adjusted(&[line("alice", "Weizen")], &[], 2);
        assert_eq!(counts["Weizen"], 3);
        assert_eq!(counts["Roggen"], 0);
    }

    #[test]
    fn test_odd_half_bun_count_is_rounded_up() {
        let lines = [line("alice", "Weizen"), line("alice", "Roeggelchen")];
        let counts = spare_adjusted(&lines, &["Roeggelchen"], 2);
        // Half bun balanced to a pair, one spare eaten by the compensation
        assert_eq!(counts["Roeggelchen"], 2);
        assert_eq!(counts["Weizen"], 2);
    }

    #[test]
    fn test_even_half_bun_count_keeps_all_spares() {
        let lines = [line("alice", "Roeggelchen"), line("bob", "Roeggelchen")];
        let counts = spare_adjusted(&lines, &["Roeggelchen"], 2);
        assert_eq!(counts["Roeggelchen"], 2);
        assert_eq!(counts["Weizen"], 2);
    }

    #[test]
    fn test_spare_compensation_never_underflows() {
        let counts = spare_adjusted(&[line("alice", "Roeggelchen")], &["Roeggelchen"], 0);
        assert_eq!(counts["Roeggelchen"], 2);
        assert_eq!(counts["Weizen"], 0);
    }
}
