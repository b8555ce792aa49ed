//! Bun Class Repository (Catalog)

use rust_decimal::Decimal;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, StoreError, StoreResult, is_already_exists};
use crate::db::models::BunClass;

const BUN_CLASS_TABLE: &str = "bun_class";

#[derive(Clone)]
pub struct BunClassRepository {
    base: BaseRepository,
}

impl BunClassRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Add a bun class to the catalog
    pub async fn add_bun_class(
        &self,
        name: &str,
        price: Decimal,
        mett: f64,
    ) -> StoreResult<BunClass> {
        let created: Option<BunClass> = self
            .base
            .db()
            .create((BUN_CLASS_TABLE, name))
            .content(BunClass::new(name.to_string(), price, mett))
            .await
            .map_err(|e| {
                if is_already_exists(&e) {
                    StoreError::Conflict(format!("Bun class '{}' already exists", name))
                } else {
                    e.into()
                }
            })?;
        created.ok_or_else(|| StoreError::Database("Failed to create bun class".to_string()))
    }

    pub async fn bun_class_exists(&self, name: &str) -> StoreResult<bool> {
        let bun: Option<BunClass> = self.base.db().select((BUN_CLASS_TABLE, name)).await?;
        Ok(bun.is_some())
    }

    /// All bun class names, sorted
    pub async fn list_bun_classes(&self) -> StoreResult<Vec<String>> {
        let names: Vec<String> = self
            .base
            .db()
            .query("SELECT VALUE name FROM bun_class ORDER BY name")
            .await?
            .take(0)?;
        Ok(names)
    }

    /// All catalog entries with price and mett content
    pub async fn list_bun_classes_with_price(&self) -> StoreResult<Vec<BunClass>> {
        let classes: Vec<BunClass> = self
            .base
            .db()
            .query("SELECT * FROM bun_class ORDER BY name")
            .await?
            .take(0)?;
        Ok(classes)
    }

    /// Change the price of a bun class
    ///
    /// Applies to all future processing, including the already-open window.
    pub async fn change_bun_price(&self, name: &str, price: Decimal) -> StoreResult<BunClass> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $bun SET price = $price RETURN AFTER")
            .bind(("bun", RecordId::from_table_key(BUN_CLASS_TABLE, name)))
            .bind(("price", price))
            .await?;
        let updated: Option<BunClass> = result.take(0)?;
        updated.ok_or_else(|| StoreError::NotFound(format!("Bun class '{}' not found", name)))
    }

    /// Change the mett grams of a bun class
    pub async fn change_mett_formula(&self, name: &str, mett: f64) -> StoreResult<BunClass> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $bun SET mett = $mett RETURN AFTER")
            .bind(("bun", RecordId::from_table_key(BUN_CLASS_TABLE, name)))
            .bind(("mett", mett))
            .await?;
        let updated: Option<BunClass> = result.take(0)?;
        updated.ok_or_else(|| StoreError::NotFound(format!("Bun class '{}' not found", name)))
    }
}
