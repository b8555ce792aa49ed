//! Startup seeding
//!
//! Creates the roles, the default admin (user + account) and the bun
//! catalog on first start. Safe to run on every boot: the catalog is only
//! seeded while empty, everything else is guarded by existence checks.

use anyhow::Context;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::store::MettStore;
use crate::core::Config;

pub const ADMIN_ROLE: &str = "admin";

pub async fn seed(db: &Surreal<Db>, config: &Config) -> anyhow::Result<()> {
    config.mett.validate().context("Invalid mett configuration")?;

    let store = MettStore::new(db.clone(), config.mett.clone());

    for role in [ADMIN_ROLE, config.default_role.as_str()] {
        if !store.role_exists(role).await? {
            store.create_role(role).await?;
            tracing::info!(role = %role, "Seeded role");
        }
    }

    if !store.user_exists(&config.default_admin).await? {
        store
            .create_user(&config.default_admin, &config.default_admin_password)
            .await?;
        store
            .add_role_to_user(&config.default_admin, ADMIN_ROLE)
            .await?;
        tracing::info!(user = %config.default_admin, "Seeded admin user");
    }
    if !store.account_exists(&config.default_admin).await? {
        store.create_account(&config.default_admin).await?;
    }

    // Catalog seeding is skipped as soon as any class exists, so admin
    // price changes survive restarts
    if store.list_bun_classes().await?.is_empty() {
        for bun in &config.mett.default_buns {
            store
                .add_bun_class(bun, config.mett.default_price, config.mett.default_mett_grams)
                .await?;
        }
        tracing::info!(classes = config.mett.default_buns.len(), "Seeded bun catalog");
    }

    Ok(())
}
