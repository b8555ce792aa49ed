//! Ledger accounts, the deposit audit log, users/roles and seeding.

use chrono::NaiveTime;
use rust_decimal::Decimal;

use mett_server::StoreError;
use mett_server::core::{Config, MettConfig};
use mett_server::db::{DbService, MettStore, seed};

fn mett_config() -> MettConfig {
    MettConfig {
        expiry_cutoff: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        default_buns: vec!["Weizen".into(), "Roggen".into(), "Roeggelchen".into()],
        default_price: Decimal::new(100, 2),
        default_mett_grams: 66.0,
        half_buns: vec!["Roeggelchen".into()],
        default_spare: "Weizen".into(),
        spare_count: 2,
    }
}

async fn test_store() -> MettStore {
    let db = DbService::open_in_memory().await.unwrap().db;
    MettStore::new(db, mett_config())
}

#[tokio::test]
async fn test_account_creation_and_deletion() {
    let store = test_store().await;

    assert!(!store.account_exists("alice").await.unwrap());
    assert_eq!(store.get_balance("alice").await.unwrap(), None);

    let account = store.create_account("alice").await.unwrap();
    assert_eq!(account.balance, Decimal::ZERO);
    assert!(store.account_exists("alice").await.unwrap());

    let duplicate = store.create_account("alice").await;
    assert!(matches!(duplicate, Err(StoreError::Conflict(_))));

    store.delete_account("alice").await.unwrap();
    let missing = store.delete_account("alice").await;
    assert!(matches!(missing, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn test_change_balance_writes_audit_row() {
    let store = test_store().await;
    store.create_user("admin", "secret").await.unwrap();
    store.create_account("alice").await.unwrap();

    store
        .change_balance("alice", Decimal::new(1000, 2), "admin")
        .await
        .unwrap();
    store
        .change_balance("alice", Decimal::new(330, 2), "admin")
        .await
        .unwrap();
    assert_eq!(
        store.get_balance("alice").await.unwrap(),
        Some(Decimal::new(1330, 2))
    );

    let deposits = store.list_deposits().await.unwrap();
    assert_eq!(deposits.len(), 2);
    assert!(deposits.iter().all(|d| d.admin == "admin" && d.user == "alice"));
    let booked: Decimal = deposits.iter().map(|d| d.amount).sum();
    assert_eq!(booked, Decimal::new(1330, 2));

    // Negative deltas are allowed, balances may go below zero
    store
        .change_balance("alice", Decimal::new(-2000, 2), "admin")
        .await
        .unwrap();
    assert_eq!(
        store.get_balance("alice").await.unwrap(),
        Some(Decimal::new(-670, 2))
    );
}

#[tokio::test]
async fn test_change_balance_validates_identities() {
    let store = test_store().await;
    store.create_user("admin", "secret").await.unwrap();
    store.create_account("alice").await.unwrap();

    let result = store.change_balance("nobody", Decimal::ONE, "admin").await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));

    let result = store.change_balance("alice", Decimal::ONE, "ghost").await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));

    assert!(store.list_deposits().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_catalog_mutations() {
    let store = test_store().await;

    assert!(!store.bun_class_exists("Weizen").await.unwrap());
    store
        .add_bun_class("Weizen", Decimal::new(100, 2), 66.0)
        .await
        .unwrap();
    assert!(store.bun_class_exists("Weizen").await.unwrap());
    assert_eq!(store.list_bun_classes().await.unwrap(), vec!["Weizen"]);

    let duplicate = store.add_bun_class("Weizen", Decimal::ONE, 1.0).await;
    assert!(matches!(duplicate, Err(StoreError::Conflict(_))));

    let updated = store
        .change_bun_price("Weizen", Decimal::new(150, 2))
        .await
        .unwrap();
    assert_eq!(updated.price, Decimal::new(150, 2));
    let updated = store.change_mett_formula("Weizen", 80.0).await.unwrap();
    assert_eq!(updated.mett, 80.0);

    let classes = store.list_bun_classes_with_price().await.unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].price, Decimal::new(150, 2));
    assert_eq!(classes[0].mett, 80.0);

    let missing = store.change_bun_price("Croissant", Decimal::ONE).await;
    assert!(matches!(missing, Err(StoreError::NotFound(_))));
    let missing = store.change_mett_formula("Croissant", 1.0).await;
    assert!(matches!(missing, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn test_users_and_roles() {
    let store = test_store().await;

    let user = store.create_user("bob", "hunter2").await.unwrap();
    assert_eq!(user.name, "bob");
    assert!(user.roles.is_empty());
    assert!(store.user_exists("bob").await.unwrap());

    let duplicate = store.create_user("bob", "hunter2").await;
    assert!(matches!(duplicate, Err(StoreError::Conflict(_))));

    // Roles must exist before they can be granted
    let result = store.add_role_to_user("bob", "user").await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));

    store.create_role("user").await.unwrap();
    store.add_role_to_user("bob", "user").await.unwrap();
    store.add_role_to_user("bob", "user").await.unwrap();
    let user = store.get_user("bob").await.unwrap().unwrap();
    assert_eq!(user.roles, vec!["user"]);

    store.remove_role_from_user("bob", "user").await.unwrap();
    let user = store.get_user("bob").await.unwrap().unwrap();
    assert!(user.roles.is_empty());
}

#[tokio::test]
async fn test_password_verification_and_change() {
    let store = test_store().await;
    store.create_user("bob", "hunter2").await.unwrap();

    assert!(store.password_is_correct("bob", "hunter2").await.unwrap());
    assert!(!store.password_is_correct("bob", "wrong").await.unwrap());

    store.change_password("bob", "hunter3").await.unwrap();
    assert!(store.password_is_correct("bob", "hunter3").await.unwrap());
    assert!(!store.password_is_correct("bob", "hunter2").await.unwrap());

    // Illegal passwords are rejected up front
    let result = store.create_user("eve", "").await;
    assert!(matches!(result, Err(StoreError::Validation(_))));
    let result = store.change_password("bob", "").await;
    assert!(matches!(result, Err(StoreError::Validation(_))));
}

#[tokio::test]
async fn test_seed_is_idempotent() {
    let db = DbService::open_in_memory().await.unwrap().db;
    let config = Config {
        mett: mett_config(),
        ..Config::from_env()
    };

    seed::seed(&db, &config).await.unwrap();
    let store = MettStore::new(db.clone(), config.mett.clone());

    assert!(store.user_exists(&config.default_admin).await.unwrap());
    assert!(store.account_exists(&config.default_admin).await.unwrap());
    assert!(store.role_exists("admin").await.unwrap());
    assert!(store.role_exists(&config.default_role).await.unwrap());
    assert_eq!(store.list_bun_classes().await.unwrap().len(), 3);

    // Admin price changes survive a re-seed
    store
        .change_bun_price("Weizen", Decimal::new(999, 2))
        .await
        .unwrap();
    seed::seed(&db, &config).await.unwrap();

    let classes = store.list_bun_classes_with_price().await.unwrap();
    let weizen = classes.iter().find(|c| c.name == "Weizen").unwrap();
    assert_eq!(weizen.price, Decimal::new(999, 2));
    assert_eq!(store.list_bun_classes().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_seed_rejects_invalid_mett_config() {
    let db = DbService::open_in_memory().await.unwrap().db;
    let config = Config {
        mett: MettConfig {
            half_buns: vec!["Roeggelchen".into(), "Roggen".into()],
            ..mett_config()
        },
        ..Config::from_env()
    };

    assert!(seed::seed(&db, &config).await.is_err());
}
