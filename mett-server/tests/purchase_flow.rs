//! Purchase workflow: pending claims resolve exactly once, credits land
//! exactly once.

use chrono::NaiveTime;
use rust_decimal::Decimal;

use mett_server::StoreError;
use mett_server::core::MettConfig;
use mett_server::db::{DbService, MettStore};

fn mett_config() -> MettConfig {
    MettConfig {
        expiry_cutoff: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        default_buns: vec!["Weizen".into(), "Roggen".into()],
        default_price: Decimal::new(100, 2),
        default_mett_grams: 66.0,
        half_buns: vec![],
        default_spare: "Weizen".into(),
        spare_count: 2,
    }
}

async fn test_store() -> MettStore {
    let db = DbService::open_in_memory().await.unwrap().db;
    let store = MettStore::new(db, mett_config());
    store.create_user("admin", "secret").await.unwrap();
    store.create_account("alice").await.unwrap();
    store
}

#[tokio::test]
async fn test_purchase_is_credited_exactly_once() {
    let store = test_store().await;

    let purchase = store
        .state_purchase("alice", Decimal::new(1337, 2), "lunch")
        .await
        .unwrap();
    let id = purchase.id.as_ref().unwrap().key().to_string();

    // Pending, no balance effect yet
    assert_eq!(store.list_purchases(false).await.unwrap().len(), 1);
    assert_eq!(
        store.get_balance("alice").await.unwrap(),
        Some(Decimal::ZERO)
    );

    store.authorize_purchase(&id, "admin").await.unwrap();
    assert_eq!(
        store.get_balance("alice").await.unwrap(),
        Some(Decimal::new(1337, 2))
    );

    // Resolved and stamped
    let resolved = store.list_purchases(true).await.unwrap();
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].authorized, Some(true));
    assert_eq!(resolved[0].by.as_deref(), Some("admin"));
    assert!(resolved[0].at.is_some());
    assert!(store.list_purchases(false).await.unwrap().is_empty());

    // Any second resolution fails and the credit stays single
    let again = store.authorize_purchase(&id, "admin").await;
    assert!(matches!(again, Err(StoreError::Conflict(_))));
    let declined = store.decline_purchase(&id, "admin").await;
    assert!(matches!(declined, Err(StoreError::Conflict(_))));
    assert_eq!(
        store.get_balance("alice").await.unwrap(),
        Some(Decimal::new(1337, 2))
    );
}

#[tokio::test]
async fn test_declined_purchase_never_credits() {
    let store = test_store().await;

    let purchase = store
        .state_purchase("alice", Decimal::new(500, 2), "mett run")
        .await
        .unwrap();
    let id = purchase.id.as_ref().unwrap().key().to_string();

    store.decline_purchase(&id, "admin").await.unwrap();
    assert_eq!(
        store.get_balance("alice").await.unwrap(),
        Some(Decimal::ZERO)
    );

    let resolved = store.list_purchases(true).await.unwrap();
    assert_eq!(resolved[0].authorized, Some(false));

    // Authorizing a declined purchase must not work either
    let result = store.authorize_purchase(&id, "admin").await;
    assert!(matches!(result, Err(StoreError::Conflict(_))));
    assert_eq!(
        store.get_balance("alice").await.unwrap(),
        Some(Decimal::ZERO)
    );
}

#[tokio::test]
async fn test_purchase_preconditions() {
    let store = test_store().await;

    // Claims need an existing account
    let result = store
        .state_purchase("nobody", Decimal::ONE, "snacks")
        .await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));

    let purchase = store
        .state_purchase("alice", Decimal::ONE, "snacks")
        .await
        .unwrap();
    let id = purchase.id.as_ref().unwrap().key().to_string();

    // Resolutions need a known admin and a known purchase
    let result = store.authorize_purchase(&id, "nobody").await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));
    let result = store.authorize_purchase("missing-id", "admin").await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));
    let result = store.decline_purchase("missing-id", "admin").await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));

    // Nothing of the above touched the claim
    assert_eq!(store.list_purchases(false).await.unwrap().len(), 1);
    assert_eq!(
        store.get_balance("alice").await.unwrap(),
        Some(Decimal::ZERO)
    );
}
