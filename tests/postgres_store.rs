//! PostgreSQL store tests
//!
//! These tests require a database connection.
//! Run with: DATABASE_URL=postgres://... cargo test --test postgres_store -- --ignored
//!
//! Every test works on its own user and transaction ids, so they can share a
//! database and run in parallel.

use chrono::{DateTime, Duration, DurationRound, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use payinsight::domain::{PaymentChannel, Session, Transaction, TransactionId, TransactionStatus, User, UserRole};
use payinsight::store::{
    PgTransactionStore, PgUserStore, StatusUpdate, StoreError, TransactionStore, UserStore,
    LIST_LIMIT,
};

mod common;

/// Postgres keeps microseconds
fn now() -> DateTime<Utc> {
    Utc::now().duration_trunc(Duration::microseconds(1)).unwrap()
}

fn unique_id() -> TransactionId {
    TransactionId::from(format!("TXN{}", Uuid::new_v4().simple()).to_uppercase())
}

async fn create_owner(users: &PgUserStore) -> Uuid {
    let user = User::new(
        &format!("owner-{}@payinsight.test", Uuid::new_v4()),
        "Store Test",
        UserRole::Analyst,
        "$argon2id$placeholder".to_string(),
        now(),
    );
    users.create_user(user).await.unwrap().id
}

fn pending(owner: Uuid, amount: Decimal, created_at: DateTime<Utc>) -> Transaction {
    Transaction {
        id: unique_id(),
        owner,
        sender: "ACME".to_string(),
        receiver: "GLOBEX".to_string(),
        amount,
        channel: PaymentChannel::Neft,
        ifsc: "SBIN0001234".to_string(),
        purpose: Some("Store test".to_string()),
        status: TransactionStatus::Pending,
        failure_reason: None,
        aml_flag: false,
        high_value: false,
        created_at,
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_create_and_get() {
    let pool = common::setup_test_db().await;
    let users = PgUserStore::new(pool.clone());
    let store = PgTransactionStore::new(pool);
    let owner = create_owner(&users).await;

    let txn = pending(owner, dec!(2500.75), now());
    let created = store.create(txn.clone()).await.unwrap();
    assert_eq!(created, txn);
    assert_eq!(store.get(&txn.id).await.unwrap(), Some(txn.clone()));

    let duplicate = store.create(txn.clone()).await;
    assert!(matches!(duplicate, Err(StoreError::Duplicate(id)) if id == txn.id.as_str()));

    assert_eq!(store.get(&unique_id()).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_amounts_are_stored_exactly() {
    let pool = common::setup_test_db().await;
    let users = PgUserStore::new(pool.clone());
    let store = PgTransactionStore::new(pool);
    let owner = create_owner(&users).await;

    // Sub-paisa amounts and amounts far beyond the compliance hold both persist unchanged
    for amount in [dec!(0.001), dec!(123.456789), dec!(100000000000000000000)] {
        let txn = pending(owner, amount, now());
        let created = store.create(txn.clone()).await.unwrap();
        assert_eq!(created.amount, amount);

        let stored = store.get(&txn.id).await.unwrap().unwrap();
        assert_eq!(stored.amount, amount);
        assert!(stored.amount > Decimal::ZERO);
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_list_by_owner_newest_first_and_capped() {
    let pool = common::setup_test_db().await;
    let users = PgUserStore::new(pool.clone());
    let store = PgTransactionStore::new(pool);
    let owner = create_owner(&users).await;
    let other = create_owner(&users).await;

    let base = now();
    let mut ids = Vec::new();
    for i in 0..(LIST_LIMIT as i64 + 5) {
        let txn = pending(owner, dec!(100), base + Duration::seconds(i));
        ids.push(txn.id.clone());
        store.create(txn).await.unwrap();
    }
    store.create(pending(other, dec!(100), base)).await.unwrap();

    let listed = store.list_by_owner(owner).await.unwrap();
    assert_eq!(listed.len(), LIST_LIMIT);
    assert_eq!(listed[0].id, ids[ids.len() - 1]);
    assert!(listed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    assert!(listed.iter().all(|t| t.owner == owner));
    // The five oldest fall off
    assert!(!listed.iter().any(|t| ids[..5].contains(&t.id)));

    assert_eq!(store.list_by_owner(other).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_update_status_is_terminal() {
    let pool = common::setup_test_db().await;
    let users = PgUserStore::new(pool.clone());
    let store = PgTransactionStore::new(pool);
    let owner = create_owner(&users).await;

    let txn = store.create(pending(owner, dec!(5000), now())).await.unwrap();

    let first = store
        .update_status(&txn.id, TransactionStatus::Success, Some("ignored".to_string()))
        .await
        .unwrap();
    assert_eq!(first, StatusUpdate::Updated);

    let second = store
        .update_status(&txn.id, TransactionStatus::Failed, Some("Processing error".to_string()))
        .await
        .unwrap();
    assert_eq!(second, StatusUpdate::AlreadyTerminal(TransactionStatus::Success));

    let stored = store.get(&txn.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TransactionStatus::Success);
    assert!(stored.failure_reason.is_none());

    let missing = store
        .update_status(&unique_id(), TransactionStatus::Success, None)
        .await
        .unwrap();
    assert_eq!(missing, StatusUpdate::NotFound);

    let invalid = store
        .update_status(&txn.id, TransactionStatus::Failed, None)
        .await;
    assert!(matches!(invalid, Err(StoreError::MissingFailureReason(_))));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_sessions_and_users() {
    let pool = common::setup_test_db().await;
    let users = PgUserStore::new(pool);
    let owner = create_owner(&users).await;

    let found = users.find_user(owner).await.unwrap().unwrap();
    let by_email = users.find_user_by_email(&found.email.to_uppercase()).await.unwrap();
    assert_eq!(by_email, Some(found.clone()));

    let duplicate = User::new(&found.email, "Dup", UserRole::Admin, "$argon2id$placeholder".into(), now());
    assert!(matches!(users.create_user(duplicate).await, Err(StoreError::Duplicate(_))));

    let at = now();
    let expired = Session {
        token_hash: format!("expired-{}", Uuid::new_v4()),
        user_id: owner,
        created_at: at - Duration::minutes(31),
        expires_at: at - Duration::minutes(1),
    };
    let live = Session {
        token_hash: format!("live-{}", Uuid::new_v4()),
        user_id: owner,
        created_at: at,
        expires_at: at + Duration::minutes(30),
    };
    users.create_session(expired.clone()).await.unwrap();
    users.create_session(live.clone()).await.unwrap();

    assert!(users.delete_expired_sessions(at).await.unwrap() >= 1);
    assert!(users.find_session(&expired.token_hash).await.unwrap().is_none());
    assert_eq!(users.find_session(&live.token_hash).await.unwrap(), Some(live));
}
