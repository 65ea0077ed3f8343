//! Runs against a real Postgres when `TEST_DATABASE_URL` is set; otherwise
//! every test returns immediately.

use std::{sync::Arc, time::Duration};

use customer_identity::{
    auth::{OsRandom, PgTokenStore, TokenService},
    config::AppConfig,
    customers::{CustomerDraft, CustomerService, PgCustomerStore},
    db, ServiceError,
};
use rand::Rng;

const DEADLINE: Duration = Duration::from_secs(5);

async fn services() -> Option<(CustomerService, TokenService)> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let config = AppConfig::from_lookup(|key| (key == "DATABASE_URL").then(|| url.clone()))
        .expect("config");
    let pool = db::connect(&config).await.expect("connect");
    db::migrate(&pool).await.expect("migrate");

    let customers = Arc::new(PgCustomerStore::new(pool.clone()));
    let tokens = Arc::new(PgTokenStore::new(pool));
    Some((
        CustomerService::new(customers.clone(), DEADLINE),
        TokenService::new(customers, tokens, Arc::new(OsRandom), time::Duration::hours(1), DEADLINE),
    ))
}

fn unique_phone() -> String {
    format!("+7{:012}", rand::thread_rng().gen_range(0..1_000_000_000_000u64))
}

#[tokio::test]
async fn upsert_returns_existing_row() {
    let Some((customers, _)) = services().await else { return };
    let phone = unique_phone();

    let first = customers.save(&CustomerDraft::new("A", &phone)).await.expect("insert");
    let mut again = CustomerDraft::new("B", &phone);
    again.active = false;
    let second = customers.save(&again).await.expect("upsert");

    assert_eq!(first.id, second.id);
    assert_eq!(second.name, "B");
    assert!(!second.active);

    customers.remove_by_id(first.id).await.expect("cleanup");
}

#[tokio::test]
async fn block_unblock_remove() {
    let Some((customers, _)) = services().await else { return };
    let c = customers
        .save(&CustomerDraft::new("A", &unique_phone()))
        .await
        .expect("insert");

    customers.block_by_id(c.id).await.expect("block");
    customers.block_by_id(c.id).await.expect("block twice");
    assert!(!customers.by_id(c.id).await.expect("by_id").active);
    assert!(customers
        .all_active()
        .await
        .expect("active")
        .iter()
        .all(|x| x.id != c.id));

    customers.unblock_by_id(c.id).await.expect("unblock");
    assert!(customers.by_id(c.id).await.expect("by_id").active);

    customers.remove_by_id(c.id).await.expect("remove");
    assert!(matches!(customers.by_id(c.id).await, Err(ServiceError::NotFound)));
    assert!(matches!(customers.remove_by_id(c.id).await, Err(ServiceError::NotFound)));
    assert!(matches!(customers.block_by_id(c.id).await, Err(ServiceError::NotFound)));
}

#[tokio::test]
async fn token_lifecycle() {
    let Some((customers, tokens)) = services().await else { return };
    let phone = unique_phone();
    let c = customers
        .create(&CustomerDraft::new("A", &phone), "pw")
        .await
        .expect("create");

    let token = tokens.issue_token(&phone, "pw").await.expect("issue");
    assert_eq!(tokens.resolve_token(&token).await.expect("resolve"), c.id);

    let later = time::OffsetDateTime::now_utc() + time::Duration::hours(2);
    assert!(matches!(
        tokens.resolve_token_at(&token, later).await,
        Err(ServiceError::ExpiredToken)
    ));
    assert!(matches!(
        tokens.issue_token(&phone, "wrong").await,
        Err(ServiceError::InvalidCredentials)
    ));

    customers.remove_by_id(c.id).await.expect("remove");
    assert!(matches!(tokens.resolve_token(&token).await, Err(ServiceError::NoSuchUser)));
}
