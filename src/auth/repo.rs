use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::repo_types::CustomerToken;

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn insert(&self, token: &CustomerToken) -> anyhow::Result<()>;
    async fn find(&self, token: &str) -> anyhow::Result<Option<CustomerToken>>;
}

#[derive(Clone)]
pub struct PgTokenStore {
    db: PgPool,
}

impl PgTokenStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn insert(&self, token: &CustomerToken) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO customers_tokens (token, customer_id, expire)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&token.token)
        .bind(token.customer_id)
        .bind(token.expire)
        .execute(&self.db)
        .await
        .context("insert token")?;
        Ok(())
    }

    async fn find(&self, token: &str) -> anyhow::Result<Option<CustomerToken>> {
        let row = sqlx::query_as::<_, CustomerToken>(
            r#"
            SELECT token, customer_id, expire
              FROM customers_tokens
             WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await
        .context("find token")?;
        Ok(row)
    }
}
