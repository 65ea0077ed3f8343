use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::customers::{
    dto::CustomerDraft,
    repo_types::{Customer, CustomerCredentials},
};

/// Persistence for customers. Existence and phone uniqueness are decided by
/// the store in the same statement that acts on them.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Customer>>;
    async fn list(&self, only_active: bool) -> anyhow::Result<Vec<Customer>>;
    /// Insert, or on a phone collision overwrite `name`, `active` and `created`.
    async fn upsert_by_phone(&self, draft: &CustomerDraft) -> anyhow::Result<Customer>;
    /// `None` when no customer has `id`.
    async fn update(&self, id: i64, draft: &CustomerDraft) -> anyhow::Result<Option<Customer>>;
    async fn insert_with_password(
        &self,
        draft: &CustomerDraft,
        password_hash: &str,
    ) -> anyhow::Result<Customer>;
    /// `false` when no customer has `id`.
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
    /// `false` when no customer has `id`.
    async fn set_active(&self, id: i64, active: bool) -> anyhow::Result<bool>;
    async fn find_credentials(&self, phone: &str) -> anyhow::Result<Option<CustomerCredentials>>;
}

#[derive(Clone)]
pub struct PgCustomerStore {
    db: PgPool,
}

impl PgCustomerStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CustomerStore for PgCustomerStore {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, active, created
              FROM customers
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find customer by id")?;
        Ok(customer)
    }

    async fn list(&self, only_active: bool) -> anyhow::Result<Vec<Customer>> {
        let sql = if only_active {
            r#"SELECT id, name, phone, active, created FROM customers WHERE active ORDER BY id"#
        } else {
            r#"SELECT id, name, phone, active, created FROM customers ORDER BY id"#
        };
        let rows = sqlx::query_as::<_, Customer>(sql)
            .fetch_all(&self.db)
            .await
            .context("list customers")?;
        Ok(rows)
    }

    async fn upsert_by_phone(&self, draft: &CustomerDraft) -> anyhow::Result<Customer> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, phone, active, created)
            VALUES ($1, $2, $3, COALESCE($4, now()))
            ON CONFLICT (phone) DO UPDATE
               SET name = excluded.name,
                   active = excluded.active,
                   created = excluded.created
            RETURNING id, name, phone, active, created
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.phone)
        .bind(draft.active)
        .bind(draft.created)
        .fetch_one(&self.db)
        .await
        .context("upsert customer by phone")?;
        Ok(customer)
    }

    async fn update(&self, id: i64, draft: &CustomerDraft) -> anyhow::Result<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
               SET name = $1, phone = $2, active = $3, created = COALESCE($4, created)
             WHERE id = $5
            RETURNING id, name, phone, active, created
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.phone)
        .bind(draft.active)
        .bind(draft.created)
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("update customer")?;
        Ok(customer)
    }

    async fn insert_with_password(
        &self,
        draft: &CustomerDraft,
        password_hash: &str,
    ) -> anyhow::Result<Customer> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, phone, password_hash, active, created)
            VALUES ($1, $2, $3, $4, COALESCE($5, now()))
            RETURNING id, name, phone, active, created
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.phone)
        .bind(password_hash)
        .bind(draft.active)
        .bind(draft.created)
        .fetch_one(&self.db)
        .await
        .context("insert customer with password")?;
        Ok(customer)
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let done = sqlx::query(r#"DELETE FROM customers WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete customer")?;
        Ok(done.rows_affected() > 0)
    }

    async fn set_active(&self, id: i64, active: bool) -> anyhow::Result<bool> {
        // Postgres counts matched rows, so re-applying the same value still reports 1.
        let done = sqlx::query(r#"UPDATE customers SET active = $1 WHERE id = $2"#)
            .bind(active)
            .bind(id)
            .execute(&self.db)
            .await
            .context("set customer active flag")?;
        Ok(done.rows_affected() > 0)
    }

    async fn find_credentials(&self, phone: &str) -> anyhow::Result<Option<CustomerCredentials>> {
        let row = sqlx::query_as::<_, CustomerCredentials>(
            r#"SELECT id, password_hash FROM customers WHERE phone = $1"#,
        )
        .bind(phone)
        .fetch_optional(&self.db)
        .await
        .context("find customer credentials")?;
        Ok(row)
    }
}
