use std::{
    collections::{BTreeMap, HashMap},
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    auth::{repo::TokenStore, repo_types::CustomerToken},
    customers::{
        dto::CustomerDraft,
        repo::CustomerStore,
        repo_types::{Customer, CustomerCredentials},
    },
};

struct Row {
    customer: Customer,
    password_hash: Option<String>,
}

#[derive(Default)]
struct Tables {
    last_id: i64,
    customers: BTreeMap<i64, Row>,
    tokens: HashMap<String, CustomerToken>,
}

impl Tables {
    fn id_by_phone(&self, phone: &str) -> Option<i64> {
        self.customers
            .values()
            .find(|row| row.customer.phone == phone)
            .map(|row| row.customer.id)
    }

    fn insert(&mut self, draft: &CustomerDraft, password_hash: Option<String>) -> Customer {
        self.last_id += 1;
        let customer = Customer {
            id: self.last_id,
            name: draft.name.clone(),
            phone: draft.phone.clone(),
            active: draft.active,
            created: draft.created.unwrap_or_else(OffsetDateTime::now_utc),
        };
        self.customers.insert(
            customer.id,
            Row {
                customer: customer.clone(),
                password_hash,
            },
        );
        customer
    }
}

/// In-process store with the same uniqueness, existence and cascade rules as
/// the Postgres schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Customer>> {
        Ok(self.tables().customers.get(&id).map(|row| row.customer.clone()))
    }

    async fn list(&self, only_active: bool) -> anyhow::Result<Vec<Customer>> {
        Ok(self
            .tables()
            .customers
            .values()
            .filter(|row| !only_active || row.customer.active)
            .map(|row| row.customer.clone())
            .collect())
    }

    async fn upsert_by_phone(&self, draft: &CustomerDraft) -> anyhow::Result<Customer> {
        let mut tables = self.tables();
        let Some(id) = tables.id_by_phone(&draft.phone) else {
            return Ok(tables.insert(draft, None));
        };
        let created = draft.created.unwrap_or_else(OffsetDateTime::now_utc);
        let row = tables
            .customers
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("customer {id} vanished during upsert"))?;
        row.customer.name = draft.name.clone();
        row.customer.active = draft.active;
        row.customer.created = created;
        Ok(row.customer.clone())
    }

    async fn update(&self, id: i64, draft: &CustomerDraft) -> anyhow::Result<Option<Customer>> {
        let mut tables = self.tables();
        if !tables.customers.contains_key(&id) {
            return Ok(None);
        }
        if let Some(owner) = tables.id_by_phone(&draft.phone) {
            anyhow::ensure!(owner == id, "phone {} already belongs to customer {owner}", draft.phone);
        }
        let Some(row) = tables.customers.get_mut(&id) else {
            return Ok(None);
        };
        row.customer.name = draft.name.clone();
        row.customer.phone = draft.phone.clone();
        row.customer.active = draft.active;
        if let Some(created) = draft.created {
            row.customer.created = created;
        }
        Ok(Some(row.customer.clone()))
    }

    async fn insert_with_password(
        &self,
        draft: &CustomerDraft,
        password_hash: &str,
    ) -> anyhow::Result<Customer> {
        let mut tables = self.tables();
        if let Some(owner) = tables.id_by_phone(&draft.phone) {
            anyhow::bail!("phone {} already belongs to customer {owner}", draft.phone);
        }
        Ok(tables.insert(draft, Some(password_hash.to_string())))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let mut tables = self.tables();
        if tables.customers.remove(&id).is_none() {
            return Ok(false);
        }
        tables.tokens.retain(|_, token| token.customer_id != id);
        Ok(true)
    }

    async fn set_active(&self, id: i64, active: bool) -> anyhow::Result<bool> {
        let mut tables = self.tables();
        match tables.customers.get_mut(&id) {
            Some(row) => {
                row.customer.active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_credentials(&self, phone: &str) -> anyhow::Result<Option<CustomerCredentials>> {
        Ok(self
            .tables()
            .customers
            .values()
            .find(|row| row.customer.phone == phone)
            .map(|row| CustomerCredentials {
                id: row.customer.id,
                password_hash: row.password_hash.clone(),
            }))
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn insert(&self, token: &CustomerToken) -> anyhow::Result<()> {
        let mut tables = self.tables();
        anyhow::ensure!(
            tables.customers.contains_key(&token.customer_id),
            "customer {} does not exist",
            token.customer_id
        );
        anyhow::ensure!(!tables.tokens.contains_key(&token.token), "duplicate token");
        tables.tokens.insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn find(&self, token: &str) -> anyhow::Result<Option<CustomerToken>> {
        Ok(self.tables().tokens.get(token).cloned())
    }
}
