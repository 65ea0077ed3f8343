use std::{sync::Arc, time::Duration};

use tracing::{error, info, instrument, warn};

use crate::{
    auth::password::hash_password,
    customers::{dto::CustomerDraft, repo::CustomerStore, repo_types::Customer},
    db::with_deadline,
    error::{ServiceError, ServiceResult},
};

/// Customer CRUD and block/unblock over a [`CustomerStore`].
#[derive(Clone)]
pub struct CustomerService {
    store: Arc<dyn CustomerStore>,
    deadline: Duration,
}

impl CustomerService {
    pub fn new(store: Arc<dyn CustomerStore>, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    #[instrument(skip(self))]
    pub async fn by_id(&self, id: i64) -> ServiceResult<Customer> {
        with_deadline(self.deadline, "find_by_id", self.store.find_by_id(id))
            .await?
            .ok_or(ServiceError::NotFound)
    }

    #[instrument(skip(self))]
    pub async fn all(&self) -> ServiceResult<Vec<Customer>> {
        with_deadline(self.deadline, "list", self.store.list(false)).await
    }

    #[instrument(skip(self))]
    pub async fn all_active(&self) -> ServiceResult<Vec<Customer>> {
        with_deadline(self.deadline, "list_active", self.store.list(true)).await
    }

    /// Creates or updates a customer.
    ///
    /// With `id == 0` this is an upsert keyed on `phone`: an existing row keeps
    /// its id and gets the incoming `name`, `active` and `created`. With an id
    /// set, the row must exist and all mutable fields are replaced.
    #[instrument(skip(self, draft), fields(id = draft.id))]
    pub async fn save(&self, draft: &CustomerDraft) -> ServiceResult<Customer> {
        if draft.is_new() {
            let customer =
                with_deadline(self.deadline, "upsert_by_phone", self.store.upsert_by_phone(draft)).await?;
            info!(customer_id = customer.id, "customer upserted");
            return Ok(customer);
        }

        match with_deadline(self.deadline, "update", self.store.update(draft.id, draft)).await? {
            Some(customer) => {
                info!(customer_id = customer.id, "customer updated");
                Ok(customer)
            }
            None => {
                warn!(customer_id = draft.id, "update of unknown customer");
                Err(ServiceError::NotFound)
            }
        }
    }

    /// Registers a new customer with a password. Never updates: a draft that
    /// already carries an id is rejected.
    #[instrument(skip(self, draft, password), fields(phone = %draft.phone))]
    pub async fn create(&self, draft: &CustomerDraft, password: &str) -> ServiceResult<Customer> {
        if !draft.is_new() {
            error!(customer_id = draft.id, "create called with an existing id");
            return Err(ServiceError::Internal(anyhow::anyhow!(
                "create does not accept an id (got {})",
                draft.id
            )));
        }

        let hash = hash_password(password)?;
        let customer = with_deadline(
            self.deadline,
            "insert_with_password",
            self.store.insert_with_password(draft, &hash),
        )
        .await?;
        info!(customer_id = customer.id, "customer registered");
        Ok(customer)
    }

    #[instrument(skip(self))]
    pub async fn remove_by_id(&self, id: i64) -> ServiceResult<()> {
        if !with_deadline(self.deadline, "delete", self.store.delete(id)).await? {
            warn!(customer_id = id, "remove of unknown customer");
            return Err(ServiceError::NotFound);
        }
        info!(customer_id = id, "customer removed");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn block_by_id(&self, id: i64) -> ServiceResult<()> {
        self.set_active(id, false).await
    }

    #[instrument(skip(self))]
    pub async fn unblock_by_id(&self, id: i64) -> ServiceResult<()> {
        self.set_active(id, true).await
    }

    async fn set_active(&self, id: i64, active: bool) -> ServiceResult<()> {
        if !with_deadline(self.deadline, "set_active", self.store.set_active(id, active)).await? {
            warn!(customer_id = id, active, "active flag change for unknown customer");
            return Err(ServiceError::NotFound);
        }
        info!(customer_id = id, active, "customer active flag set");
        Ok(())
    }
}
