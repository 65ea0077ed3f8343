use std::{sync::Arc, time::Duration};

use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        password::verify_password,
        random::RandomSource,
        repo::TokenStore,
        repo_types::CustomerToken,
    },
    customers::repo::CustomerStore,
    db::with_deadline,
    error::{ServiceError, ServiceResult},
};

/// Random bytes drawn per token; the token string is their hex encoding.
pub const TOKEN_BYTES: usize = 256;

/// Issues opaque bearer tokens for customers and resolves them back.
#[derive(Clone)]
pub struct TokenService {
    customers: Arc<dyn CustomerStore>,
    tokens: Arc<dyn TokenStore>,
    random: Arc<dyn RandomSource>,
    ttl: time::Duration,
    deadline: Duration,
}

impl TokenService {
    pub fn new(
        customers: Arc<dyn CustomerStore>,
        tokens: Arc<dyn TokenStore>,
        random: Arc<dyn RandomSource>,
        ttl: time::Duration,
        deadline: Duration,
    ) -> Self {
        Self {
            customers,
            tokens,
            random,
            ttl,
            deadline,
        }
    }

    /// Issues a token valid for the configured lifetime from now.
    pub async fn issue_token(&self, phone: &str, password: &str) -> ServiceResult<String> {
        let expire = OffsetDateTime::now_utc() + self.ttl;
        self.issue_token_until(phone, password, expire).await
    }

    /// Checks the password and records a new token expiring at `expire`.
    ///
    /// An unknown phone, a wrong password and a customer without a password
    /// all fail as [`ServiceError::InvalidCredentials`]. Existing tokens of the
    /// customer are left alone.
    #[instrument(skip(self, password))]
    pub async fn issue_token_until(
        &self,
        phone: &str,
        password: &str,
        expire: OffsetDateTime,
    ) -> ServiceResult<String> {
        let credentials =
            with_deadline(self.deadline, "find_credentials", self.customers.find_credentials(phone)).await?;

        let Some(credentials) = credentials else {
            warn!("token requested for unknown phone");
            return Err(ServiceError::InvalidCredentials);
        };

        let matches = credentials
            .password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(password, hash));
        if !matches {
            warn!(customer_id = credentials.id, "token requested with invalid password");
            return Err(ServiceError::InvalidCredentials);
        }

        let record = CustomerToken {
            token: self.generate()?,
            customer_id: credentials.id,
            expire,
        };
        with_deadline(self.deadline, "insert_token", self.tokens.insert(&record)).await?;

        info!(customer_id = record.customer_id, expire = %record.expire, "token issued");
        Ok(record.token)
    }

    /// Resolves a token to its customer id as of now.
    pub async fn resolve_token(&self, token: &str) -> ServiceResult<i64> {
        self.resolve_token_at(token, OffsetDateTime::now_utc()).await
    }

    /// Resolves a token as of `now`. Read only: the expiry is never extended.
    #[instrument(skip(self, token))]
    pub async fn resolve_token_at(&self, token: &str, now: OffsetDateTime) -> ServiceResult<i64> {
        let record = with_deadline(self.deadline, "find_token", self.tokens.find(token)).await?;

        let Some(record) = record else {
            warn!("unknown token presented");
            return Err(ServiceError::NoSuchUser);
        };

        if now >= record.expire {
            warn!(customer_id = record.customer_id, expire = %record.expire, "expired token presented");
            return Err(ServiceError::ExpiredToken);
        }

        Ok(record.customer_id)
    }

    fn generate(&self) -> ServiceResult<String> {
        let mut buffer = vec![0u8; TOKEN_BYTES];
        let read = self.random.fill(&mut buffer).map_err(|e| {
            error!(error = %e, "random source failed");
            ServiceError::Internal(e)
        })?;
        if read != buffer.len() {
            error!(read, expected = TOKEN_BYTES, "short read from random source");
            return Err(ServiceError::Internal(anyhow::anyhow!(
                "random source returned {read} of {TOKEN_BYTES} bytes"
            )));
        }
        Ok(hex::encode(buffer))
    }
}
