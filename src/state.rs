use std::sync::Arc;

use crate::{
    auth::{OsRandom, PgTokenStore, RandomSource, TokenService, TokenStore},
    config::AppConfig,
    customers::{CustomerService, CustomerStore, PgCustomerStore},
    db,
    memory::MemoryStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub customers: CustomerService,
    pub tokens: TokenService,
}

impl AppState {
    /// Loads `.env` and the environment, connects to Postgres and applies migrations.
    pub async fn init() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Arc::new(AppConfig::from_env()?);

        let pool = db::connect(&config).await?;
        if let Err(e) = db::migrate(&pool).await {
            tracing::warn!(error = %e, "migration failed; continuing with existing schema");
        }

        let customers = Arc::new(PgCustomerStore::new(pool.clone())) as Arc<dyn CustomerStore>;
        let tokens = Arc::new(PgTokenStore::new(pool)) as Arc<dyn TokenStore>;
        tracing::info!(max_connections = config.max_connections, "customer identity store ready");
        Ok(Self::from_parts(config, customers, tokens, Arc::new(OsRandom)))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        customers: Arc<dyn CustomerStore>,
        tokens: Arc<dyn TokenStore>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        let deadline = config.store_timeout();
        Self {
            customers: CustomerService::new(customers.clone(), deadline),
            tokens: TokenService::new(customers, tokens, random, config.token_ttl(), deadline),
            config,
        }
    }

    /// State over a fresh [`MemoryStore`]; nothing is persisted.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            database_url: "memory://".into(),
            max_connections: 1,
            token_ttl_minutes: 5,
            store_timeout_secs: 1,
        });
        let store = Arc::new(MemoryStore::new());
        Self::from_parts(config, store.clone(), store, Arc::new(OsRandom))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CustomerDraft, ServiceError};

    #[tokio::test]
    async fn fake_state_walks_the_whole_flow() {
        let state = AppState::fake();
        let c = state
            .customers
            .create(&CustomerDraft::new("A", "+1000"), "pw")
            .await
            .expect("create");
        assert!(c.id > 0);
        assert!(c.active);

        let token = state.tokens.issue_token("+1000", "pw").await.expect("issue");
        assert_eq!(state.tokens.resolve_token(&token).await.expect("resolve"), c.id);

        let after = time::OffsetDateTime::now_utc() + state.config.token_ttl();
        assert!(matches!(
            state.tokens.resolve_token_at(&token, after).await,
            Err(ServiceError::ExpiredToken)
        ));
    }

    #[test]
    fn customer_json_has_no_password() {
        let c = crate::Customer {
            id: 1,
            name: "A".into(),
            phone: "+1000".into(),
            active: true,
            created: time::macros::datetime!(2024-05-06 07:08:09 UTC),
        };
        let json = serde_json::to_string(&c).expect("encode");
        assert!(json.contains("\"created\":\"2024-05-06T07:08:09Z\""));
        assert!(!json.contains("password"));
    }
}
