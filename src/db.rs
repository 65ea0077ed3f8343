use std::{future::Future, time::Duration};

use anyhow::Context;
use sqlx::{migrate::Migrator, postgres::PgPoolOptions, PgPool};
use tracing::error;

use crate::{config::AppConfig, error::ServiceError};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let db = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.store_timeout())
        .connect(&config.database_url)
        .await
        .context("connect to database")?;
    Ok(db)
}

pub async fn migrate(db: &PgPool) -> anyhow::Result<()> {
    MIGRATOR.run(db).await.context("run migrations")?;
    Ok(())
}

/// Runs a single store call under `deadline`.
///
/// A store failure and an elapsed deadline both come back as
/// [`ServiceError::Internal`]; dropping the future cancels the query.
pub async fn with_deadline<T, F>(deadline: Duration, op: &'static str, call: F) -> Result<T, ServiceError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            error!(error = %e, op, "store call failed");
            Err(ServiceError::Internal(e))
        }
        Err(_) => {
            error!(op, ?deadline, "store call timed out");
            Err(ServiceError::Internal(anyhow::anyhow!(
                "{op} did not finish within {deadline:?}"
            )))
        }
    }
}
