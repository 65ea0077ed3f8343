use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Customer record as returned to callers. The password hash is not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
}

/// What the token issuer needs to check a password. `password_hash` is empty
/// for customers that were only ever saved, never registered.
#[derive(Debug, Clone, FromRow)]
pub struct CustomerCredentials {
    pub id: i64,
    pub password_hash: Option<String>,
}
