use sqlx::FromRow;
use time::OffsetDateTime;

/// Row of `customers_tokens`. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CustomerToken {
    pub token: String,             // hex-encoded random bytes
    pub customer_id: i64,          // reference to customers.id
    pub expire: OffsetDateTime,    // invalid at and after this instant
}
