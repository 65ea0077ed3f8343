use thiserror::Error;

/// Failure classes handed back to the transport layer, which picks the status.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("item not found")]
    NotFound,

    /// Unknown phone and wrong password are deliberately the same variant.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token is expired")]
    ExpiredToken,

    #[error("no such user")]
    NoSuchUser,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
