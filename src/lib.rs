//! Customer records and bearer-token authentication for them.
//!
//! The transport layer holds an [`AppState`] and calls into
//! [`CustomerService`] and [`TokenService`]; every failure comes back as a
//! [`ServiceError`].

pub mod auth;
pub mod config;
pub mod customers;
pub mod db;
pub mod error;
pub mod memory;
pub mod state;
pub mod telemetry;

pub use auth::TokenService;
pub use customers::{Customer, CustomerDraft, CustomerService};
pub use error::{ServiceError, ServiceResult};
pub use state::AppState;
