pub mod dto;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use dto::CustomerDraft;
pub use repo::{CustomerStore, PgCustomerStore};
pub use repo_types::Customer;
pub use services::CustomerService;
