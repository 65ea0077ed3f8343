pub mod password;
pub mod random;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use random::{OsRandom, RandomSource};
pub use repo::{PgTokenStore, TokenStore};
pub use services::{TokenService, TOKEN_BYTES};
