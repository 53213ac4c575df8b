//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod email;
pub mod storage;
pub mod stripe;

pub use database::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};
pub use storage::InMemoryRepositoryProvider;
