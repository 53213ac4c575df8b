//! # PlugSpot
//!
//! Backend of a peer-to-peer EV charger rental marketplace: hosts list home
//! chargers, guests book hourly slots and pay through Stripe, the platform
//! keeps a commission.
//!
//! ## Architecture
//!
//! - **domain**: entities, repository traits, pricing and availability
//! - **application**: services orchestrating the domain, gateway ports
//! - **infrastructure**: SeaORM/SQLite and in-memory storage, Stripe, Resend, crypto
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: runtime wiring and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};
pub use infrastructure::{init_database, DatabaseConfig, InMemoryRepositoryProvider, SeaOrmRepositoryProvider};
pub use interfaces::http::create_api_router;
