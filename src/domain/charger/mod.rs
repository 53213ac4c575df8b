//! Charger aggregate
//!
//! Contains the Charger listing, connector types, and the charger and
//! favorites repository interfaces.

pub mod model;
pub mod repository;

pub use model::{Charger, ConnectorType};
pub use repository::{ChargerRepository, FavoriteRepository};
