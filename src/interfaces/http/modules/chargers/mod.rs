//! Chargers module: browse, detail, availability, listing management, favorites

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
