//! Earnings dashboards for hosts and the platform admin

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
