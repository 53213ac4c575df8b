//! Host payout account aggregate

pub mod model;
pub mod repository;

pub use model::{is_valid_account_id, HostAccount};
pub use repository::HostAccountRepository;
