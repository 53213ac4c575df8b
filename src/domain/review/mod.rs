//! Review aggregate

pub mod model;
pub mod repository;

pub use model::{RatingSummary, Review, MAX_RATING, MIN_RATING};
pub use repository::ReviewRepository;
