//! Review DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{RatingSummary, Review};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitReviewRequest {
    #[validate(length(min = 1, message = "booking_id is required"))]
    pub booking_id: String,
    #[validate(range(min = 1, max = 5, message = "rating must be 1-5"))]
    pub rating: u8,
    #[serde(default)]
    #[validate(length(max = 2000, message = "comment is too long"))]
    pub comment: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewDto {
    pub id: String,
    pub booking_id: String,
    pub charger_id: String,
    pub user_id: String,
    pub user_name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewDto {
    fn from(r: Review) -> Self {
        Self {
            id: r.id,
            booking_id: r.booking_id,
            charger_id: r.charger_id,
            user_id: r.user_id,
            user_name: r.user_name,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChargerReviewsResponse {
    pub reviews: Vec<ReviewDto>,
    /// `0.0` without reviews
    pub average_rating: f64,
    pub review_count: usize,
}

impl ChargerReviewsResponse {
    pub fn new(reviews: Vec<Review>, summary: RatingSummary) -> Self {
        Self {
            reviews: reviews.into_iter().map(ReviewDto::from).collect(),
            average_rating: (summary.average * 10.0).round() / 10.0,
            review_count: summary.count,
        }
    }
}
