//! Review domain entity

use chrono::{DateTime, Utc};

use crate::shared::errors::{DomainError, DomainResult};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Guest review of a charger, written after a completed booking.
/// Immutable once stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: String,
    pub booking_id: String,
    pub charger_id: String,
    pub user_id: String,
    pub user_name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(
        booking_id: impl Into<String>,
        charger_id: impl Into<String>,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        rating: u8,
        comment: impl Into<String>,
    ) -> DomainResult<Self> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(DomainError::Validation(format!(
                "rating must be between {} and {} (got {})",
                MIN_RATING, MAX_RATING, rating
            )));
        }
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            booking_id: booking_id.into(),
            charger_id: charger_id.into(),
            user_id: user_id.into(),
            user_name: user_name.into(),
            rating,
            comment: comment.into().trim().to_string(),
            created_at: Utc::now(),
        })
    }
}

/// Average rating and review count of a charger
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RatingSummary {
    /// `0.0` when there are no reviews
    pub average: f64,
    pub count: usize,
}

impl RatingSummary {
    pub fn from_reviews(reviews: &[Review]) -> Self {
        if reviews.is_empty() {
            return Self::default();
        }
        let sum: u32 = reviews.iter().map(|r| r.rating as u32).sum();
        Self {
            average: sum as f64 / reviews.len() as f64,
            count: reviews.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds() {
        assert!(Review::new("b", "c", "u", "U", 0, "").is_err());
        assert!(Review::new("b", "c", "u", "U", 6, "").is_err());
        let r = Review::new("b", "c", "u", "U", 5, "  Great spot ").unwrap();
        assert_eq!(r.comment, "Great spot");
    }

    #[test]
    fn summary_average() {
        let reviews: Vec<Review> = [5u8, 4, 3]
            .iter()
            .map(|&n| Review::new("b", "c", "u", "U", n, "ok").unwrap())
            .collect();
        let s = RatingSummary::from_reviews(&reviews);
        assert_eq!(s.count, 3);
        assert!((s.average - 4.0).abs() < 1e-12);
        assert_eq!(RatingSummary::from_reviews(&[]).count, 0);
    }
}
