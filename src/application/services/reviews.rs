//! Reviews of completed bookings

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::application::Actor;
use crate::domain::{DomainError, DomainResult, RatingSummary, RepositoryProvider, Review};

pub struct ReviewService {
    repos: Arc<dyn RepositoryProvider>,
}

impl ReviewService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// Review the charger of a completed booking. One review per user and
    /// charger.
    pub async fn submit(
        &self,
        author: &Actor,
        booking_id: &str,
        rating: u8,
        comment: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Review> {
        let mut booking = self
            .repos
            .bookings()
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", "id", booking_id))?;

        if booking.user_id != author.user_id {
            return Err(DomainError::Forbidden("Not your booking".into()));
        }
        if !booking.can_review(now) {
            return Err(DomainError::Validation(if booking.has_review {
                "This booking has already been reviewed".to_string()
            } else {
                "Only completed bookings can be reviewed".to_string()
            }));
        }
        if self
            .repos
            .reviews()
            .find_by_user_and_charger(&author.user_id, &booking.charger_id)
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict(
                "You have already reviewed this charger".into(),
            ));
        }

        let review = Review::new(
            booking.id.as_str(),
            booking.charger_id.as_str(),
            author.user_id.as_str(),
            author.name.as_str(),
            rating,
            comment,
        )?;
        self.repos.reviews().save(review.clone()).await?;

        booking.has_review = true;
        booking.refresh_status(now);
        self.repos.bookings().update(booking).await?;

        info!(review_id = %review.id, charger_id = %review.charger_id, rating, "Review submitted");
        Ok(review)
    }

    /// Reviews of a charger, newest first, with their summary.
    pub async fn list_for_charger(&self, charger_id: &str) -> DomainResult<(Vec<Review>, RatingSummary)> {
        if self.repos.chargers().find_by_id(charger_id).await?.is_none() {
            return Err(DomainError::not_found("Charger", "id", charger_id));
        }
        let reviews = self.repos.reviews().find_for_charger(charger_id).await?;
        let summary = RatingSummary::from_reviews(&reviews);
        Ok((reviews, summary))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::application::services::fixtures::{now, Harness};
    use crate::domain::Booking;

    async fn past_booking(h: &Harness, id: &str) -> Booking {
        let cost = h.charger.quote(1.0).unwrap();
        let booking = Booking::new(id, "c-1", h.guest.user_id.as_str(), "Alex", now() - Duration::hours(3), 1, &cost);
        h.repos.bookings().save(booking.clone()).await.unwrap();
        booking
    }

    #[tokio::test]
    async fn completed_booking_can_be_reviewed_once() {
        let h = Harness::new().await;
        let svc = ReviewService::new(h.repos.clone());
        past_booking(&h, "b-1").await;
        past_booking(&h, "b-2").await;

        let review = svc.submit(&h.guest, "b-1", 4, " Easy access ", now()).await.unwrap();
        assert_eq!(review.comment, "Easy access");

        let booking = h.repos.bookings().find_by_id("b-1").await.unwrap().unwrap();
        assert!(booking.has_review);

        // Second review of the same booking, then of the same charger
        assert!(matches!(
            svc.submit(&h.guest, "b-1", 5, "", now()).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            svc.submit(&h.guest, "b-2", 5, "", now()).await,
            Err(DomainError::Conflict(_))
        ));

        let (reviews, summary) = svc.list_for_charger("c-1").await.unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.average, 4.0);
    }

    #[tokio::test]
    async fn review_eligibility() {
        let h = Harness::new().await;
        let svc = ReviewService::new(h.repos.clone());
        past_booking(&h, "b-1").await;

        assert!(matches!(
            svc.submit(&h.host, "b-1", 5, "", now()).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            svc.submit(&h.guest, "b-1", 0, "", now()).await,
            Err(DomainError::Validation(_))
        ));
        // Still running two hours earlier
        assert!(matches!(
            svc.submit(&h.guest, "b-1", 5, "", now() - Duration::hours(2) - Duration::minutes(30)).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            svc.submit(&h.guest, "missing", 5, "", now()).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            svc.list_for_charger("missing").await,
            Err(DomainError::NotFound { .. })
        ));
    }
}
