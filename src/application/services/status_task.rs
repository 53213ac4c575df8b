//! Background task that keeps booking statuses current and sends reminders.
//!
//! Every `check_interval_secs` it persists the time-based status promotion
//! and emails guests whose booking starts within the reminder lead time.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{info, warn};

use super::bookings::BookingService;
use crate::shared::shutdown::ShutdownSignal;

/// Start the booking status task.
pub fn start_booking_status_task(
    bookings: Arc<BookingService>,
    shutdown: ShutdownSignal,
    check_interval_secs: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(check_interval = check_interval_secs, "📅 Booking status task started");

        let mut interval = tokio::time::interval(Duration::from_secs(check_interval_secs.max(1)));

        loop {
            tokio::select! {
                _ = interval.tick() => run_once(&bookings).await,
                _ = shutdown.wait() => {
                    info!("📅 Booking status task shutting down");
                    break;
                }
            }
        }

        info!("📅 Booking status task stopped");
    })
}

async fn run_once(bookings: &BookingService) {
    let now = Utc::now();
    if let Err(e) = bookings.refresh_statuses(now).await {
        warn!(error = %e, "Booking status refresh failed");
    }
    match bookings.send_due_reminders(now).await {
        Ok(0) => {}
        Ok(sent) => info!(count = sent, "Booking reminders sent"),
        Err(e) => warn!(error = %e, "Booking reminder pass failed"),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;

    use super::*;
    use crate::application::services::fixtures::Harness;
    use crate::domain::{Booking, BookingStatus, RepositoryProvider};

    #[tokio::test]
    async fn task_promotes_and_stops_on_shutdown() {
        let h = Harness::new().await;
        let cost = h.charger.quote(1.0).unwrap();
        let started = Booking::new(
            "b-1",
            "c-1",
            h.guest.user_id.as_str(),
            "Alex",
            Utc::now() - ChronoDuration::minutes(10),
            1,
            &cost,
        );
        h.repos.bookings().save(started).await.unwrap();

        let shutdown = ShutdownSignal::new();
        let handle = start_booking_status_task(Arc::new(h.bookings()), shutdown.clone(), 60);

        // The first tick fires immediately
        let mut promoted = false;
        for _ in 0..50 {
            let b = h.repos.bookings().find_by_id("b-1").await.unwrap().unwrap();
            if b.status == BookingStatus::Active {
                promoted = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(promoted);

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
