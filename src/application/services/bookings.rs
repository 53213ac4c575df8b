//! Booking service: quote, checkout, commit, cancel and status upkeep
//!
//! A booking is only ever persisted by [`BookingService::commit`], after the
//! gateway reports the PaymentIntent as `succeeded` for the quoted amount.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, Timelike, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::application::notifications::BookingNotifier;
use crate::application::ports::{CreateIntentRequest, PaymentIntent, SharedPaymentGateway};
use crate::application::Actor;
use crate::config::AppConfig;
use crate::domain::scheduling::{
    available_slots, calculate_availability, conflicting_bookings, AvailabilityInfo, SlotWindow,
};
use crate::domain::{
    Booking, BookingStatus, Charger, CostBreakdown, DomainError, DomainResult, RepositoryProvider,
};

/// Booking rules taken from configuration
#[derive(Debug, Clone)]
pub struct BookingSettings {
    pub allowed_durations: Vec<u32>,
    pub window: SlotWindow,
    /// Local time of the slot grid and of email timestamps
    pub offset: FixedOffset,
    pub currency: String,
    pub reminder_lead: Duration,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            allowed_durations: vec![1, 2, 4, 8],
            window: SlotWindow::default(),
            offset: utc_offset(0),
            currency: "usd".to_string(),
            reminder_lead: Duration::hours(24),
        }
    }
}

impl BookingSettings {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            allowed_durations: cfg.scheduling.allowed_durations.clone(),
            window: SlotWindow {
                first_hour: cfg.scheduling.day_start_hour,
                last_hour: cfg.scheduling.day_end_hour,
            },
            offset: utc_offset(cfg.scheduling.utc_offset_minutes),
            currency: cfg.payments.currency.to_lowercase(),
            reminder_lead: Duration::hours(cfg.scheduling.reminder_lead_hours),
        }
    }
}

/// `FixedOffset` from minutes east of UTC; out-of-range values fall back to UTC.
pub fn utc_offset(minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
}

/// A validated slot with its price
#[derive(Debug, Clone)]
pub struct Quote {
    pub charger: Charger,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_hours: u32,
    pub cost: CostBreakdown,
}

/// What the guest needs to confirm payment client-side
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    /// Pre-assigned; the committed booking carries this ID
    pub booking_id: String,
    pub payment_intent_id: String,
    pub client_secret: String,
    pub quote: Quote,
}

#[derive(Debug, Clone)]
pub struct CommitRequest {
    pub booking_id: String,
    pub charger_id: String,
    pub start_time: DateTime<Utc>,
    pub duration_hours: u32,
    pub payment_intent_id: String,
}

pub struct BookingService {
    repos: Arc<dyn RepositoryProvider>,
    gateway: SharedPaymentGateway,
    notifier: Arc<BookingNotifier>,
    settings: BookingSettings,
    /// Serializes conflict check + insert per charger within this process
    charger_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl BookingService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        gateway: SharedPaymentGateway,
        notifier: Arc<BookingNotifier>,
        settings: BookingSettings,
    ) -> Self {
        Self {
            repos,
            gateway,
            notifier,
            settings,
            charger_locks: DashMap::new(),
        }
    }

    pub fn settings(&self) -> &BookingSettings {
        &self.settings
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn availability(&self, charger_id: &str, now: DateTime<Utc>) -> DomainResult<AvailabilityInfo> {
        let charger = self.load_charger(charger_id).await?;
        let bookings = self.repos.bookings().find_for_charger(&charger.id).await?;
        Ok(calculate_availability(&charger.id, now, &bookings))
    }

    /// Bookable start times on `date`. `offset` overrides the configured
    /// local time zone.
    pub async fn available_slots(
        &self,
        charger_id: &str,
        date: NaiveDate,
        duration_hours: u32,
        offset: Option<FixedOffset>,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<DateTime<Utc>>> {
        self.ensure_duration(duration_hours)?;
        let charger = self.load_charger(charger_id).await?;
        if !charger.is_active {
            return Ok(Vec::new());
        }
        let bookings = self.repos.bookings().find_for_charger(&charger.id).await?;
        let slots = available_slots(
            &charger.id,
            date,
            duration_hours,
            offset.unwrap_or(self.settings.offset),
            self.settings.window,
            now,
            &bookings,
        );
        Ok(slots.collect())
    }

    /// Validate a slot and price it.
    pub async fn quote(
        &self,
        charger_id: &str,
        start_time: DateTime<Utc>,
        duration_hours: u32,
        now: DateTime<Utc>,
    ) -> DomainResult<Quote> {
        self.ensure_duration(duration_hours)?;
        let charger = self.load_charger(charger_id).await?;
        self.ensure_bookable(&charger, start_time, now)?;

        let end_time = start_time + Duration::hours(duration_hours as i64);
        let bookings = self.repos.bookings().find_for_charger(&charger.id).await?;
        if !conflicting_bookings(&charger.id, start_time, end_time, &bookings, None, now).is_empty() {
            return Err(DomainError::SlotUnavailable {
                charger_id: charger.id.clone(),
                start: start_time,
                end: end_time,
            });
        }

        let cost = charger.quote(duration_hours as f64)?;
        Ok(Quote {
            charger,
            start_time,
            end_time,
            duration_hours,
            cost,
        })
    }

    /// Bookings of the guest, newest first, with effective statuses.
    pub async fn list_for_user(&self, user_id: &str, now: DateTime<Utc>) -> DomainResult<Vec<Booking>> {
        let bookings = self.repos.bookings().find_for_user(user_id).await?;
        Ok(bookings.into_iter().map(|b| with_effective_status(b, now)).collect())
    }

    /// Visible to the guest, the charger's host and admins.
    pub async fn get(&self, actor: &Actor, booking_id: &str, now: DateTime<Utc>) -> DomainResult<Booking> {
        let booking = self.load_booking(booking_id).await?;
        if booking.user_id != actor.user_id && !actor.is_admin() {
            let charger = self.repos.chargers().find_by_id(&booking.charger_id).await?;
            if !charger.is_some_and(|c| c.is_hosted_by(&actor.user_id)) {
                return Err(DomainError::Forbidden("Not your booking".into()));
            }
        }
        Ok(with_effective_status(booking, now))
    }

    // ── Checkout & commit ───────────────────────────────────────

    /// Quote the slot and open a PaymentIntent for it.
    pub async fn checkout(
        &self,
        guest: &Actor,
        charger_id: &str,
        start_time: DateTime<Utc>,
        duration_hours: u32,
        now: DateTime<Utc>,
    ) -> DomainResult<CheckoutSession> {
        let quote = self.quote(charger_id, start_time, duration_hours, now).await?;
        if quote.charger.is_hosted_by(&guest.user_id) {
            return Err(DomainError::Forbidden(
                "Hosts cannot book their own charger".into(),
            ));
        }

        let destination = self
            .repos
            .host_accounts()
            .find_by_host(&quote.charger.host_id)
            .await?
            .filter(|a| a.can_receive_payments())
            .map(|a| a.stripe_account_id);

        let booking_id = uuid::Uuid::new_v4().to_string();
        let request = CreateIntentRequest {
            amount_cents: quote.cost.total_cents(),
            currency: self.settings.currency.clone(),
            application_fee_cents: destination
                .as_ref()
                .map(|_| quote.cost.application_fee_cents()),
            destination_account: destination,
            charger_id: quote.charger.id.clone(),
            booking_id: booking_id.clone(),
            start_time: Some(quote.start_time),
            duration_hours: Some(quote.duration_hours),
        };

        let created = self.gateway.create_payment_intent(request).await.map_err(|e| {
            metrics::counter!("plugspot_payments_failed_total", "stage" => "create").increment(1);
            warn!(charger_id, error = %e, "PaymentIntent creation failed");
            DomainError::from(e)
        })?;

        info!(
            booking_id = %booking_id,
            charger_id,
            payment_intent_id = %created.payment_intent_id,
            amount_cents = quote.cost.total_cents(),
            "Checkout started"
        );

        Ok(CheckoutSession {
            booking_id,
            payment_intent_id: created.payment_intent_id,
            client_secret: created.client_secret,
            quote,
        })
    }

    /// Persist a paid booking.
    ///
    /// The intent must have succeeded, carry this booking's ID, charger and
    /// slot, and match the quoted total. Committing the same intent twice
    /// returns the stored booking.
    pub async fn commit(&self, guest: &Actor, req: CommitRequest, now: DateTime<Utc>) -> DomainResult<Booking> {
        self.ensure_duration(req.duration_hours)?;
        let charger = self.load_charger(&req.charger_id).await?;
        if charger.is_hosted_by(&guest.user_id) {
            return Err(DomainError::Forbidden(
                "Hosts cannot book their own charger".into(),
            ));
        }

        if let Some(existing) = self.replayed(guest, &req, now).await? {
            return Ok(existing);
        }
        self.ensure_bookable(&charger, req.start_time, now)?;

        let intent = self
            .gateway
            .retrieve_payment_intent(&req.payment_intent_id)
            .await?;
        if !intent.status.is_succeeded() {
            metrics::counter!("plugspot_payments_failed_total", "stage" => "commit").increment(1);
            return Err(DomainError::Payment(format!(
                "Payment not completed (status: {})",
                intent.status
            )));
        }
        if intent.booking_id() != Some(req.booking_id.as_str()) {
            return Err(DomainError::Payment(
                "Payment does not belong to this booking".into(),
            ));
        }
        ensure_intent_slot(&intent, &req)?;
        let cost = charger.quote(req.duration_hours as f64)?;
        if intent.amount != cost.total_cents() {
            return Err(DomainError::Payment(format!(
                "Paid amount {} does not match the booking total {}",
                intent.amount,
                cost.total_cents()
            )));
        }

        let end_time = req.start_time + Duration::hours(req.duration_hours as i64);
        let lock = self.charger_lock(&charger.id);
        let booking = {
            let _guard = lock.lock().await;

            if let Some(existing) = self.replayed(guest, &req, now).await? {
                return Ok(existing);
            }
            let bookings = self.repos.bookings().find_for_charger(&charger.id).await?;
            let conflicts =
                conflicting_bookings(&charger.id, req.start_time, end_time, &bookings, None, now);
            if !conflicts.is_empty() {
                metrics::counter!("plugspot_booking_conflicts_total").increment(1);
                warn!(
                    booking_id = %req.booking_id,
                    payment_intent_id = %intent.id,
                    conflicting = conflicts.len(),
                    "Paid booking lost its slot"
                );
                return Err(DomainError::SlotUnavailable {
                    charger_id: charger.id.clone(),
                    start: req.start_time,
                    end: end_time,
                });
            }

            let booking = Booking::new(
                req.booking_id.as_str(),
                charger.id.as_str(),
                guest.user_id.as_str(),
                guest.name.as_str(),
                req.start_time,
                req.duration_hours,
                &cost,
            )
            .with_payment_intent(intent.id.as_str());
            self.repos.bookings().save(booking.clone()).await?;
            booking
        };

        metrics::counter!("plugspot_bookings_created_total").increment(1);
        info!(
            booking_id = %booking.id,
            charger_id = %charger.id,
            user_id = %guest.user_id,
            total = booking.total_cost,
            "Booking committed"
        );

        let host_email = self
            .repos
            .users()
            .find_by_id(&charger.host_id)
            .await
            .ok()
            .flatten()
            .map(|u| u.email);
        self.notifier
            .booking_confirmed(&booking, &charger, &guest.email, host_email.as_deref())
            .await;

        Ok(booking)
    }

    // ── Mutations ───────────────────────────────────────────────

    /// Guest cancels an upcoming booking before it starts.
    pub async fn cancel(&self, actor: &Actor, booking_id: &str, now: DateTime<Utc>) -> DomainResult<Booking> {
        let mut booking = self.load_booking(booking_id).await?;
        if booking.user_id != actor.user_id {
            return Err(DomainError::Forbidden("Only the guest can cancel a booking".into()));
        }
        if !booking.can_cancel(now) {
            return Err(DomainError::Validation(format!(
                "Booking can no longer be cancelled (status: {})",
                booking.effective_status(now)
            )));
        }

        booking.cancel();
        self.repos.bookings().update(booking.clone()).await?;

        metrics::counter!("plugspot_bookings_cancelled_total").increment(1);
        info!(booking_id, user_id = %actor.user_id, "Booking cancelled");
        Ok(booking)
    }

    /// Persist time-based status promotion. Returns how many bookings changed.
    pub async fn refresh_statuses(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        let mut changed = 0;
        for mut booking in self.repos.bookings().find_open().await? {
            if booking.refresh_status(now) {
                debug!(booking_id = %booking.id, status = %booking.status, "Booking status promoted");
                self.repos.bookings().update(booking).await?;
                changed += 1;
            }
        }
        if changed > 0 {
            info!(count = changed, "Booking statuses refreshed");
        }
        Ok(changed)
    }

    /// Email guests whose booking starts within the reminder lead time.
    /// Each booking is reminded at most once.
    pub async fn send_due_reminders(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        let horizon = now + self.settings.reminder_lead;
        let mut sent = 0;

        for mut booking in self.repos.bookings().find_open().await? {
            if booking.reminder_sent
                || booking.effective_status(now) != BookingStatus::Upcoming
                || booking.start_time > horizon
            {
                continue;
            }
            let Some(charger) = self.repos.chargers().find_by_id(&booking.charger_id).await? else {
                continue;
            };
            let Some(guest) = self.repos.users().find_by_id(&booking.user_id).await? else {
                continue;
            };

            if self
                .notifier
                .booking_reminder(&booking, &charger, &guest.email)
                .await
            {
                booking.reminder_sent = true;
                self.repos.bookings().update(booking).await?;
                sent += 1;
            }
        }
        Ok(sent)
    }

    // ── Helpers ─────────────────────────────────────────────────

    /// The booking already stored for this intent, if the same guest is
    /// committing it again.
    async fn replayed(&self, guest: &Actor, req: &CommitRequest, now: DateTime<Utc>) -> DomainResult<Option<Booking>> {
        let Some(existing) = self
            .repos
            .bookings()
            .find_by_payment_intent(&req.payment_intent_id)
            .await?
        else {
            return Ok(None);
        };
        if existing.id == req.booking_id && existing.user_id == guest.user_id {
            debug!(booking_id = %existing.id, "Commit replayed");
            return Ok(Some(with_effective_status(existing, now)));
        }
        Err(DomainError::Conflict(
            "This payment has already been used for another booking".into(),
        ))
    }

    /// Active charger, start not in the past, on a whole local hour inside
    /// the operating window.
    fn ensure_bookable(&self, charger: &Charger, start_time: DateTime<Utc>, now: DateTime<Utc>) -> DomainResult<()> {
        if !charger.is_active {
            return Err(DomainError::Validation(
                "This charger is not accepting bookings".into(),
            ));
        }
        if start_time < now {
            return Err(DomainError::Validation("Start time is in the past".into()));
        }

        let local = start_time.with_timezone(&self.settings.offset);
        let window = self.settings.window;
        let on_the_hour = local.minute() == 0 && local.second() == 0 && local.nanosecond() == 0;
        if !on_the_hour || local.hour() < window.first_hour || local.hour() > window.last_hour {
            return Err(DomainError::Validation(format!(
                "Bookings start on the hour between {:02}:00 and {:02}:00",
                window.first_hour, window.last_hour
            )));
        }
        Ok(())
    }

    fn ensure_duration(&self, duration_hours: u32) -> DomainResult<()> {
        if self.settings.allowed_durations.contains(&duration_hours) {
            Ok(())
        } else {
            Err(DomainError::Validation(format!(
                "Duration must be one of {:?} hours",
                self.settings.allowed_durations
            )))
        }
    }

    fn charger_lock(&self, charger_id: &str) -> Arc<Mutex<()>> {
        self.charger_locks
            .entry(charger_id.to_string())
            .or_default()
            .clone()
    }

    async fn load_charger(&self, id: &str) -> DomainResult<Charger> {
        self.repos
            .chargers()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Charger", "id", id))
    }

    async fn load_booking(&self, id: &str) -> DomainResult<Booking> {
        self.repos
            .bookings()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", "id", id))
    }
}

fn ensure_intent_slot(intent: &PaymentIntent, req: &CommitRequest) -> DomainResult<()> {
    if intent.charger_id() != Some(req.charger_id.as_str())
        || intent.start_time() != Some(req.start_time)
        || intent.duration_hours() != Some(req.duration_hours)
    {
        return Err(DomainError::Payment(
            "Payment was made for a different charger or time slot".into(),
        ));
    }
    Ok(())
}

fn with_effective_status(mut booking: Booking, now: DateTime<Utc>) -> Booking {
    booking.status = booking.effective_status(now);
    booking
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::application::ports::payment::{
        META_BOOKING_ID, META_CHARGER_ID, META_DURATION_HOURS, META_START_TIME,
    };
    use crate::application::ports::{
        ConnectedAccount, CreatedIntent, IntentStatus, PaymentGateway, PaymentGatewayError,
    };
    use crate::application::services::fixtures::{charger, now, tomorrow_at, Harness};
    use crate::infrastructure::stripe::MockPaymentGateway;

    /// Yields once before every intent lookup so concurrent commits interleave.
    struct YieldingGateway(Arc<MockPaymentGateway>);

    #[async_trait::async_trait]
    impl PaymentGateway for YieldingGateway {
        async fn create_payment_intent(
            &self,
            request: CreateIntentRequest,
        ) -> Result<CreatedIntent, PaymentGatewayError> {
            self.0.create_payment_intent(request).await
        }

        async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, PaymentGatewayError> {
            tokio::task::yield_now().await;
            self.0.retrieve_payment_intent(id).await
        }

        fn connect_oauth_url(&self, host_id: &str, return_url: &str) -> Result<String, PaymentGatewayError> {
            self.0.connect_oauth_url(host_id, return_url)
        }

        async fn exchange_oauth_code(&self, code: &str) -> Result<String, PaymentGatewayError> {
            self.0.exchange_oauth_code(code).await
        }

        async fn get_account(&self, account_id: &str) -> Result<ConnectedAccount, PaymentGatewayError> {
            self.0.get_account(account_id).await
        }
    }

    fn commit_request(session: &CheckoutSession) -> CommitRequest {
        CommitRequest {
            booking_id: session.booking_id.clone(),
            charger_id: session.quote.charger.id.clone(),
            start_time: session.quote.start_time,
            duration_hours: session.quote.duration_hours,
            payment_intent_id: session.payment_intent_id.clone(),
        }
    }

    async fn book(h: &Harness, svc: &BookingService, hour: u32) -> Booking {
        let session = svc
            .checkout(&h.guest, "c-1", tomorrow_at(hour), 2, now())
            .await
            .unwrap();
        svc.commit(&h.guest, commit_request(&session), now()).await.unwrap()
    }

    #[tokio::test]
    async fn checkout_then_commit_persists_and_notifies() {
        let h = Harness::new().await;
        let svc = h.bookings();

        let session = svc
            .checkout(&h.guest, "c-1", tomorrow_at(10), 2, now())
            .await
            .unwrap();
        assert_eq!(session.quote.cost.total_cents(), 611);
        assert!(session.client_secret.starts_with(&session.payment_intent_id));

        let booking = svc.commit(&h.guest, commit_request(&session), now()).await.unwrap();
        assert_eq!(booking.id, session.booking_id);
        assert_eq!(booking.status, BookingStatus::Upcoming);
        assert_eq!(booking.end_time, tomorrow_at(12));
        assert_eq!(booking.payment_intent_id.as_deref(), Some(session.payment_intent_id.as_str()));

        let stored = h.repos.bookings().find_by_id(&booking.id).await.unwrap();
        assert_eq!(stored, Some(booking));

        let sent = h.outbox.sent();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[2].to, vec![h.host.email.clone()]);
    }

    #[tokio::test]
    async fn unpaid_intent_is_not_committed() {
        let h = Harness::with_gateway(
            MockPaymentGateway::new("http://x").with_initial_status(IntentStatus::RequiresPaymentMethod),
        )
        .await;
        let svc = h.bookings();

        let session = svc
            .checkout(&h.guest, "c-1", tomorrow_at(10), 2, now())
            .await
            .unwrap();
        let err = svc
            .commit(&h.guest, commit_request(&session), now())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Payment(ref m) if m.contains("requires_payment_method")));
        assert!(h.repos.bookings().find_all().await.unwrap().is_empty());
        assert!(h.outbox.sent().is_empty());
    }

    #[tokio::test]
    async fn amount_and_booking_id_must_match_the_intent() {
        let h = Harness::new().await;
        let svc = h.bookings();

        h.gateway.insert_intent(PaymentIntent {
            id: "pi_cheap".into(),
            status: IntentStatus::Succeeded,
            amount: 50,
            currency: "usd".into(),
            metadata: [
                (META_BOOKING_ID.to_string(), "b-1".to_string()),
                (META_CHARGER_ID.to_string(), "c-1".to_string()),
                (META_START_TIME.to_string(), "2026-03-15T10:00:00Z".to_string()),
                (META_DURATION_HOURS.to_string(), "2".to_string()),
            ]
            .into(),
        });
        let req = CommitRequest {
            booking_id: "b-1".into(),
            charger_id: "c-1".into(),
            start_time: tomorrow_at(10),
            duration_hours: 2,
            payment_intent_id: "pi_cheap".into(),
        };
        let err = svc.commit(&h.guest, req.clone(), now()).await.unwrap_err();
        assert!(matches!(err, DomainError::Payment(ref m) if m.contains("does not match")));

        let err = svc
            .commit(
                &h.guest,
                CommitRequest {
                    booking_id: "b-other".into(),
                    ..req
                },
                now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Payment(ref m) if m.contains("does not belong")));
    }

    #[tokio::test]
    async fn second_payment_for_the_same_slot_loses() {
        let h = Harness::new().await;
        let svc = h.bookings();

        let first = svc
            .checkout(&h.guest, "c-1", tomorrow_at(10), 2, now())
            .await
            .unwrap();
        let second = svc
            .checkout(&h.guest, "c-1", tomorrow_at(11), 2, now())
            .await
            .unwrap();

        svc.commit(&h.guest, commit_request(&first), now()).await.unwrap();
        let err = svc
            .commit(&h.guest, commit_request(&second), now())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::SlotUnavailable { .. }));
        assert_eq!(h.repos.bookings().find_all().await.unwrap().len(), 1);

        // The quote now refuses the taken slot outright
        let err = svc
            .quote("c-1", tomorrow_at(11), 2, now())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::SlotUnavailable { .. }));
        // Touching the end of the first booking is fine
        assert!(svc.quote("c-1", tomorrow_at(12), 2, now()).await.is_ok());
    }

    #[tokio::test]
    async fn replayed_commit_returns_the_same_booking() {
        let h = Harness::new().await;
        let svc = h.bookings();

        let session = svc
            .checkout(&h.guest, "c-1", tomorrow_at(10), 2, now())
            .await
            .unwrap();
        let a = svc.commit(&h.guest, commit_request(&session), now()).await.unwrap();
        let b = svc.commit(&h.guest, commit_request(&session), now()).await.unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(h.repos.bookings().find_all().await.unwrap().len(), 1);
        assert_eq!(h.outbox.sent().len(), 3);

        let mut other = commit_request(&session);
        other.booking_id = "b-different".into();
        let err = svc.commit(&h.guest, other, now()).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn hosts_cannot_book_their_own_charger() {
        let h = Harness::new().await;
        let err = h
            .bookings()
            .checkout(&h.host, "c-1", tomorrow_at(10), 2, now())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn quote_validates_duration_start_and_charger() {
        let h = Harness::new().await;
        let svc = h.bookings();

        assert!(matches!(
            svc.quote("c-1", tomorrow_at(10), 3, now()).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            svc.quote("c-1", now() - Duration::hours(1), 1, now()).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            svc.quote("missing", tomorrow_at(10), 1, now()).await,
            Err(DomainError::NotFound { .. })
        ));

        let mut charger = h.charger.clone();
        charger.set_active(false);
        h.repos.chargers().update(charger).await.unwrap();
        assert!(matches!(
            svc.quote("c-1", tomorrow_at(10), 1, now()).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn slots_skip_booked_hours() {
        let h = Harness::new().await;
        let svc = h.bookings();
        book(&h, &svc, 10).await;

        let date = tomorrow_at(0).date_naive();
        let slots = svc
            .available_slots("c-1", date, 2, None, now())
            .await
            .unwrap();
        assert!(slots.contains(&tomorrow_at(8)));
        assert!(!slots.contains(&tomorrow_at(9)));
        assert!(!slots.contains(&tomorrow_at(11)));
        assert!(slots.contains(&tomorrow_at(12)));
        assert_eq!(slots.first(), Some(&tomorrow_at(6)));
        assert_eq!(slots.last(), Some(&tomorrow_at(22)));
    }

    #[tokio::test]
    async fn only_the_guest_cancels_and_only_before_start() {
        let h = Harness::new().await;
        let svc = h.bookings();
        let booking = book(&h, &svc, 10).await;

        assert!(matches!(
            svc.cancel(&h.host, &booking.id, now()).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            svc.cancel(&h.guest, &booking.id, tomorrow_at(10)).await,
            Err(DomainError::Validation(_))
        ));

        let cancelled = svc.cancel(&h.guest, &booking.id, now()).await.unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert!(matches!(
            svc.cancel(&h.guest, &booking.id, now()).await,
            Err(DomainError::Validation(_))
        ));

        // The slot is free again
        assert!(svc.quote("c-1", tomorrow_at(10), 2, now()).await.is_ok());
    }

    #[tokio::test]
    async fn booking_visibility() {
        let h = Harness::new().await;
        let svc = h.bookings();
        let booking = book(&h, &svc, 10).await;

        assert!(svc.get(&h.guest, &booking.id, now()).await.is_ok());
        assert!(svc.get(&h.host, &booking.id, now()).await.is_ok());
        assert!(svc.get(&h.admin, &booking.id, now()).await.is_ok());

        let stranger = Actor {
            user_id: "someone".into(),
            ..h.guest.clone()
        };
        assert!(matches!(
            svc.get(&stranger, &booking.id, now()).await,
            Err(DomainError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn statuses_are_promoted_and_persisted() {
        let h = Harness::new().await;
        let svc = h.bookings();
        let booking = book(&h, &svc, 10).await;

        let during = tomorrow_at(10) + Duration::minutes(30);
        assert_eq!(svc.refresh_statuses(during).await.unwrap(), 1);
        assert_eq!(svc.refresh_statuses(during).await.unwrap(), 0);
        let stored = h.repos.bookings().find_by_id(&booking.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Active);

        let listed = svc.list_for_user(&h.guest.user_id, tomorrow_at(13)).await.unwrap();
        assert_eq!(listed[0].status, BookingStatus::Completed);

        assert_eq!(svc.refresh_statuses(tomorrow_at(13)).await.unwrap(), 1);
        assert!(h.repos.bookings().find_open().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reminders_are_sent_once() {
        let h = Harness::new().await;
        let svc = h.bookings();
        book(&h, &svc, 10).await;
        let before = h.outbox.sent().len();

        // More than 24h ahead: nothing due yet
        let early = tomorrow_at(10) - Duration::hours(25);
        assert_eq!(svc.send_due_reminders(early).await.unwrap(), 0);

        let due = tomorrow_at(10) - Duration::hours(1);
        assert_eq!(svc.send_due_reminders(due).await.unwrap(), 1);
        assert_eq!(svc.send_due_reminders(due).await.unwrap(), 0);
        assert_eq!(h.outbox.sent().len(), before + 1);
    }

    #[tokio::test]
    async fn intent_only_books_the_charger_and_slot_it_was_paid_for() {
        let h = Harness::new().await;
        let host = h.repos.users().find_by_id(&h.host.user_id).await.unwrap().unwrap();
        h.repos.chargers().save(charger("c-2", &host)).await.unwrap();
        let svc = h.bookings();

        let session = svc
            .checkout(&h.guest, "c-1", tomorrow_at(10), 2, now())
            .await
            .unwrap();

        let other_charger = CommitRequest {
            charger_id: "c-2".into(),
            ..commit_request(&session)
        };
        let other_start = CommitRequest {
            start_time: tomorrow_at(14),
            ..commit_request(&session)
        };
        let other_duration = CommitRequest {
            duration_hours: 1,
            ..commit_request(&session)
        };
        for req in [other_charger, other_start, other_duration] {
            let err = svc.commit(&h.guest, req, now()).await.unwrap_err();
            assert!(matches!(err, DomainError::Payment(ref m) if m.contains("different charger")));
        }
        assert!(h.repos.bookings().find_all().await.unwrap().is_empty());

        let booking = svc.commit(&h.guest, commit_request(&session), now()).await.unwrap();
        assert_eq!(booking.charger_id, "c-1");
    }

    #[tokio::test]
    async fn concurrent_commits_of_one_payment_both_return_the_booking() {
        let h = Harness::new().await;
        let svc = BookingService::new(
            h.repos.clone(),
            Arc::new(YieldingGateway(h.gateway.clone())),
            h.notifier(),
            BookingSettings::default(),
        );

        let session = svc
            .checkout(&h.guest, "c-1", tomorrow_at(10), 2, now())
            .await
            .unwrap();
        let (first, second) = tokio::join!(
            svc.commit(&h.guest, commit_request(&session), now()),
            svc.commit(&h.guest, commit_request(&session), now()),
        );
        let (first, second) = (first.unwrap(), second.unwrap());
        assert_eq!(first.id, session.booking_id);
        assert_eq!(second.id, session.booking_id);
        assert_eq!(h.repos.bookings().find_all().await.unwrap().len(), 1);
        assert_eq!(h.outbox.sent().len(), 3);
    }

    #[tokio::test]
    async fn starts_must_sit_on_the_hourly_grid() {
        let h = Harness::new().await;
        let svc = h.bookings();

        let off_grid = tomorrow_at(10) + Duration::minutes(17);
        for start in [tomorrow_at(3) + Duration::minutes(17), off_grid, tomorrow_at(5), tomorrow_at(23)] {
            assert!(matches!(
                svc.quote("c-1", start, 1, now()).await,
                Err(DomainError::Validation(_))
            ));
        }
        assert!(matches!(
            svc.checkout(&h.guest, "c-1", off_grid, 1, now()).await,
            Err(DomainError::Validation(_))
        ));
        assert!(svc.quote("c-1", tomorrow_at(6), 1, now()).await.is_ok());
        assert!(svc.quote("c-1", tomorrow_at(22), 1, now()).await.is_ok());

        // The grid follows the configured local time
        let east = BookingService::new(
            h.repos.clone(),
            h.gateway.clone(),
            h.notifier(),
            BookingSettings {
                offset: utc_offset(60),
                ..BookingSettings::default()
            },
        );
        assert!(east.quote("c-1", tomorrow_at(5), 1, now()).await.is_ok());
        assert!(matches!(
            east.quote("c-1", tomorrow_at(22), 1, now()).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn commit_rechecks_charger_and_start() {
        let h = Harness::new().await;
        let svc = h.bookings();

        let session = svc
            .checkout(&h.guest, "c-1", tomorrow_at(10), 2, now())
            .await
            .unwrap();

        let mut paused = h.charger.clone();
        paused.set_active(false);
        h.repos.chargers().update(paused).await.unwrap();
        assert!(matches!(
            svc.commit(&h.guest, commit_request(&session), now()).await,
            Err(DomainError::Validation(ref m)) if m.contains("not accepting")
        ));

        h.repos.chargers().update(h.charger.clone()).await.unwrap();
        assert!(matches!(
            svc.commit(&h.guest, commit_request(&session), tomorrow_at(11)).await,
            Err(DomainError::Validation(ref m)) if m.contains("past")
        ));
        assert!(h.repos.bookings().find_all().await.unwrap().is_empty());

        svc.commit(&h.guest, commit_request(&session), now()).await.unwrap();
    }
}
