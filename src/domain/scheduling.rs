//! Availability engine
//!
//! Pure functions over a charger's bookings: current availability, interval
//! conflicts, bookable start times, and the time-based status promotion.
//! Availability is never stored; it is derived from bookings on each call.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};

use crate::domain::booking::{Booking, BookingStatus};

/// Mean Earth radius in miles.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Apply the time-based status transitions at `now`.
///
/// upcoming → active once started, upcoming|active → completed once ended.
/// Completed and cancelled are terminal. Applying twice yields the same
/// result as applying once.
pub fn promote_status(
    status: BookingStatus,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> BookingStatus {
    match status {
        BookingStatus::Upcoming | BookingStatus::Active if now >= end => BookingStatus::Completed,
        BookingStatus::Upcoming if start <= now => BookingStatus::Active,
        other => other,
    }
}

/// Derived availability of one charger at a point in time
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityInfo {
    pub is_available: bool,
    /// End of the current booking, or start of the next one
    pub next_available_time: Option<DateTime<Utc>>,
    pub current_booking: Option<Booking>,
    /// Future bookings, earliest first
    pub upcoming_bookings: Vec<Booking>,
}

impl AvailabilityInfo {
    fn free() -> Self {
        Self {
            is_available: true,
            next_available_time: None,
            current_booking: None,
            upcoming_bookings: Vec::new(),
        }
    }
}

/// Bookings of `charger_id` that still block time at `now`, with their
/// effective status filled in, sorted by start.
fn blocking_bookings(charger_id: &str, now: DateTime<Utc>, bookings: &[Booking]) -> Vec<Booking> {
    let mut relevant: Vec<Booking> = bookings
        .iter()
        .filter(|b| b.charger_id == charger_id && b.end_time > now)
        .filter_map(|b| {
            let status = b.effective_status(now);
            status.is_blocking().then(|| Booking {
                status,
                ..b.clone()
            })
        })
        .collect();
    relevant.sort_by_key(|b| b.start_time);
    relevant
}

/// Compute whether a charger is free at `now` and when it next changes.
pub fn calculate_availability(
    charger_id: &str,
    now: DateTime<Utc>,
    bookings: &[Booking],
) -> AvailabilityInfo {
    let mut relevant = blocking_bookings(charger_id, now, bookings);

    if let Some(pos) = relevant
        .iter()
        .position(|b| b.status == BookingStatus::Active)
    {
        let current = relevant.remove(pos);
        return AvailabilityInfo {
            is_available: false,
            next_available_time: Some(current.end_time),
            current_booking: Some(current),
            upcoming_bookings: relevant,
        };
    }

    match relevant.first() {
        Some(first) if first.start_time > now => AvailabilityInfo {
            is_available: true,
            next_available_time: Some(first.start_time),
            current_booking: None,
            upcoming_bookings: relevant,
        },
        _ => AvailabilityInfo::free(),
    }
}

/// Half-open intervals `[s1, e1)` and `[s2, e2)` overlap.
/// Touching endpoints do not.
pub fn intervals_overlap(
    s1: DateTime<Utc>,
    e1: DateTime<Utc>,
    s2: DateTime<Utc>,
    e2: DateTime<Utc>,
) -> bool {
    s1 < e2 && e1 > s2
}

/// Bookings of `charger_id` that overlap `[start, end)` and still block
/// the charger at `now`. `exclude_id` skips one booking (e.g. the one being
/// rescheduled).
pub fn conflicting_bookings<'a>(
    charger_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    bookings: &'a [Booking],
    exclude_id: Option<&str>,
    now: DateTime<Utc>,
) -> Vec<&'a Booking> {
    bookings
        .iter()
        .filter(|b| b.charger_id == charger_id)
        .filter(|b| exclude_id.map_or(true, |id| b.id != id))
        .filter(|b| b.effective_status(now).is_blocking())
        .filter(|b| intervals_overlap(start, end, b.start_time, b.end_time))
        .collect()
}

pub fn has_booking_conflict(
    charger_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    bookings: &[Booking],
    exclude_id: Option<&str>,
    now: DateTime<Utc>,
) -> bool {
    !conflicting_bookings(charger_id, start, end, bookings, exclude_id, now).is_empty()
}

/// Local hours during which a booking may start (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotWindow {
    pub first_hour: u32,
    pub last_hour: u32,
}

impl Default for SlotWindow {
    fn default() -> Self {
        Self {
            first_hour: 6,
            last_hour: 22,
        }
    }
}

/// Bookable start times for one charger on one local date.
///
/// A lazy, finite iterator. Cloning it gives an independent iterator over
/// the same snapshot of bookings.
#[derive(Debug, Clone)]
pub struct AvailableSlots {
    date: NaiveDate,
    offset: FixedOffset,
    duration: Duration,
    now: DateTime<Utc>,
    blocked: Vec<(DateTime<Utc>, DateTime<Utc>)>,
    next_hour: u32,
    last_hour: u32,
}

impl Iterator for AvailableSlots {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_hour <= self.last_hour {
            let hour = self.next_hour;
            self.next_hour += 1;

            let Some(local) = self.date.and_hms_opt(hour, 0, 0) else {
                continue;
            };
            let Some(start) = self.offset.from_local_datetime(&local).single() else {
                continue;
            };
            let start = start.with_timezone(&Utc);
            if start < self.now {
                continue;
            }
            let end = start + self.duration;
            if self
                .blocked
                .iter()
                .any(|(s, e)| intervals_overlap(start, end, *s, *e))
            {
                continue;
            }
            return Some(start);
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.last_hour + 1).saturating_sub(self.next_hour) as usize;
        (0, Some(remaining))
    }
}

/// Start times on `date` (local to `offset`) at which a booking of
/// `duration_hours` fits: whole hours inside `window`, not in the past,
/// and not overlapping any blocking booking.
pub fn available_slots(
    charger_id: &str,
    date: NaiveDate,
    duration_hours: u32,
    offset: FixedOffset,
    window: SlotWindow,
    now: DateTime<Utc>,
    bookings: &[Booking],
) -> AvailableSlots {
    let blocked = blocking_bookings(charger_id, now, bookings)
        .into_iter()
        .map(|b| (b.start_time, b.end_time))
        .collect();

    AvailableSlots {
        date,
        offset,
        duration: Duration::hours(duration_hours as i64),
        now,
        blocked,
        next_hour: window.first_hour,
        last_hour: window.last_hour,
    }
}

/// Great-circle distance in miles (haversine).
pub fn distance_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_MILES * c
}

/// Human-readable "Available in ..." label for browse results.
pub fn format_next_available(next: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(next) = next else {
        return "Available now".to_string();
    };
    if next <= now {
        return "Available now".to_string();
    }

    let diff = next - now;
    let mins = diff.num_minutes();
    let hours = diff.num_hours();
    let days = diff.num_days();
    let plural = |n: i64| if n == 1 { "" } else { "s" };

    if mins < 60 {
        format!("Available in {} minute{}", mins, plural(mins))
    } else if hours < 24 {
        let rem = mins % 60;
        if rem == 0 {
            format!("Available in {} hour{}", hours, plural(hours))
        } else {
            format!("Available in {}h {}m", hours, rem)
        }
    } else {
        format!("Available in {} day{}", days, plural(days))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pricing::calculate_booking_cost;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, h, m, 0).unwrap()
    }

    fn booking(id: &str, start_hour: u32, hours: u32) -> Booking {
        let cost = calculate_booking_cost(0.18, 9.6, 2.0, hours as f64).unwrap();
        Booking::new(id, "c-1", "u-1", "Guest", at(start_hour, 0), hours, &cost)
    }

    #[test]
    fn promotion_rules() {
        use BookingStatus::*;
        let (s, e) = (at(10, 0), at(12, 0));
        assert_eq!(promote_status(Upcoming, s, e, at(9, 0)), Upcoming);
        assert_eq!(promote_status(Upcoming, s, e, at(10, 0)), Active);
        assert_eq!(promote_status(Upcoming, s, e, at(12, 0)), Completed);
        assert_eq!(promote_status(Active, s, e, at(13, 0)), Completed);
        assert_eq!(promote_status(Cancelled, s, e, at(11, 0)), Cancelled);
        assert_eq!(promote_status(Completed, s, e, at(11, 0)), Completed);
    }

    #[test]
    fn promotion_is_idempotent() {
        use BookingStatus::*;
        let (s, e) = (at(10, 0), at(12, 0));
        for status in [Upcoming, Active, Completed, Cancelled] {
            for now in [at(9, 0), at(10, 0), at(11, 30), at(12, 0), at(20, 0)] {
                let once = promote_status(status, s, e, now);
                assert_eq!(promote_status(once, s, e, now), once);
            }
        }
    }

    #[test]
    fn past_start_future_end_upcoming_is_active() {
        let b = booking("b-1", 10, 2);
        assert_eq!(b.effective_status(at(10, 30)), BookingStatus::Active);
    }

    #[test]
    fn no_bookings_means_available_now() {
        let info = calculate_availability("c-1", at(9, 0), &[]);
        assert!(info.is_available);
        assert_eq!(info.next_available_time, None);
        assert!(info.current_booking.is_none());
        assert!(info.upcoming_bookings.is_empty());
    }

    #[test]
    fn active_booking_blocks_until_its_end() {
        let bookings = vec![booking("b-1", 10, 2), booking("b-2", 14, 1)];
        let info = calculate_availability("c-1", at(11, 0), &bookings);
        assert!(!info.is_available);
        assert_eq!(info.next_available_time, Some(at(12, 0)));
        let current = info.current_booking.unwrap();
        assert_eq!(current.id, "b-1");
        assert_eq!(current.status, BookingStatus::Active);
        assert_eq!(info.upcoming_bookings.len(), 1);
        assert_eq!(info.upcoming_bookings[0].id, "b-2");
    }

    #[test]
    fn future_booking_sets_next_time() {
        let bookings = vec![booking("b-2", 14, 1), booking("b-1", 10, 2)];
        let info = calculate_availability("c-1", at(8, 0), &bookings);
        assert!(info.is_available);
        assert_eq!(info.next_available_time, Some(at(10, 0)));
        let ids: Vec<&str> = info.upcoming_bookings.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b-1", "b-2"]);
    }

    #[test]
    fn cancelled_and_other_chargers_are_ignored() {
        let mut cancelled = booking("b-1", 10, 2);
        cancelled.cancel();
        let mut other = booking("b-2", 10, 2);
        other.charger_id = "c-2".into();
        let info = calculate_availability("c-1", at(11, 0), &[cancelled, other]);
        assert!(info.is_available);
        assert_eq!(info.next_available_time, None);
    }

    #[test]
    fn overlap_is_reflexive_and_touching_is_not() {
        let b = booking("b-1", 10, 2);
        assert!(intervals_overlap(b.start_time, b.end_time, b.start_time, b.end_time));
        assert!(!intervals_overlap(at(10, 0), at(12, 0), at(12, 0), at(14, 0)));
    }

    #[test]
    fn back_to_back_bookings_do_not_conflict() {
        let existing = vec![booking("b-1", 10, 2)];
        assert!(!has_booking_conflict(
            "c-1",
            at(12, 0),
            at(14, 0),
            &existing,
            None,
            at(8, 0)
        ));
    }

    #[test]
    fn straddling_request_conflicts_with_both() {
        let existing = vec![booking("b-1", 10, 2), booking("b-2", 12, 2)];
        let conflicts =
            conflicting_bookings("c-1", at(11, 0), at(13, 0), &existing, None, at(8, 0));
        let ids: Vec<&str> = conflicts.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b-1", "b-2"]);
    }

    #[test]
    fn excluded_booking_is_skipped() {
        let existing = vec![booking("b-1", 10, 2)];
        assert!(!has_booking_conflict(
            "c-1",
            at(10, 0),
            at(12, 0),
            &existing,
            Some("b-1"),
            at(8, 0)
        ));
    }

    #[test]
    fn slots_skip_past_and_booked_hours() {
        let existing = vec![booking("b-1", 10, 2)];
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        let slots: Vec<_> = available_slots(
            "c-1",
            date,
            2,
            utc,
            SlotWindow::default(),
            at(8, 30),
            &existing,
        )
        .collect();

        assert_eq!(slots.first(), Some(&at(12, 0)));
        assert_eq!(slots.last(), Some(&at(22, 0)));
        assert_eq!(slots.len(), 11);
    }

    #[test]
    fn slots_iterator_restarts_from_clone() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        let slots = available_slots("c-1", date, 1, utc, SlotWindow::default(), at(0, 0), &[]);
        let first: Vec<_> = slots.clone().collect();
        let second: Vec<_> = slots.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 17);
    }

    #[test]
    fn slots_respect_local_offset() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let pacific = FixedOffset::west_opt(7 * 3600).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 3, 13, 0, 0, 0).unwrap();
        let mut slots = available_slots("c-1", date, 1, pacific, SlotWindow::default(), now, &[]);
        assert_eq!(slots.next(), Some(at(13, 0)));
    }

    #[test]
    fn distance_between_palo_alto_and_mountain_view() {
        let d = distance_miles(37.4419, -122.1430, 37.3861, -122.0839);
        assert!(d > 4.5 && d < 5.5, "got {}", d);
        assert!(distance_miles(37.0, -122.0, 37.0, -122.0).abs() < 1e-9);
    }

    #[test]
    fn next_available_labels() {
        let now = at(10, 0);
        assert_eq!(format_next_available(None, now), "Available now");
        assert_eq!(format_next_available(Some(at(10, 1)), now), "Available in 1 minute");
        assert_eq!(format_next_available(Some(at(10, 45)), now), "Available in 45 minutes");
        assert_eq!(format_next_available(Some(at(12, 0)), now), "Available in 2 hours");
        assert_eq!(format_next_available(Some(at(11, 30)), now), "Available in 1h 30m");
        assert_eq!(
            format_next_available(Some(now + Duration::days(3)), now),
            "Available in 3 days"
        );
    }
}
