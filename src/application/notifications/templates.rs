//! HTML email templates

use chrono::{DateTime, FixedOffset, Utc};

use crate::domain::{Booking, Charger};

const STYLE: &str = r#"
      body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }
      .container { max-width: 600px; margin: 0 auto; padding: 20px; }
      .header { background: #00ff88; color: #000; padding: 20px; text-align: center; }
      .content { padding: 20px; background: #f9f9f9; }
      .button { display: inline-block; padding: 12px 24px; background: #00ff88; color: #000; text-decoration: none; border-radius: 5px; font-weight: bold; }
      .details { background: white; padding: 15px; border-radius: 5px; margin: 15px 0; }
      .earnings { background: #00ff88; color: #000; padding: 15px; border-radius: 5px; margin: 15px 0; font-weight: bold; }
"#;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

/// Values shared by every booking template, already formatted.
pub struct BookingContext {
    pub booking_id: String,
    pub guest_name: String,
    pub charger_address: String,
    pub start: String,
    pub end: String,
    pub booked_at: String,
    pub total_cost: f64,
    pub host_earnings: f64,
    pub base_url: String,
}

impl BookingContext {
    pub fn new(booking: &Booking, charger: &Charger, base_url: &str, offset: FixedOffset) -> Self {
        Self {
            booking_id: escape(&booking.id),
            guest_name: escape(&booking.user_name),
            charger_address: escape(&format!("{}, {}", charger.address, charger.city)),
            start: local_time(booking.start_time, offset),
            end: local_time(booking.end_time, offset),
            booked_at: local_time(booking.created_at, offset),
            total_cost: booking.total_cost,
            host_earnings: booking.host_earnings,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

fn local_time(t: DateTime<Utc>, offset: FixedOffset) -> String {
    t.with_timezone(&offset).format("%b %-d, %Y %-I:%M %p").to_string()
}

/// Minimal HTML escaping for user-supplied text.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn layout(heading: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <style>{style}</style>
  </head>
  <body>
    <div class="container">
      <div class="header">
        <h1>{heading}</h1>
      </div>
      <div class="content">
{body}
      </div>
    </div>
  </body>
</html>"#,
        style = STYLE,
        heading = heading,
        body = body
    )
}

pub fn booking_confirmation_guest(ctx: &BookingContext) -> RenderedEmail {
    let body = format!(
        r#"        <p>Your charging session has been confirmed!</p>
        <div class="details">
          <p><strong>Location:</strong> {address}</p>
          <p><strong>Start Time:</strong> {start}</p>
          <p><strong>End Time:</strong> {end}</p>
          <p><strong>Total Cost:</strong> ${total:.2}</p>
          <p><strong>Booking ID:</strong> {id}</p>
        </div>
        <p>We'll send you a reminder 24 hours before your booking.</p>
        <a href="{base}/booking/{id}/confirm" class="button">View Booking Details</a>"#,
        address = ctx.charger_address,
        start = ctx.start,
        end = ctx.end,
        total = ctx.total_cost,
        id = ctx.booking_id,
        base = ctx.base_url,
    );
    RenderedEmail {
        subject: "Booking Confirmed - PlugSpot".to_string(),
        html: layout("⚡ Booking Confirmed!", &body),
    }
}

pub fn booking_confirmation_host(ctx: &BookingContext) -> RenderedEmail {
    let body = format!(
        r#"        <p>Great news! Someone just booked your charger.</p>
        <div class="details">
          <p><strong>Guest:</strong> {guest}</p>
          <p><strong>Location:</strong> {address}</p>
          <p><strong>Start Time:</strong> {start}</p>
          <p><strong>End Time:</strong> {end}</p>
          <p><strong>Booking ID:</strong> {id}</p>
        </div>
        <div class="earnings">
          <p>You'll earn: ${earnings:.2}</p>
          <p>(After platform commission)</p>
        </div>
        <a href="{base}/dashboard" class="button">View Dashboard</a>"#,
        guest = ctx.guest_name,
        address = ctx.charger_address,
        start = ctx.start,
        end = ctx.end,
        id = ctx.booking_id,
        earnings = ctx.host_earnings,
        base = ctx.base_url,
    );
    RenderedEmail {
        subject: "New Booking - PlugSpot".to_string(),
        html: layout("💰 New Booking!", &body),
    }
}

pub fn booking_reminder(ctx: &BookingContext) -> RenderedEmail {
    let body = format!(
        r#"        <p>This is a reminder that you have an upcoming charging session.</p>
        <div class="details">
          <p><strong>Location:</strong> {address}</p>
          <p><strong>Start Time:</strong> {start}</p>
        </div>
        <a href="{base}/booking/{id}/confirm" class="button">View Booking</a>"#,
        address = ctx.charger_address,
        start = ctx.start,
        id = ctx.booking_id,
        base = ctx.base_url,
    );
    RenderedEmail {
        subject: "Reminder: Your Charging Session is Coming Up - PlugSpot".to_string(),
        html: layout("⏰ Upcoming Booking", &body),
    }
}

pub fn payment_receipt(ctx: &BookingContext) -> RenderedEmail {
    let body = format!(
        r#"        <p>Thank you for your payment!</p>
        <div class="details">
          <p><strong>Booking ID:</strong> {id}</p>
          <p><strong>Amount:</strong> ${total:.2}</p>
          <p><strong>Date:</strong> {date}</p>
        </div>
        <p>This email serves as your receipt.</p>"#,
        id = ctx.booking_id,
        total = ctx.total_cost,
        date = ctx.booked_at,
    );
    RenderedEmail {
        subject: "Payment Receipt - PlugSpot".to_string(),
        html: layout("🧾 Payment Receipt", &body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> BookingContext {
        BookingContext {
            booking_id: "b-1".into(),
            guest_name: escape("<script>Alex</script>"),
            charger_address: "123 Oak Street, Palo Alto".into(),
            start: "Mar 14, 2026 5:00 PM".into(),
            end: "Mar 14, 2026 7:00 PM".into(),
            booked_at: "Mar 13, 2026 9:00 AM".into(),
            total_cost: 4.18,
            host_earnings: 3.28,
            base_url: "https://plugspot.app".into(),
        }
    }

    #[test]
    fn host_email_shows_earnings() {
        let email = booking_confirmation_host(&ctx());
        assert!(email.html.contains("You'll earn: $3.28"));
        assert!(email.html.contains("&lt;script&gt;Alex&lt;/script&gt;"));
        assert!(!email.html.contains("<script>"));
    }

    #[test]
    fn receipt_shows_total() {
        let email = payment_receipt(&ctx());
        assert!(email.html.contains("$4.18"));
        assert_eq!(email.subject, "Payment Receipt - PlugSpot");
    }

    #[test]
    fn local_time_uses_offset() {
        use chrono::TimeZone;
        let t = Utc.with_ymd_and_hms(2026, 3, 14, 17, 0, 0).unwrap();
        let pst = FixedOffset::west_opt(8 * 3600).unwrap();
        assert_eq!(local_time(t, pst), "Mar 14, 2026 9:00 AM");
    }
}
