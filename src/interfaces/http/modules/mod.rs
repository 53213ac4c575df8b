pub mod auth;
pub mod bookings;
pub mod chargers;
pub mod dashboards;
pub mod email;
pub mod health;
pub mod metrics;
pub mod payments;
pub mod request_id;
pub mod reviews;
pub mod stripe_connect;
pub mod webhooks;
