//! Database entities module

pub mod booking;
pub mod charger;
pub mod favorite;
pub mod host_account;
pub mod review;
pub mod user;

pub use booking::Entity as Booking;
pub use charger::Entity as Charger;
pub use favorite::Entity as Favorite;
pub use host_account::Entity as HostAccount;
pub use review::Entity as Review;
pub use user::Entity as User;
