pub mod bookings;
pub mod notifications;
pub mod packages;
pub mod payments;
pub mod properties;
pub mod users;
pub mod viewings;
