pub mod bikes;
pub mod bookings;
pub mod health;
