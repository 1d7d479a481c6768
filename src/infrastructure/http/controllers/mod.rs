pub mod assistant;
pub mod availability;
pub mod bookings;
pub mod rooms;
pub mod users;
