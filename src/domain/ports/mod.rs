pub mod booking_repository;
pub mod completion_backend;
pub mod profile_repository;
pub mod room_lock;
pub mod room_repository;
