pub mod assistant;
pub mod availability_service;
pub mod booking_service;
pub mod room_service;
pub mod user_service;

pub use assistant::BookingAssistant;
pub use availability_service::AvailabilityService;
pub use booking_service::{BookingPolicy, BookingService, CapacityPolicy};
pub use room_service::RoomService;
pub use user_service::UserService;
