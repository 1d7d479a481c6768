use crate::domain::entities::{Booking, NewBooking};
use crate::domain::errors::DomainResult;
use async_trait::async_trait;
use chrono::NaiveDateTime;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Bookings whose stored interval touches `[window_start, window_end]`
    /// (`start_time <= window_end AND end_time >= window_start`), optionally
    /// restricted to one room, ordered by start. Callers refine the result
    /// with half-open overlap.
    async fn list_bookings_in_window(
        &self,
        room_id: Option<&str>,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
    ) -> DomainResult<Vec<Booking>>;

    /// Insert a booking. Implementations must reject an insert that overlaps an
    /// existing booking of the same room with `DomainError::SlotConflict`.
    async fn insert_booking(&self, booking: &NewBooking) -> DomainResult<Booking>;

    async fn get_booking(&self, id: &str) -> DomainResult<Option<Booking>>;
    async fn list_bookings_for_owner(&self, user_id: &str) -> DomainResult<Vec<Booking>>;
    async fn delete_booking(&self, id: &str) -> DomainResult<()>;
}
