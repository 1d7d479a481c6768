use crate::domain::entities::{Room, RoomFilter};
use crate::domain::errors::DomainResult;
use async_trait::async_trait;

#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn create_room(&self, room: &Room) -> DomainResult<()>;
    async fn update_room(&self, room: &Room) -> DomainResult<()>;
    async fn get_room(&self, id: &str) -> DomainResult<Option<Room>>;
    /// Exact, case-sensitive name match.
    async fn get_room_by_name(&self, name: &str) -> DomainResult<Option<Room>>;
    /// Rooms matching `filter`, ordered by name.
    async fn list_rooms(&self, filter: &RoomFilter) -> DomainResult<Vec<Room>>;
}
