use crate::domain::entities::{Room, RoomFilter};
use crate::domain::errors::DomainResult;
use crate::domain::ports::room_repository::RoomRepository;
use crate::infrastructure::persistence::{corrupt, Database};
use async_trait::async_trait;
use sqlx::{any::AnyRow, Row};

const ROOM_COLUMNS: &str = "id, name, description, capacity, location, amenities, is_active, created_at, updated_at";

fn row_to_room(row: &AnyRow) -> DomainResult<Room> {
    let amenities: String = row.try_get("amenities")?;
    let amenities: Vec<String> =
        serde_json::from_str(&amenities).map_err(|e| corrupt("amenities", e))?;
    let is_active: i32 = row.try_get("is_active")?;

    Ok(Room {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row
            .try_get::<Option<String>, _>("description")
            .ok()
            .flatten(),
        capacity: row.try_get("capacity")?,
        location: row
            .try_get::<Option<String>, _>("location")
            .ok()
            .flatten(),
        amenities,
        is_active: is_active != 0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn amenities_json(room: &Room) -> DomainResult<String> {
    serde_json::to_string(&room.amenities).map_err(|e| corrupt("amenities", e))
}

#[async_trait]
impl RoomRepository for Database {
    async fn create_room(&self, room: &Room) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO rooms (id, name, description, capacity, location, amenities, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&room.id)
        .bind(&room.name)
        .bind(&room.description)
        .bind(room.capacity)
        .bind(&room.location)
        .bind(amenities_json(room)?)
        .bind(if room.is_active { 1i32 } else { 0i32 })
        .bind(&room.created_at)
        .bind(&room.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_room(&self, room: &Room) -> DomainResult<()> {
        sqlx::query(
            "UPDATE rooms
             SET name = ?, description = ?, capacity = ?, location = ?, amenities = ?, is_active = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&room.name)
        .bind(&room.description)
        .bind(room.capacity)
        .bind(&room.location)
        .bind(amenities_json(room)?)
        .bind(if room.is_active { 1i32 } else { 0i32 })
        .bind(&room.updated_at)
        .bind(&room.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_room(&self, id: &str) -> DomainResult<Option<Room>> {
        let row = sqlx::query(&format!("SELECT {} FROM rooms WHERE id = ?", ROOM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_room).transpose()
    }

    async fn get_room_by_name(&self, name: &str) -> DomainResult<Option<Room>> {
        let row = sqlx::query(&format!("SELECT {} FROM rooms WHERE name = ?", ROOM_COLUMNS))
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_room).transpose()
    }

    async fn list_rooms(&self, filter: &RoomFilter) -> DomainResult<Vec<Room>> {
        let mut builder: sqlx::QueryBuilder<sqlx::Any> = sqlx::QueryBuilder::new(format!(
            "SELECT {} FROM rooms WHERE 1 = 1",
            ROOM_COLUMNS
        ));
        if filter.active_only {
            builder.push(" AND is_active = 1");
        }
        if let Some(min_capacity) = filter.min_capacity {
            builder.push(" AND capacity >= ");
            builder.push_bind(min_capacity);
        }
        builder.push(" ORDER BY name");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_room).collect()
    }
}
