use crate::domain::entities::{Profile, UserRole};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::profile_repository::ProfileRepository;
use crate::infrastructure::persistence::{corrupt, Database};
use async_trait::async_trait;
use sqlx::{any::AnyRow, Row};

fn row_to_profile(row: &AnyRow) -> DomainResult<Profile> {
    let role: String = row.try_get("role")?;
    Ok(Profile {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        first_name: row
            .try_get::<Option<String>, _>("first_name")
            .ok()
            .flatten(),
        last_name: row
            .try_get::<Option<String>, _>("last_name")
            .ok()
            .flatten(),
        role: role.parse::<UserRole>().map_err(|e| corrupt("role", e))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ProfileRepository for Database {
    async fn get_profile(&self, id: &str) -> DomainResult<Option<Profile>> {
        let row = sqlx::query(
            "SELECT id, email, first_name, last_name, role, created_at, updated_at
             FROM profiles
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_profile).transpose()
    }

    async fn list_profiles(&self) -> DomainResult<Vec<Profile>> {
        let rows = sqlx::query(
            "SELECT id, email, first_name, last_name, role, created_at, updated_at
             FROM profiles
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_profile).collect()
    }

    async fn upsert_profile(&self, profile: &Profile) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO profiles (id, email, first_name, last_name, role, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                email = excluded.email,
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                role = excluded.role,
                updated_at = excluded.updated_at",
        )
        .bind(&profile.id)
        .bind(&profile.email)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(profile.role.to_string())
        .bind(&profile.created_at)
        .bind(&profile.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_role(&self, id: &str, role: UserRole) -> DomainResult<()> {
        let result = sqlx::query("UPDATE profiles SET role = ?, updated_at = ? WHERE id = ?")
            .bind(role.to_string())
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }
}
