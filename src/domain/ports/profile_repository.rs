use crate::domain::entities::{Profile, UserRole};
use crate::domain::errors::DomainResult;
use async_trait::async_trait;

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_profile(&self, id: &str) -> DomainResult<Option<Profile>>;
    async fn list_profiles(&self) -> DomainResult<Vec<Profile>>;
    async fn upsert_profile(&self, profile: &Profile) -> DomainResult<()>;
    async fn update_role(&self, id: &str, role: UserRole) -> DomainResult<()>;
}
