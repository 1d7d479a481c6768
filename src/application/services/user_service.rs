use crate::domain::entities::{Profile, UserRole};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::profile_repository::ProfileRepository;
use std::sync::Arc;

#[derive(Clone)]
pub struct UserService {
    profile_repo: Arc<dyn ProfileRepository>,
}

impl UserService {
    pub fn new(profile_repo: Arc<dyn ProfileRepository>) -> Self {
        Self { profile_repo }
    }

    pub async fn get_user(&self, id: &str) -> DomainResult<Option<Profile>> {
        self.profile_repo.get_profile(id).await
    }

    pub async fn list_users(&self) -> DomainResult<Vec<Profile>> {
        self.profile_repo.list_profiles().await
    }

    /// Create or refresh a profile, keeping the stored role if one exists.
    pub async fn ensure_profile(&self, profile: Profile) -> DomainResult<Profile> {
        let profile = match self.profile_repo.get_profile(&profile.id).await? {
            Some(existing) => Profile {
                role: existing.role,
                created_at: existing.created_at,
                ..profile
            },
            None => profile,
        };
        self.profile_repo.upsert_profile(&profile).await?;
        Ok(profile)
    }

    pub async fn update_role(
        &self,
        actor: &Profile,
        target_id: &str,
        role: UserRole,
    ) -> DomainResult<Profile> {
        if !actor.is_superadmin() {
            return Err(DomainError::Forbidden(
                "Only superadmins can change roles".to_string(),
            ));
        }
        if actor.id == target_id {
            return Err(DomainError::Forbidden(
                "You cannot change your own role.".to_string(),
            ));
        }

        let mut target = self
            .profile_repo
            .get_profile(target_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("User {} not found", target_id)))?;

        self.profile_repo.update_role(target_id, role).await?;
        tracing::info!(
            "Role of {} changed from {} to {} by {}",
            target_id,
            target.role,
            role,
            actor.id
        );

        target.role = role;
        Ok(target)
    }
}
