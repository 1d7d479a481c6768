use crate::application::services::*;
use crate::config::Config;
use crate::domain::entities::{Profile, UserRole};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::booking_repository::BookingRepository;
use crate::domain::ports::completion_backend::CompletionBackend;
use crate::domain::ports::profile_repository::ProfileRepository;
use crate::domain::ports::room_lock::RoomLock;
use crate::domain::ports::room_repository::RoomRepository;
use crate::infrastructure::http::middleware::AppState;
use crate::infrastructure::persistence::distributed_lock::DatabaseRoomLock;
use crate::infrastructure::persistence::Database;
use crate::infrastructure::providers::{
    ChatCompletionsBackend, ChatCompletionsConfig, UnconfiguredBackend,
};
use std::sync::Arc;

pub async fn build_app_state(
    db: Database,
    config: &Config,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let room_repo = Arc::new(db.clone()) as Arc<dyn RoomRepository>;
    let booking_repo = Arc::new(db.clone()) as Arc<dyn BookingRepository>;
    let profile_repo = Arc::new(db.clone()) as Arc<dyn ProfileRepository>;
    let room_lock = Arc::new(DatabaseRoomLock::new(db.clone())) as Arc<dyn RoomLock>;

    let backend: Arc<dyn CompletionBackend> = match &config.assistant.api_key {
        Some(api_key) => {
            tracing::info!(
                "Assistant backend: {} (model {})",
                config.assistant.api_url,
                config.assistant.model
            );
            Arc::new(ChatCompletionsBackend::new(ChatCompletionsConfig {
                api_url: config.assistant.api_url.clone(),
                api_key: api_key.clone(),
                model: config.assistant.model.clone(),
                timeout: config.assistant.timeout,
            })?)
        }
        None => {
            tracing::warn!("ASSISTANT_API_KEY not set, assistant requests will fail");
            Arc::new(UnconfiguredBackend)
        }
    };

    Ok(assemble_state(
        room_repo,
        booking_repo,
        profile_repo,
        room_lock,
        backend,
        config,
    ))
}

/// Wire the services over whichever adapters the caller supplies.
pub fn assemble_state(
    room_repo: Arc<dyn RoomRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
    room_lock: Arc<dyn RoomLock>,
    backend: Arc<dyn CompletionBackend>,
    config: &Config,
) -> AppState {
    let policy = BookingPolicy {
        capacity: config.capacity_policy,
        lock_ttl_seconds: config.room_lock_ttl_secs,
        ..BookingPolicy::default()
    };

    let availability_service = AvailabilityService::new(room_repo.clone(), booking_repo.clone());
    let booking_service = BookingService::new(room_repo.clone(), booking_repo, room_lock, policy);
    let room_service = RoomService::new(room_repo.clone());
    let user_service = UserService::new(profile_repo);
    let assistant = BookingAssistant::new(
        backend,
        availability_service.clone(),
        booking_service.clone(),
        room_repo,
        config.assistant.max_iterations,
    );
    tracing::info!(
        "Services initialized (capacity policy {:?}, lock ttl {}s)",
        config.capacity_policy,
        config.room_lock_ttl_secs
    );

    AppState {
        availability_service,
        booking_service,
        room_service,
        user_service,
        assistant,
    }
}

/// Make sure the configured bootstrap account exists with the superadmin role.
pub async fn initialize_admin(db: &Database, config: &Config) -> DomainResult<()> {
    let (user_id, email) = match (&config.admin_user_id, &config.admin_email) {
        (Some(id), Some(email)) => (id, email),
        (None, None) => {
            tracing::debug!("No bootstrap admin configured");
            return Ok(());
        }
        _ => {
            return Err(DomainError::ValidationError(
                "ADMIN_USER_ID and ADMIN_EMAIL must be set together".to_string(),
            ))
        }
    };

    if let Some(existing) = db.get_profile(user_id).await? {
        if existing.is_superadmin() {
            tracing::info!("Admin user already exists: {}", existing.email);
            return Ok(());
        }
        tracing::info!("Promoting {} to superadmin", existing.email);
        db.update_role(user_id, UserRole::Superadmin).await?;
        return Ok(());
    }

    tracing::info!("Creating admin user: {}", email);
    let profile = Profile::new(
        user_id.clone(),
        email.trim().to_lowercase(),
        None,
        None,
        UserRole::Superadmin,
    );
    db.upsert_profile(&profile).await?;
    Ok(())
}
