use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid format for {field}: \"{value}\"")]
    InvalidFormat { field: String, value: String },

    #[error("End time {end} must be after start time {start}")]
    InvalidRange { start: String, end: String },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Room \"{0}\" not found.")]
    RoomNotFound(String),

    #[error("{attendees} attendees exceed the room capacity of {capacity}")]
    CapacityExceeded { attendees: i64, capacity: i64 },

    #[error("{}", describe_conflict(.title, .owner.as_deref(), .start, .end))]
    SlotConflict {
        title: String,
        owner: Option<String>,
        start: String,
        end: String,
    },

    #[error("Data store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Rate limit exceeded. Please try again later.")]
    BackendRateLimited,

    #[error("AI credits exhausted. Please add credits.")]
    BackendQuotaExhausted,

    #[error("Malformed tool call from assistant backend: {0}")]
    BackendProtocolError(String),

    #[error("Assistant backend error: {0}")]
    BackendUnavailable(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

fn describe_conflict(title: &str, owner: Option<&str>, start: &str, end: &str) -> String {
    match owner {
        Some(owner) => format!(
            "Room is already booked from {} to {} for \"{}\" by {}",
            start, end, title, owner
        ),
        None => format!(
            "Room is already booked from {} to {} for \"{}\"",
            start, end, title
        ),
    }
}

impl DomainError {
    /// Stable identifier used in tool payloads, metrics labels and logs.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::InvalidFormat { .. } => "invalid_format",
            DomainError::InvalidRange { .. } => "invalid_range",
            DomainError::MissingField(_) => "missing_field",
            DomainError::RoomNotFound(_) => "room_not_found",
            DomainError::CapacityExceeded { .. } => "capacity_exceeded",
            DomainError::SlotConflict { .. } => "slot_conflict",
            DomainError::StoreUnavailable(_) => "store_unavailable",
            DomainError::BackendRateLimited => "backend_rate_limited",
            DomainError::BackendQuotaExhausted => "backend_quota_exhausted",
            DomainError::BackendProtocolError(_) => "backend_protocol_error",
            DomainError::BackendUnavailable(_) => "backend_unavailable",
            DomainError::NotFound(_) => "not_found",
            DomainError::ValidationError(_) => "validation_error",
            DomainError::Conflict(_) => "conflict",
            DomainError::Forbidden(_) => "forbidden",
        }
    }

    /// Booking validation failures, as opposed to infrastructure failures.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidFormat { .. }
                | DomainError::InvalidRange { .. }
                | DomainError::MissingField(_)
                | DomainError::RoomNotFound(_)
                | DomainError::CapacityExceeded { .. }
                | DomainError::SlotConflict { .. }
        )
    }

    /// Re-label an `InvalidFormat` error with the request field it came from.
    pub fn for_field(self, field: &str) -> Self {
        match self {
            DomainError::InvalidFormat { value, .. } => DomainError::InvalidFormat {
                field: field.to_string(),
                value,
            },
            other => other,
        }
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DomainError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                let message = db_err.message();
                if message.contains("UNIQUE") || message.contains("unique") {
                    DomainError::Conflict(message.to_string())
                } else {
                    DomainError::StoreUnavailable(format!("Database error: {}", message))
                }
            }
            other => DomainError::StoreUnavailable(other.to_string()),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_not_found_message_matches_tool_contract() {
        let err = DomainError::RoomNotFound("Atlantis".to_string());
        assert_eq!(err.to_string(), "Room \"Atlantis\" not found.");
    }

    #[test]
    fn slot_conflict_names_booking_and_owner() {
        let err = DomainError::SlotConflict {
            title: "Sync".to_string(),
            owner: Some("Ada Lovelace".to_string()),
            start: "09:00".to_string(),
            end: "10:00".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("\"Sync\""));
        assert!(message.contains("Ada Lovelace"));

        let anonymous = DomainError::SlotConflict {
            title: "Sync".to_string(),
            owner: None,
            start: "09:00".to_string(),
            end: "10:00".to_string(),
        };
        assert!(!anonymous.to_string().contains(" by "));
    }

    #[test]
    fn for_field_only_relabels_format_errors() {
        let err = DomainError::InvalidFormat {
            field: "time".to_string(),
            value: "25:00".to_string(),
        }
        .for_field("start_time");
        assert_eq!(
            err,
            DomainError::InvalidFormat {
                field: "start_time".to_string(),
                value: "25:00".to_string()
            }
        );

        let untouched = DomainError::MissingField("title".to_string()).for_field("start_time");
        assert_eq!(untouched, DomainError::MissingField("title".to_string()));
    }

    #[test]
    fn validation_classification() {
        assert!(DomainError::MissingField("room".into()).is_validation());
        assert!(!DomainError::StoreUnavailable("down".into()).is_validation());
        assert!(!DomainError::BackendRateLimited.is_validation());
    }
}
