use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Superadmin,
    #[default]
    Organizer,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Superadmin => write!(f, "superadmin"),
            UserRole::Organizer => write!(f, "organizer"),
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "superadmin" => Ok(UserRole::Superadmin),
            "organizer" => Ok(UserRole::Organizer),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// A user known to the booking system. `id` is the identity provider's user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
    pub created_at: String,
    pub updated_at: String,
}

impl Profile {
    pub fn new(
        id: String,
        email: String,
        first_name: Option<String>,
        last_name: Option<String>,
        role: UserRole,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id,
            email,
            first_name,
            last_name,
            role,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn is_superadmin(&self) -> bool {
        self.role == UserRole::Superadmin
    }

    pub fn display_name(&self) -> String {
        display_name(
            self.first_name.as_deref(),
            self.last_name.as_deref(),
            Some(&self.email),
        )
        .unwrap_or_else(|| self.id.clone())
    }
}

/// "First Last" when any name part is present, otherwise the email.
pub fn display_name(
    first_name: Option<&str>,
    last_name: Option<&str>,
    email: Option<&str>,
) -> Option<String> {
    let full = format!("{} {}", first_name.unwrap_or(""), last_name.unwrap_or(""))
        .trim()
        .to_string();
    if !full.is_empty() {
        return Some(full);
    }
    email.filter(|e| !e.is_empty()).map(str::to_string)
}

/// DTO for changing a user's role
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}
