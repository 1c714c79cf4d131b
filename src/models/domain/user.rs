use async_graphql::Enum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String, // stored lower-cased, unique
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Student,
    Instructor,
    Admin,
}

/// Accounts are never hard-deleted; suspension is the terminal soft state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Pending,
    Approved,
    Suspended,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Instructor => "instructor",
            UserRole::Admin => "admin",
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Instructor | UserRole::Admin)
    }
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Pending => "pending",
            UserStatus::Approved => "approved",
            UserStatus::Suspended => "suspended",
        }
    }
}

impl User {
    pub fn new(name: &str, email: &str, password_hash: &str, role: UserRole) -> Self {
        let now = Utc::now();
        User {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            email: normalize_email(email),
            password_hash: password_hash.to_string(),
            role,
            status: UserStatus::Pending,
            phone: None,
            avatar_url: None,
            created_at: Some(now),
            modified_at: Some(now),
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status == UserStatus::Approved
    }

    pub fn touch(&mut self) {
        self.modified_at = Some(Utc::now());
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
impl User {
    pub fn test_user(name: &str, role: UserRole, status: UserStatus) -> Self {
        let mut user = User::new(
            name,
            &format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            "$argon2id$test",
            role,
        );
        user.status = status;
        user
    }
}
