use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContactSubmission {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub status: ContactStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    #[default]
    New,
    Read,
    Replied,
    Archived,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResumeSubmission {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_program: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_country: Option<String>,
    pub resume_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    pub status: ResumeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeStatus {
    #[default]
    Pending,
    Reviewed,
    Shortlisted,
    Rejected,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::New => "new",
            ContactStatus::Read => "read",
            ContactStatus::Replied => "replied",
            ContactStatus::Archived => "archived",
        }
    }
}

impl ResumeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResumeStatus::Pending => "pending",
            ResumeStatus::Reviewed => "reviewed",
            ResumeStatus::Shortlisted => "shortlisted",
            ResumeStatus::Rejected => "rejected",
        }
    }
}

impl ContactSubmission {
    pub fn new(name: &str, email: &str, subject: &str, message: &str) -> Self {
        let now = Utc::now();
        ContactSubmission {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            phone: None,
            subject: subject.trim().to_string(),
            message: message.to_string(),
            status: ContactStatus::New,
            admin_notes: None,
            created_at: Some(now),
            modified_at: Some(now),
        }
    }
}

impl ResumeSubmission {
    pub fn new(name: &str, email: &str, resume_url: &str) -> Self {
        let now = Utc::now();
        ResumeSubmission {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            phone: None,
            desired_program: None,
            destination_country: None,
            resume_url: resume_url.to_string(),
            cover_letter: None,
            status: ResumeStatus::Pending,
            admin_notes: None,
            created_at: Some(now),
            modified_at: Some(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_submission_starts_new() {
        let submission = ContactSubmission::new("Sam", " Sam@Mail.com ", "Visa", "Help");
        assert_eq!(submission.status, ContactStatus::New);
        assert_eq!(submission.email, "sam@mail.com");
    }

    #[test]
    fn resume_status_parses_snake_case() {
        let status: ResumeStatus = serde_json::from_str("\"shortlisted\"").unwrap();
        assert_eq!(status, ResumeStatus::Shortlisted);
        assert_eq!(status.as_str(), "shortlisted");
    }
}
