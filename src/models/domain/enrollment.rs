use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct Enrollment {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub progress: i32, // percent, 0..=100
    pub completed_lessons: Vec<String>,
    pub completed: bool,
    pub certificate_status: CertificateStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_url: Option<String>,
    pub enrolled_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_requested_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_decided_at: Option<DateTime<Utc>>,
    /// This student's 1..=5 rating of the course, once given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
}

/// none → requested → approved | rejected; rejected may be requested again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "snake_case")]
pub enum CertificateStatus {
    #[default]
    None,
    Requested,
    Approved,
    Rejected,
}

impl CertificateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateStatus::None => "none",
            CertificateStatus::Requested => "requested",
            CertificateStatus::Approved => "approved",
            CertificateStatus::Rejected => "rejected",
        }
    }
}

impl Enrollment {
    pub fn new(user_id: &str, course_id: &str) -> Self {
        Enrollment {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            course_id: course_id.to_string(),
            progress: 0,
            completed_lessons: Vec::new(),
            completed: false,
            certificate_status: CertificateStatus::None,
            certificate_note: None,
            certificate_url: None,
            enrolled_at: Utc::now(),
            completed_at: None,
            certificate_requested_at: None,
            certificate_decided_at: None,
            rating: None,
        }
    }

    /// Sets progress (clamped to 0..=100) and flips completion on reaching 100.
    pub fn apply_progress(&mut self, progress: i32) {
        self.progress = progress.clamp(0, 100);
        if self.progress == 100 && !self.completed {
            self.completed = true;
            self.completed_at = Some(Utc::now());
        }
    }

    pub fn is_eligible_for_certificate(&self) -> bool {
        self.completed || self.progress >= 100
    }

    /// none | rejected → requested. Requires a finished course.
    pub fn request_certificate(&mut self) -> AppResult<()> {
        match self.certificate_status {
            CertificateStatus::Requested => {
                return Err(AppError::BadRequest(
                    "A certificate request is already pending".to_string(),
                ))
            }
            CertificateStatus::Approved => {
                return Err(AppError::BadRequest(
                    "The certificate has already been issued".to_string(),
                ))
            }
            CertificateStatus::None | CertificateStatus::Rejected => {}
        }
        if !self.is_eligible_for_certificate() {
            return Err(AppError::BadRequest(
                "Complete the course before requesting a certificate".to_string(),
            ));
        }

        self.certificate_status = CertificateStatus::Requested;
        self.certificate_note = None;
        self.certificate_requested_at = Some(Utc::now());
        Ok(())
    }

    /// requested → approved.
    pub fn approve_certificate(&mut self, certificate_url: Option<String>) -> AppResult<()> {
        self.ensure_requested()?;
        self.certificate_status = CertificateStatus::Approved;
        self.certificate_url = certificate_url;
        self.certificate_decided_at = Some(Utc::now());
        Ok(())
    }

    /// requested → rejected. The student may request again later.
    pub fn reject_certificate(&mut self, note: Option<String>) -> AppResult<()> {
        self.ensure_requested()?;
        self.certificate_status = CertificateStatus::Rejected;
        self.certificate_note = note;
        self.certificate_decided_at = Some(Utc::now());
        Ok(())
    }

    fn ensure_requested(&self) -> AppResult<()> {
        if self.certificate_status != CertificateStatus::Requested {
            return Err(AppError::BadRequest(format!(
                "No pending certificate request (status is {})",
                self.certificate_status.as_str()
            )));
        }
        Ok(())
    }
}

/// Percentage of `lesson_count` covered by `completed`, rounded and capped at 100.
pub fn progress_percentage(completed: usize, lesson_count: i64) -> i32 {
    if lesson_count <= 0 {
        return 0;
    }
    let percent = (completed as f64 / lesson_count as f64 * 100.0).round() as i32;
    percent.min(100)
}
