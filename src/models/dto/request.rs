use async_graphql::{Enum, InputObject};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use validator::Validate;

use crate::models::domain::{
    ContactStatus, CourseType, LessonType, ResumeStatus, UserRole, UserStatus,
};

pub static SLUG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("SLUG_REGEX is a valid regex pattern")
});

pub static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?[0-9][0-9 ()\-]{5,19}$").expect("PHONE_REGEX is a valid regex pattern")
});

// ---------------------------------------------------------------------------
// Auth & users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    pub phone: Option<String>,

    /// Only student or instructor may be self-selected.
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    pub phone: Option<String>,

    #[validate(url)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RepairRegistrationRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserListParams {
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    #[validate(length(max = 100))]
    pub search: Option<String>,
    #[validate(range(min = 0))]
    pub offset: Option<i64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Courses & lessons
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Derived from the title when omitted.
    #[validate(regex(path = *SLUG_REGEX, message = "Slug must be lower-case words separated by dashes"))]
    pub slug: Option<String>,

    #[validate(length(max = 20000))]
    #[serde(default)]
    pub description: String,

    pub course_type: CourseType,

    #[validate(range(min = 0.0))]
    pub price: Option<f64>,

    #[validate(range(min = 0.0))]
    pub discount_price: Option<f64>,

    #[validate(length(max = 100))]
    pub category: Option<String>,

    #[validate(length(max = 50))]
    pub level: Option<String>,

    #[validate(url)]
    pub thumbnail_url: Option<String>,

    /// Admins may create a course on behalf of an instructor.
    pub instructor_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(regex(path = *SLUG_REGEX, message = "Slug must be lower-case words separated by dashes"))]
    pub slug: Option<String>,

    #[validate(length(max = 20000))]
    pub description: Option<String>,

    pub course_type: Option<CourseType>,

    #[validate(range(min = 0.0))]
    pub price: Option<f64>,

    #[validate(range(min = 0.0))]
    pub discount_price: Option<f64>,

    #[validate(length(max = 100))]
    pub category: Option<String>,

    #[validate(length(max = 50))]
    pub level: Option<String>,

    #[validate(url)]
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishRequest {
    pub published: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RateCourseRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Enum)]
#[serde(rename_all = "snake_case")]
pub enum CourseSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Rating,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, InputObject)]
pub struct CourseListParams {
    pub published: Option<bool>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    pub instructor_id: Option<String>,
    #[validate(length(max = 100))]
    pub search: Option<String>,
    #[validate(range(min = 0.0))]
    pub min_price: Option<f64>,
    #[validate(range(min = 0.0))]
    pub max_price: Option<f64>,
    pub sort: Option<CourseSort>,
    #[validate(range(min = 0))]
    pub offset: Option<i64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLessonRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    pub content: Option<String>,

    #[serde(default)]
    pub lesson_type: LessonType,

    #[validate(url)]
    pub media_url: Option<String>,

    #[validate(range(min = 0, max = 1440))]
    pub duration_minutes: Option<i32>,

    pub parent_id: Option<String>,

    #[validate(range(min = 1))]
    pub order_number: Option<i32>,

    #[serde(default)]
    pub is_preview: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateLessonRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    pub content: Option<String>,

    pub lesson_type: Option<LessonType>,

    #[validate(url)]
    pub media_url: Option<String>,

    #[validate(range(min = 0, max = 1440))]
    pub duration_minutes: Option<i32>,

    #[validate(range(min = 1))]
    pub order_number: Option<i32>,

    pub is_preview: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReorderLessonsRequest {
    #[validate(length(min = 1, max = 500))]
    pub lesson_ids: Vec<String>,
}

// ---------------------------------------------------------------------------
// Tests, questions & attempts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTestRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    pub course_id: Option<String>,

    pub lesson_id: Option<String>,

    #[validate(range(min = 0, max = 100))]
    pub passing_score: Option<i32>,

    #[validate(range(min = 0, max = 100))]
    pub max_attempts: Option<i32>,

    #[validate(range(min = 1, max = 600))]
    pub time_limit_minutes: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTestRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(range(min = 0, max = 100))]
    pub passing_score: Option<i32>,

    #[validate(range(min = 0, max = 100))]
    pub max_attempts: Option<i32>,

    #[validate(range(min = 1, max = 600))]
    pub time_limit_minutes: Option<i32>,

    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TestListParams {
    pub course_id: Option<String>,
    pub published: Option<bool>,
    #[validate(range(min = 0))]
    pub offset: Option<i64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    pub question_text: String,

    #[validate(length(min = 2, max = 10, message = "A question needs 2-10 options"))]
    pub options: Vec<String>,

    #[validate(range(min = 0))]
    pub correct_answer: i32,

    #[validate(length(max = 2000))]
    pub explanation: Option<String>,

    #[validate(range(min = 1))]
    pub order_number: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    pub question_text: Option<String>,

    #[validate(length(min = 2, max = 10, message = "A question needs 2-10 options"))]
    pub options: Option<Vec<String>>,

    #[validate(range(min = 0))]
    pub correct_answer: Option<i32>,

    #[validate(length(max = 2000))]
    pub explanation: Option<String>,

    #[validate(range(min = 1))]
    pub order_number: Option<i32>,
}

/// Answers by question position; `null` marks an unanswered question.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAnswersRequest {
    // Same bound as MAX_QUESTIONS_PER_TEST.
    #[validate(length(max = 500))]
    pub answers: Vec<Option<i32>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReviewAttemptRequest {
    pub reviewed: bool,

    #[validate(length(max = 5000))]
    pub review_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AttemptListParams {
    pub test_id: Option<String>,
    #[validate(range(min = 0))]
    pub offset: Option<i64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Enrollments & certificates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetProgressRequest {
    #[validate(range(min = 0, max = 100))]
    pub progress: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CertificateDecisionRequest {
    #[validate(length(max = 2000))]
    pub note: Option<String>,

    #[validate(url)]
    pub certificate_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Announcements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAnnouncementRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 20000))]
    pub content: String,

    pub course_id: Option<String>,

    #[serde(default)]
    pub pinned: bool,

    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAnnouncementRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 20000))]
    pub content: Option<String>,

    pub pinned: Option<bool>,

    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AnnouncementListParams {
    pub course_id: Option<String>,
    pub include_unpublished: Option<bool>,
    #[validate(range(min = 0))]
    pub offset: Option<i64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Contact & resume submissions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    pub phone: Option<String>,

    #[validate(length(min = 1, max = 200))]
    pub subject: String,

    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResumeRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    pub phone: Option<String>,

    #[validate(length(max = 200))]
    pub desired_program: Option<String>,

    #[validate(length(max = 100))]
    pub destination_country: Option<String>,

    #[validate(url)]
    pub resume_url: String,

    #[validate(length(max = 5000))]
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateContactStatusRequest {
    pub status: ContactStatus,

    #[validate(length(max = 5000))]
    pub admin_notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateResumeStatusRequest {
    pub status: ResumeStatus,

    #[validate(length(max = 5000))]
    pub admin_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ContactListParams {
    pub status: Option<ContactStatus>,
    #[validate(range(min = 0))]
    pub offset: Option<i64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ResumeListParams {
    pub status: Option<ResumeStatus>,
    #[validate(range(min = 0))]
    pub offset: Option<i64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UploadParams {
    #[validate(length(min = 1, max = 200))]
    pub file_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    #[validate(range(min = 0))]
    pub offset: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            offset: Some(0),
            limit: Some(20),
        }
    }
}

impl PaginationParams {
    pub fn new(offset: Option<i64>, limit: Option<i64>) -> Self {
        Self { offset, limit }
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}
