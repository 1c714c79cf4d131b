use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{
    Course, Enrollment, Lesson, Test, TestAttempt, TestQuestion, User, UserRole, UserStatus,
};

/// Success half of the `{ success, data?, message? }` action envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
    pub has_more: bool,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: i64, offset: i64, limit: i64) -> Self {
        let has_more = offset + (items.len() as i64) < total;
        Self {
            items,
            total,
            offset,
            limit,
            has_more,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResponse<U> {
        PaginatedResponse {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            offset: self.offset,
            limit: self.limit,
            has_more: self.has_more,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[graphql(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        UserDto {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            status: user.status,
            phone: user.phone,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RepairRegistrationResponse {
    pub user: UserDto,
    pub fixes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CourseDetail {
    pub course: Course,
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Serialize)]
pub struct TestWithQuestions {
    pub test: Test,
    pub questions: Vec<TestQuestion>,
}

#[derive(Debug, Serialize)]
pub struct QuestionMutationResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<TestQuestion>,
    pub question_count: i64,
}

/// A question as shown to a student: no answer key, no explanation.
#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct QuestionForTaking {
    pub id: String,
    pub question_text: String,
    pub options: Vec<String>,
    pub order_number: i32,
}

impl From<TestQuestion> for QuestionForTaking {
    fn from(question: TestQuestion) -> Self {
        QuestionForTaking {
            id: question.id,
            question_text: question.question_text,
            options: question.options,
            order_number: question.order_number,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct TestForTaking {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub passing_score: i32,
    pub max_attempts: i32,
    pub time_limit_minutes: Option<i32>,
    pub question_count: i64,
    pub questions: Vec<QuestionForTaking>,
}

impl TestForTaking {
    pub fn from_test(test: Test, questions: Vec<TestQuestion>) -> Self {
        TestForTaking {
            id: test.id,
            title: test.title,
            description: test.description,
            passing_score: test.passing_score,
            max_attempts: test.max_attempts,
            time_limit_minutes: test.time_limit_minutes,
            question_count: test.question_count,
            questions: questions.into_iter().map(QuestionForTaking::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub bucket: String,
    pub path: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdminStats {
    pub total_users: i64,
    pub pending_users: i64,
    pub total_courses: i64,
    pub published_courses: i64,
    pub total_enrollments: i64,
    pub pending_certificates: i64,
    pub new_contact_submissions: i64,
    pub pending_resumes: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstructorStats {
    pub courses: i64,
    pub total_students: i64,
    pub tests: i64,
}

#[derive(Debug, Serialize)]
pub struct StudentDashboard {
    pub enrollments: Vec<Enrollment>,
    pub recent_attempts: Vec<TestAttempt>,
}
