pub mod announcement_service;
pub mod auth_service;
pub mod course_service;
pub mod dashboard_service;
pub mod email_templates;
pub mod enrollment_service;
pub mod guards;
pub mod lesson_service;
pub mod notification_service;
pub mod scoring;
pub mod storage_service;
pub mod submission_service;
pub mod test_attempt_service;
pub mod test_service;
pub mod user_service;

pub use announcement_service::AnnouncementService;
pub use auth_service::AuthService;
pub use course_service::{CourseChildren, CourseService};
pub use dashboard_service::DashboardService;
pub use enrollment_service::EnrollmentService;
pub use lesson_service::LessonService;
pub use notification_service::NotificationService;
pub use storage_service::{Bucket, StorageService};
pub use submission_service::SubmissionService;
pub use test_attempt_service::TestAttemptService;
pub use test_service::{TestDefaults, TestService};
pub use user_service::UserService;
