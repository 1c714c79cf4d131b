pub mod announcement_repository;
pub mod contact_submission_repository;
pub mod course_repository;
pub mod enrollment_repository;
pub mod lesson_repository;
pub mod refresh_token_repository;
pub mod resume_submission_repository;
pub mod test_attempt_repository;
pub mod test_question_repository;
pub mod test_repository;
pub mod user_repository;

pub use announcement_repository::{
    AnnouncementFilter, AnnouncementRepository, MongoAnnouncementRepository,
};
pub use contact_submission_repository::{
    ContactSubmissionRepository, MongoContactSubmissionRepository,
};
pub use course_repository::{CourseFilter, CourseRepository, MongoCourseRepository};
pub use enrollment_repository::{
    EnrollmentFilter, EnrollmentRepository, MongoEnrollmentRepository,
};
pub use lesson_repository::{LessonRepository, MongoLessonRepository};
pub use refresh_token_repository::{MongoRefreshTokenRepository, RefreshTokenRepository};
pub use resume_submission_repository::{
    MongoResumeSubmissionRepository, ResumeSubmissionRepository,
};
pub use test_attempt_repository::{AttemptFilter, MongoTestAttemptRepository, TestAttemptRepository};
pub use test_question_repository::{MongoTestQuestionRepository, TestQuestionRepository};
pub use test_repository::{MongoTestRepository, TestFilter, TestRepository};
pub use user_repository::{MongoUserRepository, UserFilter, UserRepository};
