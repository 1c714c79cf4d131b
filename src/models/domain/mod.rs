pub mod announcement;
pub mod course;
pub mod enrollment;
pub mod lesson;
pub mod refresh_token;
pub mod submission;
pub mod test_attempt;
pub mod test_question;
pub mod user;

pub use announcement::Announcement;
pub use course::{Course, CourseType, InstructorRef};
pub use enrollment::{CertificateStatus, Enrollment};
pub use lesson::{Lesson, LessonType};
pub use refresh_token::RefreshToken;
pub use submission::{ContactStatus, ContactSubmission, ResumeStatus, ResumeSubmission};
pub use test::{Test, MAX_QUESTIONS_PER_TEST};
pub use test_attempt::{AttemptStatus, TestAttempt};
pub use test_question::TestQuestion;
pub use user::{User, UserRole, UserStatus};
