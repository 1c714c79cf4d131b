use std::sync::Arc;

use crate::{
    auth::{require_admin, require_staff, Claims},
    errors::AppResult,
    models::{
        domain::{CertificateStatus, ContactStatus, ResumeStatus, UserStatus},
        dto::response::{AdminStats, InstructorStats, StudentDashboard},
    },
    repositories::{
        AttemptFilter, ContactSubmissionRepository, CourseFilter, CourseRepository,
        EnrollmentFilter, EnrollmentRepository, ResumeSubmissionRepository, TestAttemptRepository,
        TestFilter, TestRepository, UserFilter, UserRepository,
    },
};

const RECENT_ATTEMPTS: i64 = 10;
const MAX_DASHBOARD_ENROLLMENTS: i64 = 100;

pub struct DashboardService {
    pub users: Arc<dyn UserRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub tests: Arc<dyn TestRepository>,
    pub attempts: Arc<dyn TestAttemptRepository>,
    pub contacts: Arc<dyn ContactSubmissionRepository>,
    pub resumes: Arc<dyn ResumeSubmissionRepository>,
}

impl DashboardService {
    pub async fn admin_stats(&self, claims: &Claims) -> AppResult<AdminStats> {
        require_admin(claims)?;

        let (total_users, pending_users, total_courses, published_courses) = futures::try_join!(
            self.users.count(UserFilter::default()),
            self.users.count(UserFilter {
                status: Some(UserStatus::Pending),
                ..Default::default()
            }),
            self.courses.count(CourseFilter::default()),
            self.courses.count(CourseFilter {
                published: Some(true),
                ..Default::default()
            }),
        )?;

        let (total_enrollments, pending_certificates, new_contact_submissions, pending_resumes) =
            futures::try_join!(
                self.enrollments.count(EnrollmentFilter::default()),
                self.enrollments.count(EnrollmentFilter {
                    certificate_status: Some(CertificateStatus::Requested),
                    ..Default::default()
                }),
                self.contacts.count(Some(ContactStatus::New)),
                self.resumes.count(Some(ResumeStatus::Pending)),
            )?;

        Ok(AdminStats {
            total_users,
            pending_users,
            total_courses,
            published_courses,
            total_enrollments,
            pending_certificates,
            new_contact_submissions,
            pending_resumes,
        })
    }

    /// Totals over the caller's own courses and tests.
    pub async fn instructor_stats(&self, claims: &Claims) -> AppResult<InstructorStats> {
        require_staff(claims)?;

        let own_courses = CourseFilter {
            instructor_id: Some(claims.sub.clone()),
            ..Default::default()
        };
        let course_total = self.courses.count(own_courses.clone()).await?;
        let (courses, _) = self
            .courses
            .list(own_courses, Default::default(), 0, course_total.max(1))
            .await?;

        let tests = self
            .tests
            .count(TestFilter {
                created_by: Some(claims.sub.clone()),
                ..Default::default()
            })
            .await?;

        Ok(InstructorStats {
            courses: course_total,
            total_students: courses.iter().map(|c| c.student_count).sum(),
            tests,
        })
    }

    pub async fn student_dashboard(&self, claims: &Claims) -> AppResult<StudentDashboard> {
        let (enrollments, _) = self
            .enrollments
            .list(
                EnrollmentFilter {
                    user_id: Some(claims.sub.clone()),
                    ..Default::default()
                },
                0,
                MAX_DASHBOARD_ENROLLMENTS,
            )
            .await?;

        let (recent_attempts, _) = self
            .attempts
            .list(
                AttemptFilter {
                    user_id: Some(claims.sub.clone()),
                    test_id: None,
                },
                0,
                RECENT_ATTEMPTS,
            )
            .await?;

        Ok(StudentDashboard {
            enrollments,
            recent_attempts,
        })
    }
}
