use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{require_admin, require_owner_or_admin, Claims},
    errors::{AppError, AppResult},
    models::{
        domain::{
            enrollment::progress_percentage, CertificateStatus, Course, Enrollment, User,
        },
        dto::{
            request::{CertificateDecisionRequest, PaginationParams, SetProgressRequest},
            response::PaginatedResponse,
        },
    },
    repositories::{
        CourseRepository, EnrollmentFilter, EnrollmentRepository, LessonRepository,
        UserRepository,
    },
    services::{
        email_templates,
        guards::{approved_user, ensure_course_manager},
        notification_service::EmailMessage,
        NotificationService,
    },
};

pub struct EnrollmentService {
    enrollment_repository: Arc<dyn EnrollmentRepository>,
    course_repository: Arc<dyn CourseRepository>,
    lesson_repository: Arc<dyn LessonRepository>,
    user_repository: Arc<dyn UserRepository>,
    notifications: NotificationService,
}

impl EnrollmentService {
    pub fn new(
        enrollment_repository: Arc<dyn EnrollmentRepository>,
        course_repository: Arc<dyn CourseRepository>,
        lesson_repository: Arc<dyn LessonRepository>,
        user_repository: Arc<dyn UserRepository>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            enrollment_repository,
            course_repository,
            lesson_repository,
            user_repository,
            notifications,
        }
    }

    async fn get_course(&self, id: &str) -> AppResult<Course> {
        self.course_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course with id '{}' not found", id)))
    }

    async fn get_enrollment(&self, id: &str) -> AppResult<Enrollment> {
        self.enrollment_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Enrollment with id '{}' not found", id)))
    }

    async fn get_owned_enrollment(&self, claims: &Claims, id: &str) -> AppResult<Enrollment> {
        let enrollment = self.get_enrollment(id).await?;
        if enrollment.user_id != claims.sub {
            return Err(AppError::Forbidden(
                "This enrollment belongs to another user".to_string(),
            ));
        }
        Ok(enrollment)
    }

    async fn get_user(&self, id: &str) -> AppResult<User> {
        self.user_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", id)))
    }

    pub async fn enroll(&self, claims: &Claims, course_id: &str) -> AppResult<Enrollment> {
        let user = approved_user(self.user_repository.as_ref(), &claims.sub).await?;
        let course = self.get_course(course_id).await?;
        if !course.published {
            return Err(AppError::BadRequest(
                "This course is not open for enrollment".to_string(),
            ));
        }

        if self
            .enrollment_repository
            .find_by_user_and_course(&user.id, &course.id)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyExists(
                "Already enrolled in this course".to_string(),
            ));
        }

        let enrollment = self
            .enrollment_repository
            .create(Enrollment::new(&user.id, &course.id))
            .await?;
        self.course_repository
            .increment_student_count(&course.id, 1)
            .await?;

        log::info!("User {} enrolled in course {}", user.id, course.id);
        Ok(enrollment)
    }

    /// Owner or admin. The course's student count drops with it.
    pub async fn unenroll(&self, claims: &Claims, enrollment_id: &str) -> AppResult<()> {
        let enrollment = self.get_enrollment(enrollment_id).await?;
        require_owner_or_admin(claims, &enrollment.user_id)?;

        self.enrollment_repository.delete(&enrollment.id).await?;
        self.course_repository
            .increment_student_count(&enrollment.course_id, -1)
            .await?;

        log::info!(
            "Enrollment {} removed (user {}, course {})",
            enrollment.id,
            enrollment.user_id,
            enrollment.course_id
        );
        Ok(())
    }

    /// Idempotent: completing a lesson twice leaves progress unchanged.
    pub async fn complete_lesson(
        &self,
        claims: &Claims,
        enrollment_id: &str,
        lesson_id: &str,
    ) -> AppResult<Enrollment> {
        let mut enrollment = self.get_owned_enrollment(claims, enrollment_id).await?;

        let lesson = self
            .lesson_repository
            .find_by_id(lesson_id)
            .await?
            .filter(|l| l.course_id == enrollment.course_id)
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Lesson '{}' is not part of this course",
                    lesson_id
                ))
            })?;

        if enrollment.completed_lessons.contains(&lesson.id) {
            return Ok(enrollment);
        }

        let course = self.get_course(&enrollment.course_id).await?;
        enrollment.completed_lessons.push(lesson.id);
        let progress = progress_percentage(enrollment.completed_lessons.len(), course.lesson_count);
        enrollment.apply_progress(progress);

        self.enrollment_repository.update(enrollment).await
    }

    pub async fn set_progress(
        &self,
        claims: &Claims,
        enrollment_id: &str,
        request: SetProgressRequest,
    ) -> AppResult<Enrollment> {
        request.validate()?;
        let mut enrollment = self.get_enrollment(enrollment_id).await?;
        let course = self.get_course(&enrollment.course_id).await?;
        ensure_course_manager(claims, &course)?;

        enrollment.apply_progress(request.progress);
        self.enrollment_repository.update(enrollment).await
    }

    pub async fn request_certificate(&self, claims: &Claims, enrollment_id: &str) -> AppResult<Enrollment> {
        let mut enrollment = self.get_owned_enrollment(claims, enrollment_id).await?;
        enrollment.request_certificate()?;
        let enrollment = self.enrollment_repository.update(enrollment).await?;

        log::info!("Certificate requested for enrollment {}", enrollment.id);
        let user = self.get_user(&enrollment.user_id).await?;
        let course = self.get_course(&enrollment.course_id).await?;
        let (subject, body) = email_templates::certificate_requested(&user, &course);
        self.notifications.dispatch_to_admin(subject, body);

        Ok(enrollment)
    }

    pub async fn approve_certificate(
        &self,
        claims: &Claims,
        enrollment_id: &str,
        request: CertificateDecisionRequest,
    ) -> AppResult<Enrollment> {
        require_admin(claims)?;
        request.validate()?;

        let mut enrollment = self.get_enrollment(enrollment_id).await?;
        enrollment.approve_certificate(request.certificate_url)?;
        let enrollment = self.enrollment_repository.update(enrollment).await?;

        log::info!("Certificate approved for enrollment {} by {}", enrollment.id, claims.sub);
        self.notify_decision(&enrollment, email_templates::certificate_approved)
            .await;
        Ok(enrollment)
    }

    pub async fn reject_certificate(
        &self,
        claims: &Claims,
        enrollment_id: &str,
        request: CertificateDecisionRequest,
    ) -> AppResult<Enrollment> {
        require_admin(claims)?;
        request.validate()?;

        let mut enrollment = self.get_enrollment(enrollment_id).await?;
        enrollment.reject_certificate(request.note)?;
        let enrollment = self.enrollment_repository.update(enrollment).await?;

        log::info!("Certificate rejected for enrollment {} by {}", enrollment.id, claims.sub);
        self.notify_decision(&enrollment, email_templates::certificate_rejected)
            .await;
        Ok(enrollment)
    }

    /// The decision is already stored; a failed lookup here only costs the email.
    async fn notify_decision(
        &self,
        enrollment: &Enrollment,
        template: fn(&User, &Course, &Enrollment) -> (String, String),
    ) {
        let recipients = async {
            let user = self.get_user(&enrollment.user_id).await?;
            let course = self.get_course(&enrollment.course_id).await?;
            Ok::<_, AppError>((user, course))
        }
        .await;

        match recipients {
            Ok((user, course)) => {
                let (subject, body) = template(&user, &course, enrollment);
                self.notifications
                    .dispatch(EmailMessage::new(&user.email, subject, body));
            }
            Err(e) => log::warn!(
                "Skipping certificate email for enrollment {}: {}",
                enrollment.id,
                e
            ),
        }
    }

    pub async fn list_pending_certificates(
        &self,
        claims: &Claims,
        pagination: PaginationParams,
    ) -> AppResult<PaginatedResponse<Enrollment>> {
        require_admin(claims)?;
        self.list(
            EnrollmentFilter {
                certificate_status: Some(CertificateStatus::Requested),
                ..Default::default()
            },
            pagination,
        )
        .await
    }

    pub async fn list_my_enrollments(
        &self,
        claims: &Claims,
        pagination: PaginationParams,
    ) -> AppResult<PaginatedResponse<Enrollment>> {
        self.list(
            EnrollmentFilter {
                user_id: Some(claims.sub.clone()),
                ..Default::default()
            },
            pagination,
        )
        .await
    }

    pub async fn list_course_enrollments(
        &self,
        claims: &Claims,
        course_id: &str,
        pagination: PaginationParams,
    ) -> AppResult<PaginatedResponse<Enrollment>> {
        let course = self.get_course(course_id).await?;
        ensure_course_manager(claims, &course)?;
        self.list(
            EnrollmentFilter {
                course_id: Some(course.id),
                ..Default::default()
            },
            pagination,
        )
        .await
    }

    async fn list(
        &self,
        filter: EnrollmentFilter,
        pagination: PaginationParams,
    ) -> AppResult<PaginatedResponse<Enrollment>> {
        pagination.validate()?;
        let (offset, limit) = (pagination.offset(), pagination.limit());
        let (items, total) = self.enrollment_repository.list(filter, offset, limit).await?;
        Ok(PaginatedResponse::new(items, total, offset, limit))
    }
}
