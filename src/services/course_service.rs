use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
    models::{
        domain::{
            course::{normalize_pricing, slugify},
            Course, CourseType, InstructorRef, UserRole,
        },
        dto::{
            request::{CourseListParams, CreateCourseRequest, UpdateCourseRequest},
            response::{CourseDetail, PaginatedResponse},
        },
    },
    repositories::{
        AnnouncementRepository, CourseFilter, CourseRepository, EnrollmentRepository,
        LessonRepository, TestAttemptRepository, TestQuestionRepository, TestRepository,
        UserRepository,
    },
    services::guards::{approved_user, can_view_course, ensure_course_manager, require_author},
};

/// Repositories a course delete has to clear before the course itself goes.
pub struct CourseChildren {
    pub lessons: Arc<dyn LessonRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub tests: Arc<dyn TestRepository>,
    pub questions: Arc<dyn TestQuestionRepository>,
    pub attempts: Arc<dyn TestAttemptRepository>,
    pub announcements: Arc<dyn AnnouncementRepository>,
}

pub struct CourseService {
    course_repository: Arc<dyn CourseRepository>,
    user_repository: Arc<dyn UserRepository>,
    children: CourseChildren,
}

/// Applies the free-course rule, then checks paid pricing.
pub fn resolve_pricing(
    course_type: CourseType,
    price: Option<f64>,
    discount_price: Option<f64>,
) -> AppResult<(f64, Option<f64>)> {
    let (price, discount_price) =
        normalize_pricing(course_type, price.unwrap_or(0.0), discount_price);

    if course_type == CourseType::Paid {
        if price <= 0.0 {
            return Err(AppError::BadRequest(
                "Paid courses need a price greater than zero".to_string(),
            ));
        }
        if discount_price.is_some_and(|d| d >= price) {
            return Err(AppError::BadRequest(
                "Discount price must be lower than the price".to_string(),
            ));
        }
    }
    Ok((price, discount_price))
}

impl CourseService {
    pub fn new(
        course_repository: Arc<dyn CourseRepository>,
        user_repository: Arc<dyn UserRepository>,
        children: CourseChildren,
    ) -> Self {
        Self {
            course_repository,
            user_repository,
            children,
        }
    }

    pub async fn create_course(&self, claims: &Claims, request: CreateCourseRequest) -> AppResult<Course> {
        request.validate()?;
        require_author(self.user_repository.as_ref(), claims).await?;

        let instructor = self
            .resolve_instructor(claims, request.instructor_id.as_deref())
            .await?;

        let slug = request
            .slug
            .clone()
            .unwrap_or_else(|| slugify(&request.title));
        if slug.is_empty() {
            return Err(AppError::BadRequest(
                "A slug could not be derived from the title".to_string(),
            ));
        }

        let (price, discount_price) =
            resolve_pricing(request.course_type, request.price, request.discount_price)?;

        let mut course = Course::new(&request.title, &slug, &request.description, instructor);
        course.course_type = request.course_type;
        course.price = price;
        course.discount_price = discount_price;
        course.category = request.category;
        course.level = request.level;
        course.thumbnail_url = request.thumbnail_url;

        let course = self.course_repository.create(course).await?;
        log::info!("Created course {} ({})", course.id, course.slug);
        Ok(course)
    }

    /// The acting user, or for admins optionally another approved instructor.
    async fn resolve_instructor(
        &self,
        claims: &Claims,
        instructor_id: Option<&str>,
    ) -> AppResult<InstructorRef> {
        let id = match instructor_id {
            Some(id) if id != claims.sub => {
                if !claims.is_admin() {
                    return Err(AppError::Forbidden(
                        "Only admins can assign a course to another instructor".to_string(),
                    ));
                }
                id
            }
            _ => claims.sub.as_str(),
        };

        let user = if id == claims.sub && claims.is_admin() {
            self.user_repository
                .find_by_id(id)
                .await?
                .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?
        } else {
            approved_user(self.user_repository.as_ref(), id).await?
        };

        if user.role == UserRole::Student {
            return Err(AppError::BadRequest(format!(
                "User '{}' is not an instructor",
                user.id
            )));
        }
        Ok(InstructorRef {
            id: user.id,
            name: user.name,
        })
    }

    pub async fn update_course(
        &self,
        claims: &Claims,
        id: &str,
        request: UpdateCourseRequest,
    ) -> AppResult<Course> {
        request.validate()?;
        let mut course = self.get_course(id).await?;
        ensure_course_manager(claims, &course)?;

        if let Some(title) = request.title {
            course.title = title.trim().to_string();
        }
        if let Some(slug) = request.slug {
            course.slug = slug;
        }
        if let Some(description) = request.description {
            course.description = description;
        }
        if let Some(category) = request.category {
            course.category = Some(category);
        }
        if let Some(level) = request.level {
            course.level = Some(level);
        }
        if let Some(thumbnail_url) = request.thumbnail_url {
            course.thumbnail_url = Some(thumbnail_url);
        }

        let course_type = request.course_type.unwrap_or(course.course_type);
        let price = request.price.or(Some(course.price));
        let discount_price = request.discount_price.or(course.discount_price);
        let (price, discount_price) = resolve_pricing(course_type, price, discount_price)?;
        course.course_type = course_type;
        course.price = price;
        course.discount_price = discount_price;

        course.touch();
        self.course_repository.update(course).await
    }

    pub async fn set_published(&self, claims: &Claims, id: &str, published: bool) -> AppResult<Course> {
        let mut course = self.get_course(id).await?;
        ensure_course_manager(claims, &course)?;

        course.published = published;
        course.touch();
        let course = self.course_repository.update(course).await?;
        log::info!(
            "Course {} {}",
            course.id,
            if published { "published" } else { "unpublished" }
        );
        Ok(course)
    }

    pub async fn get_course(&self, id: &str) -> AppResult<Course> {
        self.course_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course with id '{}' not found", id)))
    }

    /// A course as seen by `viewer`: drafts look missing to anyone but their managers.
    pub async fn get_visible_course(&self, id: &str, viewer: Option<&Claims>) -> AppResult<Course> {
        let course = self.get_course(id).await?;
        Self::visible(course, viewer, id)
    }

    pub async fn get_visible_course_by_slug(
        &self,
        slug: &str,
        viewer: Option<&Claims>,
    ) -> AppResult<Course> {
        let course = self
            .course_repository
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course '{}' not found", slug)))?;
        Self::visible(course, viewer, slug)
    }

    fn visible(course: Course, viewer: Option<&Claims>, key: &str) -> AppResult<Course> {
        if can_view_course(viewer, &course) {
            Ok(course)
        } else {
            Err(AppError::NotFound(format!("Course '{}' not found", key)))
        }
    }

    pub async fn get_course_detail(&self, id: &str, viewer: Option<&Claims>) -> AppResult<CourseDetail> {
        let course = self.get_visible_course(id, viewer).await?;
        let lessons = self.children.lessons.list_by_course(&course.id).await?;
        Ok(CourseDetail { course, lessons })
    }

    /// Anonymous and student callers only ever see published courses. Instructors see
    /// their own drafts when filtering on themselves; admins see everything.
    pub async fn list_courses(
        &self,
        params: CourseListParams,
        viewer: Option<&Claims>,
    ) -> AppResult<PaginatedResponse<Course>> {
        params.validate()?;

        let offset = params.offset.unwrap_or(0);
        let limit = params.limit.unwrap_or(20);

        let sees_drafts = viewer.is_some_and(|c| {
            c.is_admin()
                || (c.is_staff() && params.instructor_id.as_deref() == Some(c.sub.as_str()))
        });
        let published = if sees_drafts {
            params.published
        } else {
            Some(true)
        };

        let filter = CourseFilter {
            published,
            category: params.category,
            instructor_id: params.instructor_id,
            search: params.search,
            min_price: params.min_price,
            max_price: params.max_price,
        };

        let (courses, total) = self
            .course_repository
            .list(filter, params.sort.unwrap_or_default(), offset, limit)
            .await?;
        Ok(PaginatedResponse::new(courses, total, offset, limit))
    }

    /// Only students enrolled in the course may rate it. Each enrollment holds one
    /// rating; rating again replaces it.
    pub async fn rate_course(&self, claims: &Claims, id: &str, rating: i32) -> AppResult<Course> {
        if !(1..=5).contains(&rating) {
            return Err(AppError::ValidationError(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        let course = self.get_course(id).await?;
        let enrollment = self
            .children
            .enrollments
            .find_by_user_and_course(&claims.sub, &course.id)
            .await?
            .ok_or_else(|| {
                AppError::Forbidden("Only enrolled students can rate this course".to_string())
            })?;

        let previous = self.children.enrollments.set_rating(&enrollment.id, rating).await?;
        if previous == Some(rating) {
            return Ok(course);
        }
        self.course_repository
            .apply_rating(&course.id, previous, rating)
            .await
    }

    /// Removes the course and everything hanging off it, children first.
    pub async fn delete_course(&self, claims: &Claims, id: &str) -> AppResult<()> {
        let course = self.get_course(id).await?;
        ensure_course_manager(claims, &course)?;

        let children = &self.children;
        let tests = children.tests.find_by_course(&course.id).await?;
        for test in &tests {
            children.questions.delete_by_test(&test.id).await?;
            children.attempts.delete_by_test(&test.id).await?;
            children.tests.delete(&test.id).await?;
        }
        let lessons = children.lessons.delete_by_course(&course.id).await?;
        let enrollments = children.enrollments.delete_by_course(&course.id).await?;
        let announcements = children.announcements.delete_by_course(&course.id).await?;

        self.course_repository.delete(&course.id).await?;
        log::info!(
            "Deleted course {} with {} lesson(s), {} enrollment(s), {} test(s), {} announcement(s)",
            course.id,
            lessons,
            enrollments,
            tests.len(),
            announcements
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::domain::{Enrollment, User, UserStatus},
        repositories::{
            announcement_repository::MockAnnouncementRepository,
            course_repository::MockCourseRepository,
            enrollment_repository::MockEnrollmentRepository,
            lesson_repository::MockLessonRepository,
            test_attempt_repository::MockTestAttemptRepository,
            test_question_repository::MockTestQuestionRepository,
            test_repository::MockTestRepository, user_repository::MockUserRepository,
        },
    };

    fn claims_for(user: &User) -> Claims {
        Claims::new(user, 1)
    }

    fn no_children() -> CourseChildren {
        CourseChildren {
            lessons: Arc::new(MockLessonRepository::new()),
            enrollments: Arc::new(MockEnrollmentRepository::new()),
            tests: Arc::new(MockTestRepository::new()),
            questions: Arc::new(MockTestQuestionRepository::new()),
            attempts: Arc::new(MockTestAttemptRepository::new()),
            announcements: Arc::new(MockAnnouncementRepository::new()),
        }
    }

    fn create_request(course_type: CourseType, price: Option<f64>) -> CreateCourseRequest {
        CreateCourseRequest {
            title: "IELTS Preparation".to_string(),
            slug: None,
            description: "Band 7 in eight weeks".to_string(),
            course_type,
            price,
            discount_price: Some(19.0),
            category: Some("language".to_string()),
            level: None,
            thumbnail_url: None,
            instructor_id: None,
        }
    }

    #[test]
    fn free_course_pricing_is_forced_to_zero() {
        assert_eq!(
            resolve_pricing(CourseType::Free, Some(250.0), Some(100.0)).unwrap(),
            (0.0, None)
        );
    }

    #[test]
    fn paid_course_pricing_is_checked() {
        assert!(resolve_pricing(CourseType::Paid, None, None).is_err());
        assert!(resolve_pricing(CourseType::Paid, Some(50.0), Some(50.0)).is_err());
        assert_eq!(
            resolve_pricing(CourseType::Paid, Some(50.0), Some(30.0)).unwrap(),
            (50.0, Some(30.0))
        );
    }

    #[tokio::test]
    async fn approved_instructor_creates_free_course_at_zero_price() {
        let instructor = User::test_user("Ada", UserRole::Instructor, UserStatus::Approved);
        let claims = claims_for(&instructor);

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(instructor.clone())));
        let mut courses = MockCourseRepository::new();
        courses.expect_create().returning(|c| Ok(c));

        let service = CourseService::new(Arc::new(courses), Arc::new(users), no_children());
        let course = service
            .create_course(&claims, create_request(CourseType::Free, Some(99.0)))
            .await
            .unwrap();

        assert_eq!(course.price, 0.0);
        assert_eq!(course.discount_price, None);
        assert_eq!(course.slug, "ielts-preparation");
        assert_eq!(course.instructor.name, "Ada");
        assert!(!course.published);
    }

    #[tokio::test]
    async fn pending_instructor_cannot_create_course() {
        let instructor = User::test_user("Ada", UserRole::Instructor, UserStatus::Pending);
        let claims = claims_for(&instructor);

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(instructor.clone())));
        let mut courses = MockCourseRepository::new();
        courses.expect_create().never();

        let service = CourseService::new(Arc::new(courses), Arc::new(users), no_children());
        let result = service
            .create_course(&claims, create_request(CourseType::Paid, Some(99.0)))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    fn rating_service(course: &Course, enrollment: Option<Enrollment>) -> CourseService {
        let mut courses = MockCourseRepository::new();
        let stored = course.clone();
        courses
            .expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        let rated = course.clone();
        courses
            .expect_apply_rating()
            .returning(move |_, previous, rating| {
                let mut course = rated.clone();
                course.apply_rating(previous, rating);
                Ok(course)
            });

        let previous = enrollment.as_ref().and_then(|e| e.rating);
        let mut enrollments = MockEnrollmentRepository::new();
        enrollments
            .expect_find_by_user_and_course()
            .returning(move |_, _| Ok(enrollment.clone()));
        enrollments
            .expect_set_rating()
            .returning(move |_, _| Ok(previous));

        let mut children = no_children();
        children.enrollments = Arc::new(enrollments);
        CourseService::new(
            Arc::new(courses),
            Arc::new(MockUserRepository::new()),
            children,
        )
    }

    fn published_course() -> Course {
        let mut course = Course::new(
            "Visa",
            "visa",
            "",
            InstructorRef {
                id: "inst-1".into(),
                name: "Ada".into(),
            },
        );
        course.published = true;
        course
    }

    #[tokio::test]
    async fn enrolled_student_rates_course() {
        let student = User::test_user("Sam", UserRole::Student, UserStatus::Approved);
        let course = published_course();
        let enrollment = Enrollment::new(&student.id, &course.id);
        let service = rating_service(&course, Some(enrollment));

        let rated = service
            .rate_course(&claims_for(&student), &course.id, 4)
            .await
            .unwrap();
        assert_eq!(rated.rating_count, 1);
        assert!((rated.rating_average - 4.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn rerating_replaces_the_students_previous_rating() {
        let student = User::test_user("Sam", UserRole::Student, UserStatus::Approved);
        let mut course = published_course();
        course.apply_rating(None, 2);
        let mut enrollment = Enrollment::new(&student.id, &course.id);
        enrollment.rating = Some(2);
        let service = rating_service(&course, Some(enrollment));

        let rated = service
            .rate_course(&claims_for(&student), &course.id, 5)
            .await
            .unwrap();
        assert_eq!(rated.rating_count, 1);
        assert!((rated.rating_average - 5.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn rating_requires_enrollment() {
        let student = User::test_user("Sam", UserRole::Student, UserStatus::Approved);
        let course = published_course();
        let service = rating_service(&course, None);

        let result = service.rate_course(&claims_for(&student), &course.id, 5).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn draft_course_is_hidden_from_anonymous_viewers() {
        let course = Course::new(
            "Draft",
            "draft",
            "",
            InstructorRef {
                id: "inst-1".into(),
                name: "Ada".into(),
            },
        );
        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_by_slug()
            .returning(move |_| Ok(Some(course.clone())));

        let service = CourseService::new(
            Arc::new(courses),
            Arc::new(MockUserRepository::new()),
            no_children(),
        );
        let result = service.get_visible_course_by_slug("draft", None).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
