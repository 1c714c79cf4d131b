use std::sync::Arc;

use crate::{
    auth::JwtService,
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        AnnouncementRepository, ContactSubmissionRepository, CourseRepository,
        EnrollmentRepository, LessonRepository, MongoAnnouncementRepository,
        MongoContactSubmissionRepository, MongoCourseRepository, MongoEnrollmentRepository,
        MongoLessonRepository, MongoRefreshTokenRepository, MongoResumeSubmissionRepository,
        MongoTestAttemptRepository, MongoTestQuestionRepository, MongoTestRepository,
        MongoUserRepository, RefreshTokenRepository, ResumeSubmissionRepository,
        TestAttemptRepository, TestQuestionRepository, TestRepository, UserRepository,
    },
    services::{
        AnnouncementService, AuthService, CourseChildren, CourseService, DashboardService,
        EnrollmentService, LessonService, NotificationService, StorageService, SubmissionService,
        TestAttemptService, TestDefaults, TestService, UserService,
    },
};

/// One handle per collection. Swapped for in-memory stores in integration tests.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub lessons: Arc<dyn LessonRepository>,
    pub tests: Arc<dyn TestRepository>,
    pub questions: Arc<dyn TestQuestionRepository>,
    pub attempts: Arc<dyn TestAttemptRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub announcements: Arc<dyn AnnouncementRepository>,
    pub contacts: Arc<dyn ContactSubmissionRepository>,
    pub resumes: Arc<dyn ResumeSubmissionRepository>,
}

impl Repositories {
    /// Builds the MongoDB repositories and makes sure their indexes exist.
    pub async fn mongo(db: &Database) -> AppResult<Self> {
        let users = MongoUserRepository::new(db);
        users.ensure_indexes().await?;
        let refresh_tokens = MongoRefreshTokenRepository::new(db);
        refresh_tokens.ensure_indexes().await?;
        let courses = MongoCourseRepository::new(db);
        courses.ensure_indexes().await?;
        let lessons = MongoLessonRepository::new(db);
        lessons.ensure_indexes().await?;
        let tests = MongoTestRepository::new(db);
        tests.ensure_indexes().await?;
        let questions = MongoTestQuestionRepository::new(db);
        questions.ensure_indexes().await?;
        let attempts = MongoTestAttemptRepository::new(db);
        attempts.ensure_indexes().await?;
        let enrollments = MongoEnrollmentRepository::new(db);
        enrollments.ensure_indexes().await?;
        let announcements = MongoAnnouncementRepository::new(db);
        announcements.ensure_indexes().await?;
        let contacts = MongoContactSubmissionRepository::new(db);
        contacts.ensure_indexes().await?;
        let resumes = MongoResumeSubmissionRepository::new(db);
        resumes.ensure_indexes().await?;

        log::info!("MongoDB indexes ensured");

        Ok(Self {
            users: Arc::new(users),
            refresh_tokens: Arc::new(refresh_tokens),
            courses: Arc::new(courses),
            lessons: Arc::new(lessons),
            tests: Arc::new(tests),
            questions: Arc::new(questions),
            attempts: Arc::new(attempts),
            enrollments: Arc::new(enrollments),
            announcements: Arc::new(announcements),
            contacts: Arc::new(contacts),
            resumes: Arc::new(resumes),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub course_service: Arc<CourseService>,
    pub lesson_service: Arc<LessonService>,
    pub test_service: Arc<TestService>,
    pub attempt_service: Arc<TestAttemptService>,
    pub enrollment_service: Arc<EnrollmentService>,
    pub announcement_service: Arc<AnnouncementService>,
    pub submission_service: Arc<SubmissionService>,
    pub storage_service: Arc<StorageService>,
    pub dashboard_service: Arc<DashboardService>,
    pub jwt_service: JwtService,
    /// `None` when running on in-memory repositories.
    pub db: Option<Database>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;
        let repositories = Repositories::mongo(&db).await?;
        let notifications = NotificationService::from_config(&config);

        Ok(Self::with_repositories(
            config,
            repositories,
            notifications,
            Some(db),
        ))
    }

    pub fn with_repositories(
        config: Config,
        repos: Repositories,
        notifications: NotificationService,
        db: Option<Database>,
    ) -> Self {
        let jwt_service = JwtService::new(
            &config.jwt_secret,
            config.jwt_expiration_hours,
            config.jwt_refresh_expiration_hours,
        );

        let auth_service = AuthService::new(
            repos.users.clone(),
            repos.refresh_tokens.clone(),
            jwt_service.clone(),
            notifications.clone(),
            config.admin_email.clone(),
        );
        let user_service = UserService::new(
            repos.users.clone(),
            notifications.clone(),
            config.admin_email.clone(),
        );
        let course_service = CourseService::new(
            repos.courses.clone(),
            repos.users.clone(),
            CourseChildren {
                lessons: repos.lessons.clone(),
                enrollments: repos.enrollments.clone(),
                tests: repos.tests.clone(),
                questions: repos.questions.clone(),
                attempts: repos.attempts.clone(),
                announcements: repos.announcements.clone(),
            },
        );
        let lesson_service = LessonService::new(repos.lessons.clone(), repos.courses.clone());
        let test_service = TestService::new(
            repos.tests.clone(),
            repos.questions.clone(),
            repos.attempts.clone(),
            repos.courses.clone(),
            repos.lessons.clone(),
            repos.users.clone(),
            TestDefaults {
                passing_score: config.default_passing_score,
                max_attempts: config.default_max_attempts,
            },
        );
        let attempt_service = TestAttemptService::new(
            repos.attempts.clone(),
            repos.tests.clone(),
            repos.questions.clone(),
            repos.users.clone(),
            notifications.clone(),
        );
        let enrollment_service = EnrollmentService::new(
            repos.enrollments.clone(),
            repos.courses.clone(),
            repos.lessons.clone(),
            repos.users.clone(),
            notifications.clone(),
        );
        let announcement_service =
            AnnouncementService::new(repos.announcements.clone(), repos.courses.clone());
        let submission_service =
            SubmissionService::new(repos.contacts.clone(), repos.resumes.clone(), notifications);
        let dashboard_service = DashboardService {
            users: repos.users,
            courses: repos.courses,
            enrollments: repos.enrollments,
            tests: repos.tests,
            attempts: repos.attempts,
            contacts: repos.contacts,
            resumes: repos.resumes,
        };

        Self {
            auth_service: Arc::new(auth_service),
            user_service: Arc::new(user_service),
            course_service: Arc::new(course_service),
            lesson_service: Arc::new(lesson_service),
            test_service: Arc::new(test_service),
            attempt_service: Arc::new(attempt_service),
            enrollment_service: Arc::new(enrollment_service),
            announcement_service: Arc::new(announcement_service),
            submission_service: Arc::new(submission_service),
            storage_service: Arc::new(StorageService::from_config(&config)),
            dashboard_service: Arc::new(dashboard_service),
            jwt_service,
            db,
            config: Arc::new(config),
        }
    }

    pub async fn health_check(&self) -> AppResult<()> {
        match &self.db {
            Some(db) => db.health_check().await,
            None => Ok(()),
        }
    }
}
