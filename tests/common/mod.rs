#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use eduhub_server::{
    app_state::{AppState, Repositories},
    auth::Claims,
    config::Config,
    errors::{AppError, AppResult},
    models::{
        domain::{
            Announcement, AttemptStatus, ContactStatus, ContactSubmission, Course, Enrollment,
            Lesson, RefreshToken, ResumeStatus, ResumeSubmission, Test, TestAttempt, TestQuestion,
            User, UserRole, UserStatus,
        },
        dto::request::CourseSort,
    },
    repositories::{
        AnnouncementFilter, AnnouncementRepository, AttemptFilter, ContactSubmissionRepository,
        CourseFilter, CourseRepository, EnrollmentFilter, EnrollmentRepository, LessonRepository,
        RefreshTokenRepository, ResumeSubmissionRepository, TestAttemptRepository, TestFilter,
        TestQuestionRepository, TestRepository, UserFilter, UserRepository,
    },
    services::NotificationService,
};

/// Every collection in one place, so counters kept on one document can be
/// rewritten from another repository the way the Mongo transactions do.
#[derive(Default)]
pub struct Store {
    pub users: RwLock<HashMap<String, User>>,
    pub refresh_tokens: RwLock<HashMap<String, RefreshToken>>,
    pub courses: RwLock<HashMap<String, Course>>,
    pub lessons: RwLock<HashMap<String, Lesson>>,
    pub tests: RwLock<HashMap<String, Test>>,
    pub questions: RwLock<HashMap<String, TestQuestion>>,
    pub attempts: RwLock<HashMap<String, TestAttempt>>,
    pub enrollments: RwLock<HashMap<String, Enrollment>>,
    pub announcements: RwLock<HashMap<String, Announcement>>,
    pub contacts: RwLock<HashMap<String, ContactSubmission>>,
    pub resumes: RwLock<HashMap<String, ResumeSubmission>>,
}

#[derive(Clone, Default)]
pub struct InMemoryDb {
    pub store: Arc<Store>,
}

fn page<T: Clone>(items: Vec<T>, offset: i64, limit: i64) -> (Vec<T>, i64) {
    let total = items.len() as i64;
    let start = offset.max(0) as usize;
    let end = (start + limit.max(0) as usize).min(items.len());
    let page = if start >= items.len() {
        vec![]
    } else {
        items[start..end].to_vec()
    };
    (page, total)
}

fn insert_new<T: Clone>(map: &mut HashMap<String, T>, id: &str, item: T, kind: &str) -> AppResult<T> {
    if map.contains_key(id) {
        return Err(AppError::AlreadyExists(format!("{} '{}' already exists", kind, id)));
    }
    map.insert(id.to_string(), item.clone());
    Ok(item)
}

fn replace<T: Clone>(map: &mut HashMap<String, T>, id: &str, item: T, kind: &str) -> AppResult<T> {
    match map.get_mut(id) {
        Some(slot) => {
            *slot = item.clone();
            Ok(item)
        }
        None => Err(AppError::NotFound(format!("{} '{}' not found", kind, id))),
    }
}

fn remove<T>(map: &mut HashMap<String, T>, id: &str, kind: &str) -> AppResult<()> {
    map.remove(id)
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound(format!("{} '{}' not found", kind, id)))
}

fn remove_where<T>(map: &mut HashMap<String, T>, pred: impl Fn(&T) -> bool) -> u64 {
    let before = map.len();
    map.retain(|_, v| !pred(v));
    (before - map.len()) as u64
}

impl InMemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(self.clone()),
            refresh_tokens: Arc::new(self.clone()),
            courses: Arc::new(self.clone()),
            lessons: Arc::new(self.clone()),
            tests: Arc::new(self.clone()),
            questions: Arc::new(self.clone()),
            attempts: Arc::new(self.clone()),
            enrollments: Arc::new(self.clone()),
            announcements: Arc::new(self.clone()),
            contacts: Arc::new(self.clone()),
            resumes: Arc::new(self.clone()),
        }
    }

    pub fn app_state(&self, config: Config) -> AppState {
        AppState::with_repositories(config, self.repositories(), NotificationService::disabled(), None)
    }

    /// Inserts a user directly, bypassing registration.
    pub async fn seed_user(&self, name: &str, role: UserRole, status: UserStatus) -> (User, Claims) {
        let email = format!("{}@eduhub.test", name.to_lowercase().replace(' ', "."));
        let mut user = User::new(name, &email, "$argon2id$unused", role);
        user.status = status;
        self.store
            .users
            .write()
            .await
            .insert(user.id.clone(), user.clone());
        let claims = Claims::new(&user, 1);
        (user, claims)
    }
}

pub fn test_config() -> Config {
    let mut config = Config::from_env();
    config.admin_email = Some("admin@eduhub.test".to_string());
    config.default_passing_score = 80;
    config.default_max_attempts = 3;
    config.smtp_primary = None;
    config.smtp_fallback = None;
    config
}

#[async_trait]
impl UserRepository for InMemoryDb {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.store.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::AlreadyExists(format!(
                "User with email '{}' already exists",
                user.email
            )));
        }
        let id = user.id.clone();
        insert_new(&mut *users, &id, user, "User")
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.store.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .store
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list(&self, filter: UserFilter, offset: i64, limit: i64) -> AppResult<(Vec<User>, i64)> {
        let users = self.store.users.read().await;
        let mut items: Vec<_> = users.values().filter(|u| filter.matches(u)).cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(items, offset, limit))
    }

    async fn count(&self, filter: UserFilter) -> AppResult<i64> {
        let users = self.store.users.read().await;
        Ok(users.values().filter(|u| filter.matches(u)).count() as i64)
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let id = user.id.clone();
        replace(&mut *self.store.users.write().await, &id, user, "User")
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryDb {
    async fn create(&self, token: RefreshToken) -> AppResult<RefreshToken> {
        let id = token.id.clone();
        insert_new(&mut *self.store.refresh_tokens.write().await, &id, token, "Token")
    }

    async fn find_by_token_hash(&self, hash: &str) -> AppResult<Option<RefreshToken>> {
        Ok(self
            .store
            .refresh_tokens
            .read()
            .await
            .values()
            .find(|t| t.token_hash == hash)
            .cloned())
    }

    async fn revoke_active(&self, hash: &str) -> AppResult<bool> {
        let mut tokens = self.store.refresh_tokens.write().await;
        match tokens.values_mut().find(|t| t.token_hash == hash && !t.revoked) {
            Some(token) => {
                token.revoked = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn revoke_all_for_user(&self, user_id: &str) -> AppResult<u64> {
        let mut tokens = self.store.refresh_tokens.write().await;
        let mut revoked = 0;
        for token in tokens.values_mut().filter(|t| t.user_id == user_id && !t.revoked) {
            token.revoked = true;
            revoked += 1;
        }
        Ok(revoked)
    }
}

#[async_trait]
impl CourseRepository for InMemoryDb {
    async fn create(&self, course: Course) -> AppResult<Course> {
        let mut courses = self.store.courses.write().await;
        if courses.values().any(|c| c.slug == course.slug) {
            return Err(AppError::AlreadyExists(format!(
                "Course with slug '{}' already exists",
                course.slug
            )));
        }
        let id = course.id.clone();
        insert_new(&mut *courses, &id, course, "Course")
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Course>> {
        Ok(self.store.courses.read().await.get(id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Course>> {
        Ok(self
            .store
            .courses
            .read()
            .await
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn list(
        &self,
        filter: CourseFilter,
        sort: CourseSort,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Course>, i64)> {
        let courses = self.store.courses.read().await;
        let mut items: Vec<_> = courses.values().filter(|c| filter.matches(c)).cloned().collect();
        match sort {
            CourseSort::Newest => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            CourseSort::PriceAsc => items.sort_by(|a, b| a.price.total_cmp(&b.price)),
            CourseSort::PriceDesc => items.sort_by(|a, b| b.price.total_cmp(&a.price)),
            CourseSort::Rating => {
                items.sort_by(|a, b| b.rating_average.total_cmp(&a.rating_average))
            }
        }
        Ok(page(items, offset, limit))
    }

    async fn count(&self, filter: CourseFilter) -> AppResult<i64> {
        let courses = self.store.courses.read().await;
        Ok(courses.values().filter(|c| filter.matches(c)).count() as i64)
    }

    async fn update(&self, course: Course) -> AppResult<Course> {
        let mut courses = self.store.courses.write().await;
        if courses
            .values()
            .any(|c| c.slug == course.slug && c.id != course.id)
        {
            return Err(AppError::AlreadyExists(format!(
                "Course with slug '{}' already exists",
                course.slug
            )));
        }
        let stored = courses
            .get_mut(&course.id)
            .ok_or_else(|| AppError::NotFound(format!("Course '{}' not found", course.id)))?;
        stored.title = course.title;
        stored.slug = course.slug;
        stored.description = course.description;
        stored.course_type = course.course_type;
        stored.price = course.price;
        stored.discount_price = course.discount_price;
        stored.category = course.category;
        stored.level = course.level;
        stored.thumbnail_url = course.thumbnail_url;
        stored.published = course.published;
        stored.modified_at = course.modified_at;
        Ok(stored.clone())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        remove(&mut *self.store.courses.write().await, id, "Course")
    }

    async fn apply_rating(&self, id: &str, previous: Option<i32>, rating: i32) -> AppResult<Course> {
        let mut courses = self.store.courses.write().await;
        let course = courses
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Course '{}' not found", id)))?;
        course.apply_rating(previous, rating);
        Ok(course.clone())
    }

    async fn increment_student_count(&self, id: &str, delta: i64) -> AppResult<()> {
        let mut courses = self.store.courses.write().await;
        let course = courses
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Course '{}' not found", id)))?;
        course.student_count = (course.student_count + delta).max(0);
        Ok(())
    }

    async fn set_lesson_count(&self, id: &str, count: i64) -> AppResult<()> {
        let mut courses = self.store.courses.write().await;
        let course = courses
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Course '{}' not found", id)))?;
        course.lesson_count = count;
        Ok(())
    }
}

#[async_trait]
impl LessonRepository for InMemoryDb {
    async fn create(&self, lesson: Lesson) -> AppResult<Lesson> {
        let id = lesson.id.clone();
        insert_new(&mut *self.store.lessons.write().await, &id, lesson, "Lesson")
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Lesson>> {
        Ok(self.store.lessons.read().await.get(id).cloned())
    }

    async fn list_by_course(&self, course_id: &str) -> AppResult<Vec<Lesson>> {
        let lessons = self.store.lessons.read().await;
        let mut items: Vec<_> = lessons
            .values()
            .filter(|l| l.course_id == course_id)
            .cloned()
            .collect();
        items.sort_by_key(|l| l.order_number);
        Ok(items)
    }

    async fn count_by_course(&self, course_id: &str) -> AppResult<i64> {
        let lessons = self.store.lessons.read().await;
        Ok(lessons.values().filter(|l| l.course_id == course_id).count() as i64)
    }

    async fn update(&self, lesson: Lesson) -> AppResult<Lesson> {
        let id = lesson.id.clone();
        replace(&mut *self.store.lessons.write().await, &id, lesson, "Lesson")
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        remove(&mut *self.store.lessons.write().await, id, "Lesson")
    }

    async fn delete_by_parent(&self, parent_id: &str) -> AppResult<u64> {
        let mut lessons = self.store.lessons.write().await;
        Ok(remove_where(&mut *lessons, |l| l.parent_id.as_deref() == Some(parent_id)))
    }

    async fn delete_by_course(&self, course_id: &str) -> AppResult<u64> {
        let mut lessons = self.store.lessons.write().await;
        Ok(remove_where(&mut *lessons, |l| l.course_id == course_id))
    }
}

#[async_trait]
impl TestRepository for InMemoryDb {
    async fn create(&self, test: Test) -> AppResult<Test> {
        let id = test.id.clone();
        insert_new(&mut *self.store.tests.write().await, &id, test, "Test")
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Test>> {
        Ok(self.store.tests.read().await.get(id).cloned())
    }

    async fn find_by_course(&self, course_id: &str) -> AppResult<Vec<Test>> {
        let tests = self.store.tests.read().await;
        Ok(tests
            .values()
            .filter(|t| t.course_id.as_deref() == Some(course_id))
            .cloned()
            .collect())
    }

    async fn list(&self, filter: TestFilter, offset: i64, limit: i64) -> AppResult<(Vec<Test>, i64)> {
        let tests = self.store.tests.read().await;
        let mut items: Vec<_> = tests.values().filter(|t| filter.matches(t)).cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(items, offset, limit))
    }

    async fn count(&self, filter: TestFilter) -> AppResult<i64> {
        let tests = self.store.tests.read().await;
        Ok(tests.values().filter(|t| filter.matches(t)).count() as i64)
    }

    async fn update(&self, test: Test) -> AppResult<Test> {
        let mut tests = self.store.tests.write().await;
        let stored = tests
            .get_mut(&test.id)
            .ok_or_else(|| AppError::NotFound(format!("Test '{}' not found", test.id)))?;
        stored.title = test.title;
        stored.description = test.description;
        stored.passing_score = test.passing_score;
        stored.max_attempts = test.max_attempts;
        stored.time_limit_minutes = test.time_limit_minutes;
        stored.published = test.published;
        stored.modified_at = test.modified_at;
        Ok(stored.clone())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        remove(&mut *self.store.tests.write().await, id, "Test")
    }

    async fn set_question_count(&self, id: &str, count: i64) -> AppResult<()> {
        let mut tests = self.store.tests.write().await;
        let test = tests
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Test '{}' not found", id)))?;
        test.question_count = count;
        Ok(())
    }
}

impl InMemoryDb {
    /// Both locks are held while the count is rewritten, mirroring the transaction.
    async fn write_question_count(
        &self,
        questions: &HashMap<String, TestQuestion>,
        test_id: &str,
    ) -> AppResult<i64> {
        let count = questions.values().filter(|q| q.test_id == test_id).count() as i64;
        let mut tests = self.store.tests.write().await;
        let test = tests
            .get_mut(test_id)
            .ok_or_else(|| AppError::NotFound(format!("Test '{}' not found", test_id)))?;
        test.question_count = count;
        Ok(count)
    }
}

#[async_trait]
impl TestQuestionRepository for InMemoryDb {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<TestQuestion>> {
        Ok(self.store.questions.read().await.get(id).cloned())
    }

    async fn find_by_test(&self, test_id: &str) -> AppResult<Vec<TestQuestion>> {
        let questions = self.store.questions.read().await;
        let mut items: Vec<_> = questions
            .values()
            .filter(|q| q.test_id == test_id)
            .cloned()
            .collect();
        items.sort_by_key(|q| q.order_number);
        Ok(items)
    }

    async fn count_by_test(&self, test_id: &str) -> AppResult<i64> {
        let questions = self.store.questions.read().await;
        Ok(questions.values().filter(|q| q.test_id == test_id).count() as i64)
    }

    async fn create(&self, question: TestQuestion) -> AppResult<i64> {
        let mut questions = self.store.questions.write().await;
        let test_id = question.test_id.clone();
        let id = question.id.clone();
        insert_new(&mut *questions, &id, question, "Question")?;
        self.write_question_count(&*questions, &test_id).await
    }

    async fn update(&self, question: TestQuestion) -> AppResult<TestQuestion> {
        let id = question.id.clone();
        replace(&mut *self.store.questions.write().await, &id, question, "Question")
    }

    async fn delete(&self, id: &str, test_id: &str) -> AppResult<i64> {
        let mut questions = self.store.questions.write().await;
        remove(&mut *questions, id, "Question")?;
        self.write_question_count(&*questions, test_id).await
    }

    async fn delete_by_test(&self, test_id: &str) -> AppResult<u64> {
        let mut questions = self.store.questions.write().await;
        Ok(remove_where(&mut *questions, |q| q.test_id == test_id))
    }
}

#[async_trait]
impl TestAttemptRepository for InMemoryDb {
    async fn create(&self, attempt: TestAttempt) -> AppResult<TestAttempt> {
        let id = attempt.id.clone();
        insert_new(&mut *self.store.attempts.write().await, &id, attempt, "Attempt")
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<TestAttempt>> {
        Ok(self.store.attempts.read().await.get(id).cloned())
    }

    async fn find_in_progress(&self, user_id: &str, test_id: &str) -> AppResult<Option<TestAttempt>> {
        Ok(self
            .store
            .attempts
            .read()
            .await
            .values()
            .find(|a| {
                a.user_id == user_id && a.test_id == test_id && a.status == AttemptStatus::InProgress
            })
            .cloned())
    }

    async fn count_user_attempts(&self, user_id: &str, test_id: &str) -> AppResult<i64> {
        let attempts = self.store.attempts.read().await;
        Ok(attempts
            .values()
            .filter(|a| a.user_id == user_id && a.test_id == test_id)
            .count() as i64)
    }

    async fn list(
        &self,
        filter: AttemptFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<TestAttempt>, i64)> {
        let attempts = self.store.attempts.read().await;
        let mut items: Vec<_> = attempts.values().filter(|a| filter.matches(a)).cloned().collect();
        items.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(page(items, offset, limit))
    }

    async fn update(&self, attempt: TestAttempt) -> AppResult<TestAttempt> {
        let id = attempt.id.clone();
        replace(&mut *self.store.attempts.write().await, &id, attempt, "Attempt")
    }

    async fn delete_by_test(&self, test_id: &str) -> AppResult<u64> {
        let mut attempts = self.store.attempts.write().await;
        Ok(remove_where(&mut *attempts, |a| a.test_id == test_id))
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryDb {
    async fn create(&self, enrollment: Enrollment) -> AppResult<Enrollment> {
        let mut enrollments = self.store.enrollments.write().await;
        if enrollments
            .values()
            .any(|e| e.user_id == enrollment.user_id && e.course_id == enrollment.course_id)
        {
            return Err(AppError::AlreadyExists(
                "Already enrolled in this course".to_string(),
            ));
        }
        let id = enrollment.id.clone();
        insert_new(&mut *enrollments, &id, enrollment, "Enrollment")
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Enrollment>> {
        Ok(self.store.enrollments.read().await.get(id).cloned())
    }

    async fn find_by_user_and_course(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> AppResult<Option<Enrollment>> {
        Ok(self
            .store
            .enrollments
            .read()
            .await
            .values()
            .find(|e| e.user_id == user_id && e.course_id == course_id)
            .cloned())
    }

    async fn list(
        &self,
        filter: EnrollmentFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Enrollment>, i64)> {
        let enrollments = self.store.enrollments.read().await;
        let mut items: Vec<_> = enrollments
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.enrolled_at.cmp(&a.enrolled_at));
        Ok(page(items, offset, limit))
    }

    async fn count(&self, filter: EnrollmentFilter) -> AppResult<i64> {
        let enrollments = self.store.enrollments.read().await;
        Ok(enrollments.values().filter(|e| filter.matches(e)).count() as i64)
    }

    async fn update(&self, mut enrollment: Enrollment) -> AppResult<Enrollment> {
        let mut enrollments = self.store.enrollments.write().await;
        let stored = enrollments
            .get_mut(&enrollment.id)
            .ok_or_else(|| AppError::NotFound(format!("Enrollment '{}' not found", enrollment.id)))?;
        enrollment.rating = stored.rating;
        *stored = enrollment.clone();
        Ok(enrollment)
    }

    async fn set_rating(&self, id: &str, rating: i32) -> AppResult<Option<i32>> {
        let mut enrollments = self.store.enrollments.write().await;
        let enrollment = enrollments
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Enrollment '{}' not found", id)))?;
        Ok(enrollment.rating.replace(rating))
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        remove(&mut *self.store.enrollments.write().await, id, "Enrollment")
    }

    async fn delete_by_course(&self, course_id: &str) -> AppResult<u64> {
        let mut enrollments = self.store.enrollments.write().await;
        Ok(remove_where(&mut *enrollments, |e| e.course_id == course_id))
    }
}

#[async_trait]
impl AnnouncementRepository for InMemoryDb {
    async fn create(&self, announcement: Announcement) -> AppResult<Announcement> {
        let id = announcement.id.clone();
        insert_new(&mut *self.store.announcements.write().await, &id, announcement, "Announcement")
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Announcement>> {
        Ok(self.store.announcements.read().await.get(id).cloned())
    }

    async fn list(
        &self,
        filter: AnnouncementFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Announcement>, i64)> {
        let announcements = self.store.announcements.read().await;
        let mut items: Vec<_> = announcements
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            b.pinned
                .cmp(&a.pinned)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(page(items, offset, limit))
    }

    async fn update(&self, announcement: Announcement) -> AppResult<Announcement> {
        let id = announcement.id.clone();
        replace(&mut *self.store.announcements.write().await, &id, announcement, "Announcement")
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        remove(&mut *self.store.announcements.write().await, id, "Announcement")
    }

    async fn delete_by_course(&self, course_id: &str) -> AppResult<u64> {
        let mut announcements = self.store.announcements.write().await;
        Ok(remove_where(&mut *announcements, |a| {
            a.course_id.as_deref() == Some(course_id)
        }))
    }
}

#[async_trait]
impl ContactSubmissionRepository for InMemoryDb {
    async fn create(&self, submission: ContactSubmission) -> AppResult<ContactSubmission> {
        let id = submission.id.clone();
        insert_new(&mut *self.store.contacts.write().await, &id, submission, "Contact")
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<ContactSubmission>> {
        Ok(self.store.contacts.read().await.get(id).cloned())
    }

    async fn list(
        &self,
        status: Option<ContactStatus>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<ContactSubmission>, i64)> {
        let contacts = self.store.contacts.read().await;
        let mut items: Vec<_> = contacts
            .values()
            .filter(|c| status.map_or(true, |s| c.status == s))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(items, offset, limit))
    }

    async fn count(&self, status: Option<ContactStatus>) -> AppResult<i64> {
        let contacts = self.store.contacts.read().await;
        Ok(contacts
            .values()
            .filter(|c| status.map_or(true, |s| c.status == s))
            .count() as i64)
    }

    async fn update(&self, submission: ContactSubmission) -> AppResult<ContactSubmission> {
        let id = submission.id.clone();
        replace(&mut *self.store.contacts.write().await, &id, submission, "Contact")
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        remove(&mut *self.store.contacts.write().await, id, "Contact")
    }
}

#[async_trait]
impl ResumeSubmissionRepository for InMemoryDb {
    async fn create(&self, submission: ResumeSubmission) -> AppResult<ResumeSubmission> {
        let id = submission.id.clone();
        insert_new(&mut *self.store.resumes.write().await, &id, submission, "Resume")
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<ResumeSubmission>> {
        Ok(self.store.resumes.read().await.get(id).cloned())
    }

    async fn list(
        &self,
        status: Option<ResumeStatus>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<ResumeSubmission>, i64)> {
        let resumes = self.store.resumes.read().await;
        let mut items: Vec<_> = resumes
            .values()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(items, offset, limit))
    }

    async fn count(&self, status: Option<ResumeStatus>) -> AppResult<i64> {
        let resumes = self.store.resumes.read().await;
        Ok(resumes
            .values()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .count() as i64)
    }

    async fn update(&self, submission: ResumeSubmission) -> AppResult<ResumeSubmission> {
        let id = submission.id.clone();
        replace(&mut *self.store.resumes.write().await, &id, submission, "Resume")
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        remove(&mut *self.store.resumes.write().await, id, "Resume")
    }
}
