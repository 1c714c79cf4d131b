use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{require_approved, Claims},
    errors::{AppError, AppResult},
    models::{
        domain::{Test, TestQuestion, MAX_QUESTIONS_PER_TEST},
        dto::{
            request::{
                CreateQuestionRequest, CreateTestRequest, TestListParams, UpdateQuestionRequest,
                UpdateTestRequest,
            },
            response::{PaginatedResponse, QuestionMutationResponse, TestForTaking, TestWithQuestions},
        },
    },
    repositories::{
        CourseRepository, LessonRepository, TestAttemptRepository, TestFilter,
        TestQuestionRepository, TestRepository, UserRepository,
    },
    services::guards::{ensure_course_manager, ensure_test_manager, require_author},
};

/// Values applied when a new test does not set them.
#[derive(Debug, Clone, Copy)]
pub struct TestDefaults {
    pub passing_score: i32,
    pub max_attempts: i32,
}

pub struct TestService {
    test_repository: Arc<dyn TestRepository>,
    question_repository: Arc<dyn TestQuestionRepository>,
    attempt_repository: Arc<dyn TestAttemptRepository>,
    course_repository: Arc<dyn CourseRepository>,
    lesson_repository: Arc<dyn LessonRepository>,
    user_repository: Arc<dyn UserRepository>,
    defaults: TestDefaults,
}

impl TestService {
    pub fn new(
        test_repository: Arc<dyn TestRepository>,
        question_repository: Arc<dyn TestQuestionRepository>,
        attempt_repository: Arc<dyn TestAttemptRepository>,
        course_repository: Arc<dyn CourseRepository>,
        lesson_repository: Arc<dyn LessonRepository>,
        user_repository: Arc<dyn UserRepository>,
        defaults: TestDefaults,
    ) -> Self {
        Self {
            test_repository,
            question_repository,
            attempt_repository,
            course_repository,
            lesson_repository,
            user_repository,
            defaults,
        }
    }

    pub async fn get_test(&self, id: &str) -> AppResult<Test> {
        self.test_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test with id '{}' not found", id)))
    }

    async fn get_managed_test(&self, claims: &Claims, id: &str) -> AppResult<Test> {
        let test = self.get_test(id).await?;
        ensure_test_manager(claims, &test)?;
        Ok(test)
    }

    pub async fn create_test(&self, claims: &Claims, request: CreateTestRequest) -> AppResult<Test> {
        request.validate()?;
        require_author(self.user_repository.as_ref(), claims).await?;

        let course_id = self
            .resolve_placement(claims, request.course_id, request.lesson_id.as_deref())
            .await?;

        let mut test = Test::new(
            &request.title,
            &claims.sub,
            request.passing_score.unwrap_or(self.defaults.passing_score),
            request.max_attempts.unwrap_or(self.defaults.max_attempts),
        );
        test.course_id = course_id;
        test.lesson_id = request.lesson_id;
        test.description = request.description;
        test.time_limit_minutes = request.time_limit_minutes;

        let test = self.test_repository.create(test).await?;
        log::info!("Created test {} by {}", test.id, claims.sub);
        Ok(test)
    }

    /// Checks the course/lesson a test is attached to and returns the course id.
    /// A lesson alone implies its course.
    async fn resolve_placement(
        &self,
        claims: &Claims,
        course_id: Option<String>,
        lesson_id: Option<&str>,
    ) -> AppResult<Option<String>> {
        let course_id = match lesson_id {
            Some(lesson_id) => {
                let lesson = self
                    .lesson_repository
                    .find_by_id(lesson_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!("Lesson with id '{}' not found", lesson_id))
                    })?;
                if course_id.as_ref().is_some_and(|id| id != &lesson.course_id) {
                    return Err(AppError::BadRequest(
                        "Lesson does not belong to the given course".to_string(),
                    ));
                }
                Some(lesson.course_id)
            }
            None => course_id,
        };

        if let Some(id) = &course_id {
            let course = self
                .course_repository
                .find_by_id(id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Course with id '{}' not found", id)))?;
            ensure_course_manager(claims, &course)?;
        }
        Ok(course_id)
    }

    pub async fn get_test_with_questions(&self, claims: &Claims, id: &str) -> AppResult<TestWithQuestions> {
        let test = self.get_managed_test(claims, id).await?;
        let questions = self.question_repository.find_by_test(&test.id).await?;
        Ok(TestWithQuestions { test, questions })
    }

    /// Admins see every test, instructors only the ones they wrote.
    pub async fn list_tests(&self, claims: &Claims, params: TestListParams) -> AppResult<PaginatedResponse<Test>> {
        params.validate()?;
        if !claims.is_staff() {
            return Err(AppError::Forbidden("Staff access required".to_string()));
        }

        let offset = params.offset.unwrap_or(0);
        let limit = params.limit.unwrap_or(20);
        let filter = TestFilter {
            course_id: params.course_id,
            published: params.published,
            created_by: (!claims.is_admin()).then(|| claims.sub.clone()),
        };

        let (tests, total) = self.test_repository.list(filter, offset, limit).await?;
        Ok(PaginatedResponse::new(tests, total, offset, limit))
    }

    pub async fn update_test(&self, claims: &Claims, id: &str, request: UpdateTestRequest) -> AppResult<Test> {
        request.validate()?;
        let mut test = self.get_managed_test(claims, id).await?;

        if let Some(title) = request.title {
            test.title = title.trim().to_string();
        }
        if let Some(description) = request.description {
            test.description = Some(description);
        }
        if let Some(passing_score) = request.passing_score {
            test.passing_score = passing_score;
        }
        if let Some(max_attempts) = request.max_attempts {
            test.max_attempts = max_attempts;
        }
        if let Some(minutes) = request.time_limit_minutes {
            test.time_limit_minutes = Some(minutes);
        }
        if let Some(published) = request.published {
            if published && !test.published {
                let count = self.question_repository.count_by_test(&test.id).await?;
                if count == 0 {
                    return Err(AppError::BadRequest(
                        "A test needs at least one question before it can be published".to_string(),
                    ));
                }
            }
            test.published = published;
        }

        test.touch();
        self.test_repository.update(test).await
    }

    /// Deletes the test with its questions and attempts.
    pub async fn delete_test(&self, claims: &Claims, id: &str) -> AppResult<()> {
        let test = self.get_managed_test(claims, id).await?;

        let questions = self.question_repository.delete_by_test(&test.id).await?;
        let attempts = self.attempt_repository.delete_by_test(&test.id).await?;
        self.test_repository.delete(&test.id).await?;

        log::info!(
            "Deleted test {} with {} question(s) and {} attempt(s)",
            test.id,
            questions,
            attempts
        );
        Ok(())
    }

    pub async fn list_questions(&self, claims: &Claims, test_id: &str) -> AppResult<Vec<TestQuestion>> {
        let test = self.get_managed_test(claims, test_id).await?;
        self.question_repository.find_by_test(&test.id).await
    }

    pub async fn add_question(
        &self,
        claims: &Claims,
        test_id: &str,
        request: CreateQuestionRequest,
    ) -> AppResult<QuestionMutationResponse> {
        request.validate()?;
        let test = self.get_managed_test(claims, test_id).await?;

        let existing = self.question_repository.count_by_test(&test.id).await?;
        if existing >= MAX_QUESTIONS_PER_TEST {
            return Err(AppError::BadRequest(format!(
                "A test holds at most {} questions",
                MAX_QUESTIONS_PER_TEST
            )));
        }
        let order_number = request.order_number.unwrap_or(existing as i32 + 1);

        let mut question = TestQuestion::new(
            &test.id,
            &request.question_text,
            request.options,
            request.correct_answer,
            order_number,
        );
        question.explanation = request.explanation;
        ensure_valid_answer(&question)?;

        let question_count = self.question_repository.create(question.clone()).await?;
        log::info!("Added question to test {} ({} total)", test.id, question_count);

        Ok(QuestionMutationResponse {
            question: Some(question),
            question_count,
        })
    }

    pub async fn update_question(
        &self,
        claims: &Claims,
        id: &str,
        request: UpdateQuestionRequest,
    ) -> AppResult<QuestionMutationResponse> {
        request.validate()?;
        let mut question = self.get_question(id).await?;
        let test = self.get_managed_test(claims, &question.test_id).await?;

        if let Some(text) = request.question_text {
            question.question_text = text.trim().to_string();
        }
        if let Some(options) = request.options {
            question.options = options;
        }
        if let Some(correct_answer) = request.correct_answer {
            question.correct_answer = correct_answer;
        }
        if let Some(explanation) = request.explanation {
            question.explanation = Some(explanation);
        }
        if let Some(order_number) = request.order_number {
            question.order_number = order_number;
        }
        ensure_valid_answer(&question)?;
        question.modified_at = Some(chrono::Utc::now());

        let question = self.question_repository.update(question).await?;
        let question_count = match self.recalculate_question_count(&test.id).await {
            Some(count) => count,
            None => test.question_count,
        };

        Ok(QuestionMutationResponse {
            question: Some(question),
            question_count,
        })
    }

    pub async fn delete_question(&self, claims: &Claims, id: &str) -> AppResult<QuestionMutationResponse> {
        let question = self.get_question(id).await?;
        let test = self.get_managed_test(claims, &question.test_id).await?;

        let question_count = self.question_repository.delete(&question.id, &test.id).await?;
        log::info!("Removed question {} from test {} ({} left)", question.id, test.id, question_count);

        Ok(QuestionMutationResponse {
            question: None,
            question_count,
        })
    }

    async fn get_question(&self, id: &str) -> AppResult<TestQuestion> {
        self.question_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question with id '{}' not found", id)))
    }

    /// Rewrites `question_count` from a count query. Failures are logged and leave the
    /// stored count untouched.
    pub async fn recalculate_question_count(&self, test_id: &str) -> Option<i64> {
        let result = async {
            let count = self.question_repository.count_by_test(test_id).await?;
            self.test_repository.set_question_count(test_id, count).await?;
            Ok::<_, AppError>(count)
        }
        .await;

        match result {
            Ok(count) => Some(count),
            Err(e) => {
                log::warn!("Failed to recalculate question count of test {}: {}", test_id, e);
                None
            }
        }
    }

    /// Staff-triggered recount; returns the test as stored afterwards.
    pub async fn recount(&self, claims: &Claims, test_id: &str) -> AppResult<Test> {
        let test = self.get_managed_test(claims, test_id).await?;
        self.recalculate_question_count(&test.id).await;
        self.get_test(&test.id).await
    }

    /// The student view: published tests only (managers may preview drafts), no answer key.
    pub async fn get_test_for_taking(&self, claims: &Claims, test_id: &str) -> AppResult<TestForTaking> {
        let test = self.get_test(test_id).await?;
        if ensure_test_manager(claims, &test).is_err() {
            if !test.published {
                return Err(AppError::NotFound(format!(
                    "Test with id '{}' not found",
                    test_id
                )));
            }
            require_approved(claims)?;
        }

        let questions = self.question_repository.find_by_test(&test.id).await?;
        Ok(TestForTaking::from_test(test, questions))
    }
}

fn ensure_valid_answer(question: &TestQuestion) -> AppResult<()> {
    if question.options.len() < 2 {
        return Err(AppError::ValidationError(
            "A question needs at least two options".to_string(),
        ));
    }
    if !question.has_valid_answer() {
        return Err(AppError::ValidationError(format!(
            "correct_answer must index one of the {} options",
            question.options.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::domain::{User, UserRole, UserStatus},
        repositories::{
            course_repository::MockCourseRepository, lesson_repository::MockLessonRepository,
            test_attempt_repository::MockTestAttemptRepository,
            test_question_repository::MockTestQuestionRepository,
            test_repository::MockTestRepository, user_repository::MockUserRepository,
        },
    };

    const DEFAULTS: TestDefaults = TestDefaults {
        passing_score: 80,
        max_attempts: 3,
    };

    struct Mocks {
        tests: MockTestRepository,
        questions: MockTestQuestionRepository,
        attempts: MockTestAttemptRepository,
        users: MockUserRepository,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                tests: MockTestRepository::new(),
                questions: MockTestQuestionRepository::new(),
                attempts: MockTestAttemptRepository::new(),
                users: MockUserRepository::new(),
            }
        }

        fn with_test(mut self, test: &Test) -> Self {
            let stored = test.clone();
            self.tests
                .expect_find_by_id()
                .returning(move |_| Ok(Some(stored.clone())));
            self
        }

        fn build(self) -> TestService {
            TestService::new(
                Arc::new(self.tests),
                Arc::new(self.questions),
                Arc::new(self.attempts),
                Arc::new(MockCourseRepository::new()),
                Arc::new(MockLessonRepository::new()),
                Arc::new(self.users),
                DEFAULTS,
            )
        }
    }

    fn author() -> (User, Claims) {
        let user = User::test_user("Ada", UserRole::Instructor, UserStatus::Approved);
        let claims = Claims::new(&user, 1);
        (user, claims)
    }

    fn question_request(correct_answer: i32) -> CreateQuestionRequest {
        CreateQuestionRequest {
            question_text: "Which document proves funds?".to_string(),
            options: vec!["Bank statement".into(), "Library card".into()],
            correct_answer,
            explanation: None,
            order_number: None,
        }
    }

    #[tokio::test]
    async fn create_test_applies_defaults() {
        let (user, claims) = author();
        let mut mocks = Mocks::new();
        mocks
            .users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        mocks.tests.expect_create().returning(|t| Ok(t));

        let test = mocks
            .build()
            .create_test(
                &claims,
                CreateTestRequest {
                    title: "Mock exam".to_string(),
                    description: None,
                    course_id: None,
                    lesson_id: None,
                    passing_score: None,
                    max_attempts: None,
                    time_limit_minutes: Some(30),
                },
            )
            .await
            .unwrap();

        assert_eq!(test.passing_score, 80);
        assert_eq!(test.max_attempts, 3);
        assert_eq!(test.created_by, claims.sub);
        assert_eq!(test.question_count, 0);
    }

    #[tokio::test]
    async fn add_question_reports_transactional_count() {
        let (_, claims) = author();
        let test = Test::new("Quiz", &claims.sub, 80, 3);

        let mut mocks = Mocks::new().with_test(&test);
        mocks.questions.expect_count_by_test().returning(|_| Ok(2));
        mocks
            .questions
            .expect_create()
            .withf(|q| q.order_number == 3)
            .times(1)
            .returning(|_| Ok(3));

        let response = mocks
            .build()
            .add_question(&claims, &test.id, question_request(0))
            .await
            .unwrap();

        assert_eq!(response.question_count, 3);
        assert!(response.question.is_some());
    }

    #[tokio::test]
    async fn add_question_rejects_out_of_range_answer() {
        let (_, claims) = author();
        let test = Test::new("Quiz", &claims.sub, 80, 3);

        let mut mocks = Mocks::new().with_test(&test);
        mocks.questions.expect_count_by_test().returning(|_| Ok(0));
        mocks.questions.expect_create().never();

        let result = mocks
            .build()
            .add_question(&claims, &test.id, question_request(2))
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn full_test_rejects_another_question() {
        let (_, claims) = author();
        let test = Test::new("Quiz", &claims.sub, 80, 3);

        let mut mocks = Mocks::new().with_test(&test);
        mocks
            .questions
            .expect_count_by_test()
            .returning(|_| Ok(MAX_QUESTIONS_PER_TEST));
        mocks.questions.expect_create().never();

        let result = mocks
            .build()
            .add_question(&claims, &test.id, question_request(0))
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn other_instructor_cannot_edit_questions() {
        let test = Test::new("Quiz", "someone-else", 80, 3);
        let (_, claims) = author();

        let mut mocks = Mocks::new().with_test(&test);
        mocks.questions.expect_create().never();

        let result = mocks
            .build()
            .add_question(&claims, &test.id, question_request(0))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn recount_failure_is_swallowed() {
        let mut mocks = Mocks::new();
        mocks.questions.expect_count_by_test().returning(|_| Ok(4));
        mocks
            .tests
            .expect_set_question_count()
            .returning(|_, _| Err(AppError::DatabaseError("write conflict".into())));

        assert_eq!(mocks.build().recalculate_question_count("test-1").await, None);
    }

    #[tokio::test]
    async fn empty_test_cannot_be_published() {
        let (_, claims) = author();
        let test = Test::new("Quiz", &claims.sub, 80, 3);

        let mut mocks = Mocks::new().with_test(&test);
        mocks.questions.expect_count_by_test().returning(|_| Ok(0));
        mocks.tests.expect_update().never();

        let result = mocks
            .build()
            .update_test(
                &claims,
                &test.id,
                UpdateTestRequest {
                    published: Some(true),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn draft_test_is_hidden_from_students() {
        let test = Test::new("Quiz", "inst-1", 80, 3);
        let student = User::test_user("Sam", UserRole::Student, UserStatus::Approved);

        let result = Mocks::new()
            .with_test(&test)
            .build()
            .get_test_for_taking(&Claims::new(&student, 1), &test.id)
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn pending_student_cannot_open_published_test() {
        let mut test = Test::new("Quiz", "inst-1", 80, 3);
        test.published = true;
        let student = User::test_user("Pat", UserRole::Student, UserStatus::Pending);

        let result = Mocks::new()
            .with_test(&test)
            .build()
            .get_test_for_taking(&Claims::new(&student, 1), &test.id)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
