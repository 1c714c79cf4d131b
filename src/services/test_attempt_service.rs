use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
    models::{
        domain::{AttemptStatus, Test, TestAttempt, User},
        dto::{
            request::{AttemptListParams, PaginationParams, ReviewAttemptRequest, SubmitAnswersRequest},
            response::PaginatedResponse,
        },
    },
    repositories::{
        AttemptFilter, TestAttemptRepository, TestQuestionRepository, TestRepository,
        UserRepository,
    },
    services::{
        email_templates,
        guards::{approved_user, ensure_test_manager},
        notification_service::EmailMessage,
        scoring::score_attempt,
        NotificationService,
    },
};

pub struct TestAttemptService {
    attempt_repository: Arc<dyn TestAttemptRepository>,
    test_repository: Arc<dyn TestRepository>,
    question_repository: Arc<dyn TestQuestionRepository>,
    user_repository: Arc<dyn UserRepository>,
    notifications: NotificationService,
}

impl TestAttemptService {
    pub fn new(
        attempt_repository: Arc<dyn TestAttemptRepository>,
        test_repository: Arc<dyn TestRepository>,
        question_repository: Arc<dyn TestQuestionRepository>,
        user_repository: Arc<dyn UserRepository>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            attempt_repository,
            test_repository,
            question_repository,
            user_repository,
            notifications,
        }
    }

    async fn get_test(&self, id: &str) -> AppResult<Test> {
        self.test_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test with id '{}' not found", id)))
    }

    async fn find_attempt(&self, id: &str) -> AppResult<TestAttempt> {
        self.attempt_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attempt with id '{}' not found", id)))
    }

    /// Resumes the caller's in-progress attempt or opens a new one within `max_attempts`.
    pub async fn start_attempt(&self, claims: &Claims, test_id: &str) -> AppResult<TestAttempt> {
        approved_user(self.user_repository.as_ref(), &claims.sub).await?;
        let test = self.get_test(test_id).await?;
        self.start_for(&claims.sub, &test).await
    }

    async fn start_for(&self, user_id: &str, test: &Test) -> AppResult<TestAttempt> {
        if !test.published {
            return Err(AppError::BadRequest(
                "This test is not open for attempts".to_string(),
            ));
        }

        if let Some(attempt) = self
            .attempt_repository
            .find_in_progress(user_id, &test.id)
            .await?
        {
            log::debug!("Resuming attempt {} of test {}", attempt.id, test.id);
            return Ok(attempt);
        }

        let used = self
            .attempt_repository
            .count_user_attempts(user_id, &test.id)
            .await?;
        if !test.allows_attempt(used) {
            return Err(AppError::BadRequest(format!(
                "Maximum number of attempts ({}) reached",
                test.max_attempts
            )));
        }

        let attempt = TestAttempt::start(user_id, &test.id, used as i32 + 1);
        let attempt = self.attempt_repository.create(attempt).await?;
        log::info!(
            "User {} started attempt #{} of test {}",
            user_id,
            attempt.attempt_number,
            test.id
        );
        Ok(attempt)
    }

    pub async fn submit_attempt(
        &self,
        claims: &Claims,
        attempt_id: &str,
        request: SubmitAnswersRequest,
    ) -> AppResult<TestAttempt> {
        request.validate()?;
        let attempt = self.find_attempt(attempt_id).await?;
        if attempt.user_id != claims.sub {
            return Err(AppError::Forbidden(
                "You can only submit your own attempts".to_string(),
            ));
        }
        let user = approved_user(self.user_repository.as_ref(), &claims.sub).await?;
        let test = self.get_test(&attempt.test_id).await?;

        self.grade(user, test, attempt, request.answers).await
    }

    /// Start-or-resume followed by submit, in one call.
    pub async fn submit_for_test(
        &self,
        claims: &Claims,
        test_id: &str,
        request: SubmitAnswersRequest,
    ) -> AppResult<TestAttempt> {
        request.validate()?;
        let user = approved_user(self.user_repository.as_ref(), &claims.sub).await?;
        let test = self.get_test(test_id).await?;
        let attempt = self.start_for(&user.id, &test).await?;

        self.grade(user, test, attempt, request.answers).await
    }

    async fn grade(
        &self,
        user: User,
        test: Test,
        mut attempt: TestAttempt,
        answers: Vec<Option<i32>>,
    ) -> AppResult<TestAttempt> {
        if attempt.is_completed() {
            return Err(AppError::BadRequest(
                "This attempt has already been submitted".to_string(),
            ));
        }

        let questions = self.question_repository.find_by_test(&test.id).await?;
        if questions.is_empty() {
            return Err(AppError::BadRequest("This test has no questions".to_string()));
        }

        let result = score_attempt(&questions, &answers, test.passing_score);
        attempt.answers = answers;
        attempt.score = result.score;
        attempt.total_questions = result.total_questions;
        attempt.percentage = result.percentage;
        attempt.passed = result.passed;
        attempt.status = AttemptStatus::Completed;
        attempt.completed_at = Some(Utc::now());

        let attempt = self.attempt_repository.update(attempt).await?;
        log::info!(
            "Attempt {} of test {} scored {}/{} ({}%, {})",
            attempt.id,
            test.id,
            attempt.score,
            attempt.total_questions,
            attempt.percentage,
            if attempt.passed { "passed" } else { "failed" }
        );

        let (subject, body) = email_templates::test_result(&user, &test, &attempt);
        self.notifications
            .dispatch(EmailMessage::new(&user.email, subject, body));

        Ok(attempt)
    }

    /// Completed attempts only change through review.
    pub async fn review_attempt(
        &self,
        claims: &Claims,
        attempt_id: &str,
        request: ReviewAttemptRequest,
    ) -> AppResult<TestAttempt> {
        request.validate()?;
        let mut attempt = self.find_attempt(attempt_id).await?;
        let test = self.get_test(&attempt.test_id).await?;
        ensure_test_manager(claims, &test)?;

        if !attempt.is_completed() {
            return Err(AppError::BadRequest(
                "Only completed attempts can be reviewed".to_string(),
            ));
        }

        attempt.reviewed = request.reviewed;
        attempt.review_notes = request.review_notes;
        attempt.reviewed_by = Some(claims.sub.clone());
        self.attempt_repository.update(attempt).await
    }

    /// Owners see their attempts; staff see attempts on tests they manage.
    pub async fn get_attempt(&self, claims: &Claims, attempt_id: &str) -> AppResult<TestAttempt> {
        let attempt = self.find_attempt(attempt_id).await?;
        if attempt.user_id == claims.sub {
            return Ok(attempt);
        }

        let test = self.get_test(&attempt.test_id).await?;
        ensure_test_manager(claims, &test)?;
        Ok(attempt)
    }

    pub async fn list_my_attempts(
        &self,
        claims: &Claims,
        params: AttemptListParams,
    ) -> AppResult<PaginatedResponse<TestAttempt>> {
        params.validate()?;
        let offset = params.offset.unwrap_or(0);
        let limit = params.limit.unwrap_or(20);

        let filter = AttemptFilter {
            user_id: Some(claims.sub.clone()),
            test_id: params.test_id,
        };
        let (attempts, total) = self.attempt_repository.list(filter, offset, limit).await?;
        Ok(PaginatedResponse::new(attempts, total, offset, limit))
    }

    pub async fn list_test_attempts(
        &self,
        claims: &Claims,
        test_id: &str,
        pagination: PaginationParams,
    ) -> AppResult<PaginatedResponse<TestAttempt>> {
        pagination.validate()?;
        let test = self.get_test(test_id).await?;
        ensure_test_manager(claims, &test)?;

        let (offset, limit) = (pagination.offset(), pagination.limit());
        let filter = AttemptFilter {
            user_id: None,
            test_id: Some(test.id),
        };
        let (attempts, total) = self.attempt_repository.list(filter, offset, limit).await?;
        Ok(PaginatedResponse::new(attempts, total, offset, limit))
    }

    pub async fn recent_attempts(&self, user_id: &str, limit: i64) -> AppResult<Vec<TestAttempt>> {
        let filter = AttemptFilter {
            user_id: Some(user_id.to_string()),
            test_id: None,
        };
        let (attempts, _) = self.attempt_repository.list(filter, 0, limit).await?;
        Ok(attempts)
    }
}
