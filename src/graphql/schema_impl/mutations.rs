use async_graphql::{Context, Object, ID};

use crate::{
    app_state::AppState,
    auth::extract_claims_from_context,
    errors::AppResult,
    graphql::helpers::parse_id,
    models::{
        domain::{Enrollment, TestAttempt},
        dto::request::SubmitAnswersRequest,
    },
};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn enroll(&self, ctx: &Context<'_>, course_id: ID) -> AppResult<Enrollment> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;
        let course_id = parse_id(&course_id)?;

        state.enrollment_service.enroll(&claims, &course_id).await
    }

    async fn complete_lesson(
        &self,
        ctx: &Context<'_>,
        enrollment_id: ID,
        lesson_id: ID,
    ) -> AppResult<Enrollment> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;
        let enrollment_id = parse_id(&enrollment_id)?;
        let lesson_id = parse_id(&lesson_id)?;

        state
            .enrollment_service
            .complete_lesson(&claims, &enrollment_id, &lesson_id)
            .await
    }

    /// Starts (or resumes) an attempt and grades it in one step.
    async fn submit_test_attempt(
        &self,
        ctx: &Context<'_>,
        test_id: ID,
        answers: Vec<Option<i32>>,
    ) -> AppResult<TestAttempt> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;
        let test_id = parse_id(&test_id)?;

        state
            .attempt_service
            .submit_for_test(&claims, &test_id, SubmitAnswersRequest { answers })
            .await
    }

    async fn request_certificate(&self, ctx: &Context<'_>, enrollment_id: ID) -> AppResult<Enrollment> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;
        let enrollment_id = parse_id(&enrollment_id)?;

        state
            .enrollment_service
            .request_certificate(&claims, &enrollment_id)
            .await
    }
}
