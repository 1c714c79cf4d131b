use async_graphql::{Context, Object, ID};

use crate::{
    app_state::AppState,
    auth::extract_claims_from_context,
    errors::AppResult,
    graphql::helpers::{pagination, parse_id, viewer},
    models::{
        domain::{Announcement, Course, Enrollment, Lesson, TestAttempt},
        dto::{
            request::{AnnouncementListParams, AttemptListParams, CourseListParams},
            response::{TestForTaking, UserDto},
        },
    },
};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn me(&self, ctx: &Context<'_>) -> AppResult<UserDto> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        let user = state.user_service.get_user(&claims.sub).await?;
        Ok(user.into())
    }

    /// Published catalogue; staff also see the drafts they manage.
    async fn courses(
        &self,
        ctx: &Context<'_>,
        filter: Option<CourseListParams>,
    ) -> AppResult<Vec<Course>> {
        let state = ctx.data::<AppState>()?;

        let page = state
            .course_service
            .list_courses(filter.unwrap_or_default(), viewer(ctx))
            .await?;
        Ok(page.items)
    }

    async fn course(&self, ctx: &Context<'_>, id: ID) -> AppResult<Course> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id)?;

        state.course_service.get_visible_course(&id, viewer(ctx)).await
    }

    async fn course_by_slug(&self, ctx: &Context<'_>, slug: String) -> AppResult<Course> {
        let state = ctx.data::<AppState>()?;

        state
            .course_service
            .get_visible_course_by_slug(&slug, viewer(ctx))
            .await
    }

    async fn lessons(&self, ctx: &Context<'_>, course_id: ID) -> AppResult<Vec<Lesson>> {
        let state = ctx.data::<AppState>()?;
        let course_id = parse_id(&course_id)?;

        state.lesson_service.list_lessons(&course_id, viewer(ctx)).await
    }

    async fn announcements(
        &self,
        ctx: &Context<'_>,
        course_id: Option<ID>,
        offset: Option<i64>,
        limit: Option<i64>,
    ) -> AppResult<Vec<Announcement>> {
        let state = ctx.data::<AppState>()?;
        let course_id = course_id.as_ref().map(parse_id).transpose()?;
        let page = pagination(offset, limit);

        let params = AnnouncementListParams {
            course_id,
            include_unpublished: None,
            offset: page.offset,
            limit: page.limit,
        };
        let page = state
            .announcement_service
            .list_announcements(params, viewer(ctx))
            .await?;
        Ok(page.items)
    }

    async fn test_for_taking(&self, ctx: &Context<'_>, id: ID) -> AppResult<TestForTaking> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;
        let id = parse_id(&id)?;

        state.test_service.get_test_for_taking(&claims, &id).await
    }

    async fn my_enrollments(
        &self,
        ctx: &Context<'_>,
        offset: Option<i64>,
        limit: Option<i64>,
    ) -> AppResult<Vec<Enrollment>> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;

        let page = state
            .enrollment_service
            .list_my_enrollments(&claims, pagination(offset, limit))
            .await?;
        Ok(page.items)
    }

    async fn my_attempts(
        &self,
        ctx: &Context<'_>,
        test_id: Option<ID>,
        offset: Option<i64>,
        limit: Option<i64>,
    ) -> AppResult<Vec<TestAttempt>> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx)?;
        let test_id = test_id.as_ref().map(parse_id).transpose()?;
        let page = pagination(offset, limit);

        let params = AttemptListParams {
            test_id,
            offset: page.offset,
            limit: page.limit,
        };
        let page = state
            .attempt_service
            .list_my_attempts(&claims, params)
            .await?;
        Ok(page.items)
    }
}
