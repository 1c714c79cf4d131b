use std::sync::Arc;

use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{AuthenticatedUser, MaybeAuthenticatedUser},
    errors::AppError,
    models::dto::{
        request::{
            CourseListParams, CreateCourseRequest, CreateLessonRequest, PublishRequest,
            RateCourseRequest, ReorderLessonsRequest, UpdateCourseRequest, UpdateLessonRequest,
        },
        response::ApiResponse,
    },
};

#[get("/api/courses")]
pub async fn list_courses(
    state: web::Data<Arc<AppState>>,
    query: web::Query<CourseListParams>,
    viewer: MaybeAuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let page = state
        .course_service
        .list_courses(query.into_inner(), viewer.0.as_ref())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

#[get("/api/courses/slug/{slug}")]
pub async fn get_course_by_slug(
    state: web::Data<Arc<AppState>>,
    slug: web::Path<String>,
    viewer: MaybeAuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let course = state
        .course_service
        .get_visible_course_by_slug(&slug, viewer.0.as_ref())
        .await?;
    let detail = state
        .course_service
        .get_course_detail(&course.id, viewer.0.as_ref())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(detail)))
}

#[get("/api/courses/{id}")]
pub async fn get_course(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    viewer: MaybeAuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let detail = state
        .course_service
        .get_course_detail(&id, viewer.0.as_ref())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(detail)))
}

#[post("/api/courses")]
pub async fn create_course(
    state: web::Data<Arc<AppState>>,
    request: web::Json<CreateCourseRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let course = state
        .course_service
        .create_course(&auth.0, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(course)))
}

#[actix_web::put("/api/courses/{id}")]
pub async fn update_course(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    request: web::Json<UpdateCourseRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let course = state
        .course_service
        .update_course(&auth.0, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(course)))
}

#[post("/api/courses/{id}/publish")]
pub async fn publish_course(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    request: web::Json<PublishRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let course = state
        .course_service
        .set_published(&auth.0, &id, request.published)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(course)))
}

#[actix_web::delete("/api/courses/{id}")]
pub async fn delete_course(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    state.course_service.delete_course(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Course deleted")))
}

#[post("/api/courses/{id}/rate")]
pub async fn rate_course(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    request: web::Json<RateCourseRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let course = state
        .course_service
        .rate_course(&auth.0, &id, request.rating)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(course)))
}

#[get("/api/courses/{id}/lessons")]
pub async fn list_lessons(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    viewer: MaybeAuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let lessons = state
        .lesson_service
        .list_lessons(&id, viewer.0.as_ref())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(lessons)))
}

#[post("/api/courses/{id}/lessons")]
pub async fn create_lesson(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    request: web::Json<CreateLessonRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let lesson = state
        .lesson_service
        .create_lesson(&auth.0, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(lesson)))
}

#[actix_web::put("/api/courses/{id}/lessons/order")]
pub async fn reorder_lessons(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    request: web::Json<ReorderLessonsRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let lessons = state
        .lesson_service
        .reorder_lessons(&auth.0, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(lessons)))
}

#[actix_web::put("/api/lessons/{id}")]
pub async fn update_lesson(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    request: web::Json<UpdateLessonRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let lesson = state
        .lesson_service
        .update_lesson(&auth.0, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(lesson)))
}

#[actix_web::delete("/api/lessons/{id}")]
pub async fn delete_lesson(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    state.lesson_service.delete_lesson(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Lesson deleted")))
}
