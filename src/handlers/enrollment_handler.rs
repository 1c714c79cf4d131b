use std::sync::Arc;

use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{
        request::{CertificateDecisionRequest, PaginationParams, SetProgressRequest},
        response::ApiResponse,
    },
};

#[post("/api/courses/{id}/enroll")]
pub async fn enroll(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let enrollment = state.enrollment_service.enroll(&auth.0, &id).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(enrollment).with_message("Enrolled")))
}

#[get("/api/courses/{id}/enrollments")]
pub async fn list_course_enrollments(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    query: web::Query<PaginationParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let page = state
        .enrollment_service
        .list_course_enrollments(&auth.0, &id, query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

#[get("/api/enrollments/me")]
pub async fn list_my_enrollments(
    state: web::Data<Arc<AppState>>,
    query: web::Query<PaginationParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let page = state
        .enrollment_service
        .list_my_enrollments(&auth.0, query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

#[actix_web::delete("/api/enrollments/{id}")]
pub async fn unenroll(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    state.enrollment_service.unenroll(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Enrollment removed")))
}

#[post("/api/enrollments/{id}/lessons/{lesson_id}/complete")]
pub async fn complete_lesson(
    state: web::Data<Arc<AppState>>,
    path: web::Path<(String, String)>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (enrollment_id, lesson_id) = path.into_inner();
    let enrollment = state
        .enrollment_service
        .complete_lesson(&auth.0, &enrollment_id, &lesson_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(enrollment)))
}

#[post("/api/enrollments/{id}/progress")]
pub async fn set_progress(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    request: web::Json<SetProgressRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let enrollment = state
        .enrollment_service
        .set_progress(&auth.0, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(enrollment)))
}

#[post("/api/enrollments/{id}/certificate/request")]
pub async fn request_certificate(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let enrollment = state
        .enrollment_service
        .request_certificate(&auth.0, &id)
        .await?;
    Ok(HttpResponse::Ok()
        .json(ApiResponse::ok(enrollment).with_message("Certificate requested")))
}

#[post("/api/enrollments/{id}/certificate/approve")]
pub async fn approve_certificate(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    request: Option<web::Json<CertificateDecisionRequest>>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let request = request.map(web::Json::into_inner).unwrap_or_default();
    let enrollment = state
        .enrollment_service
        .approve_certificate(&auth.0, &id, request)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(enrollment).with_message("Certificate approved")))
}

#[post("/api/enrollments/{id}/certificate/reject")]
pub async fn reject_certificate(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    request: Option<web::Json<CertificateDecisionRequest>>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let request = request.map(web::Json::into_inner).unwrap_or_default();
    let enrollment = state
        .enrollment_service
        .reject_certificate(&auth.0, &id, request)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(enrollment).with_message("Certificate rejected")))
}

#[get("/api/certificates/requests")]
pub async fn list_certificate_requests(
    state: web::Data<Arc<AppState>>,
    query: web::Query<PaginationParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let page = state
        .enrollment_service
        .list_pending_certificates(&auth.0, query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}
