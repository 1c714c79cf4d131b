use std::sync::Arc;

use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{
        request::{AttemptListParams, ReviewAttemptRequest, SubmitAnswersRequest},
        response::ApiResponse,
    },
};

// Registered before `get_attempt` so "me" is not taken for an id.
#[get("/api/attempts/me")]
pub async fn list_my_attempts(
    state: web::Data<Arc<AppState>>,
    query: web::Query<AttemptListParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let page = state
        .attempt_service
        .list_my_attempts(&auth.0, query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

#[get("/api/attempts/{id}")]
pub async fn get_attempt(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state.attempt_service.get_attempt(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(attempt)))
}

#[post("/api/attempts/{id}/submit")]
pub async fn submit_attempt(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    request: web::Json<SubmitAnswersRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state
        .attempt_service
        .submit_attempt(&auth.0, &id, request.into_inner())
        .await?;
    let message = if attempt.passed {
        "Test passed"
    } else {
        "Test not passed"
    };
    Ok(HttpResponse::Ok().json(ApiResponse::ok(attempt).with_message(message)))
}

#[post("/api/attempts/{id}/review")]
pub async fn review_attempt(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    request: web::Json<ReviewAttemptRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state
        .attempt_service
        .review_attempt(&auth.0, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(attempt)))
}
