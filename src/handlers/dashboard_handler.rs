use std::sync::Arc;

use actix_web::{get, web, HttpResponse};

use crate::{
    app_state::AppState, auth::AuthenticatedUser, errors::AppError,
    models::dto::response::ApiResponse,
};

#[get("/api/dashboard/admin")]
pub async fn admin_dashboard(
    state: web::Data<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let stats = state.dashboard_service.admin_stats(&auth.0).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(stats)))
}

#[get("/api/dashboard/instructor")]
pub async fn instructor_dashboard(
    state: web::Data<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let stats = state.dashboard_service.instructor_stats(&auth.0).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(stats)))
}

#[get("/api/dashboard/student")]
pub async fn student_dashboard(
    state: web::Data<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let dashboard = state.dashboard_service.student_dashboard(&auth.0).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(dashboard)))
}
