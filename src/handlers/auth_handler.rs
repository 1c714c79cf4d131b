use std::sync::Arc;

use actix_web::{post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_admin, AuthenticatedUser},
    errors::AppError,
    models::dto::{
        request::{LoginRequest, RefreshTokenRequest, RegisterRequest, RepairRegistrationRequest},
        response::ApiResponse,
    },
};

#[post("/api/auth/register")]
pub async fn register(
    state: web::Data<Arc<AppState>>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state.auth_service.register(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(response)))
}

#[post("/api/auth/login")]
pub async fn login(
    state: web::Data<Arc<AppState>>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state.auth_service.login(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(response)))
}

#[post("/api/auth/refresh")]
pub async fn refresh(
    state: web::Data<Arc<AppState>>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state
        .auth_service
        .refresh(&request.into_inner().refresh_token)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(response)))
}

#[post("/api/auth/logout")]
pub async fn logout(
    state: web::Data<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    state.auth_service.logout(&auth.0.sub).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Logged out")))
}

/// Admin tool for registrations left half-finished by an interrupted sign-up.
#[post("/api/auth/repair-registration")]
pub async fn repair_registration(
    state: web::Data<Arc<AppState>>,
    request: web::Json<RepairRegistrationRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let response = state
        .user_service
        .repair_registration(request.into_inner())
        .await?;
    log::info!(
        "Admin {} repaired registration of {} ({} fix(es))",
        auth.0.sub,
        response.user.email,
        response.fixes.len()
    );
    Ok(HttpResponse::Ok().json(ApiResponse::ok(response)))
}
