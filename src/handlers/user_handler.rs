use std::sync::Arc;

use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_admin, AuthenticatedUser},
    errors::AppError,
    models::dto::{
        request::{ChangeRoleRequest, UpdateProfileRequest, UserListParams},
        response::{ApiResponse, UserDto},
    },
};

#[get("/api/users/me")]
pub async fn get_me(
    state: web::Data<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user = state.user_service.get_user(&auth.0.sub).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(UserDto::from(user))))
}

#[actix_web::put("/api/users/me")]
pub async fn update_me(
    state: web::Data<Arc<AppState>>,
    request: web::Json<UpdateProfileRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user = state
        .user_service
        .update_profile(&auth.0.sub, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(UserDto::from(user))))
}

#[get("/api/users")]
pub async fn list_users(
    state: web::Data<Arc<AppState>>,
    query: web::Query<UserListParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let page = state.user_service.list_users(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

#[post("/api/users/{id}/approve")]
pub async fn approve_user(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let user = state.user_service.approve_user(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(UserDto::from(user)).with_message("User approved")))
}

#[post("/api/users/{id}/suspend")]
pub async fn suspend_user(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let user = state.user_service.suspend_user(&id, &auth.0.sub).await?;
    // Outstanding sessions end with the suspension.
    state.auth_service.logout(&user.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(UserDto::from(user)).with_message("User suspended")))
}

#[post("/api/users/{id}/role")]
pub async fn change_role(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    request: web::Json<ChangeRoleRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let user = state
        .user_service
        .change_role(&id, request.into_inner().role, &auth.0.sub)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(UserDto::from(user))))
}
