use std::sync::Arc;

use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{AuthenticatedUser, MaybeAuthenticatedUser},
    errors::AppError,
    models::dto::{
        request::{AnnouncementListParams, CreateAnnouncementRequest, UpdateAnnouncementRequest},
        response::ApiResponse,
    },
};

#[get("/api/announcements")]
pub async fn list_announcements(
    state: web::Data<Arc<AppState>>,
    query: web::Query<AnnouncementListParams>,
    viewer: MaybeAuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let page = state
        .announcement_service
        .list_announcements(query.into_inner(), viewer.0.as_ref())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

#[post("/api/announcements")]
pub async fn create_announcement(
    state: web::Data<Arc<AppState>>,
    request: web::Json<CreateAnnouncementRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let announcement = state
        .announcement_service
        .create_announcement(&auth.0, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(announcement)))
}

#[actix_web::put("/api/announcements/{id}")]
pub async fn update_announcement(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    request: web::Json<UpdateAnnouncementRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let announcement = state
        .announcement_service
        .update_announcement(&auth.0, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(announcement)))
}

#[actix_web::delete("/api/announcements/{id}")]
pub async fn delete_announcement(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    state
        .announcement_service
        .delete_announcement(&auth.0, &id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Announcement deleted")))
}
