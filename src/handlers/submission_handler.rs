use std::sync::Arc;

use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_admin, AuthenticatedUser},
    errors::AppError,
    models::dto::{
        request::{
            ContactListParams, ContactRequest, ResumeListParams, ResumeRequest,
            UpdateContactStatusRequest, UpdateResumeStatusRequest,
        },
        response::ApiResponse,
    },
};

#[post("/api/contact")]
pub async fn submit_contact(
    state: web::Data<Arc<AppState>>,
    request: web::Json<ContactRequest>,
) -> Result<HttpResponse, AppError> {
    let submission = state
        .submission_service
        .submit_contact(request.into_inner())
        .await?;
    Ok(HttpResponse::Created()
        .json(ApiResponse::ok(submission).with_message("Thank you, we will be in touch")))
}

#[post("/api/resumes")]
pub async fn submit_resume(
    state: web::Data<Arc<AppState>>,
    request: web::Json<ResumeRequest>,
) -> Result<HttpResponse, AppError> {
    let submission = state
        .submission_service
        .submit_resume(request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(submission).with_message("Resume received")))
}

#[get("/api/admin/contact")]
pub async fn list_contacts(
    state: web::Data<Arc<AppState>>,
    query: web::Query<ContactListParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;
    let page = state
        .submission_service
        .list_contacts(query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

#[get("/api/admin/contact/{id}")]
pub async fn get_contact(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;
    let submission = state.submission_service.get_contact(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(submission)))
}

#[actix_web::put("/api/admin/contact/{id}")]
pub async fn update_contact(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    request: web::Json<UpdateContactStatusRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;
    let submission = state
        .submission_service
        .update_contact(&id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(submission)))
}

#[actix_web::delete("/api/admin/contact/{id}")]
pub async fn delete_contact(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;
    state.submission_service.delete_contact(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Contact submission deleted")))
}

#[get("/api/admin/resumes")]
pub async fn list_resumes(
    state: web::Data<Arc<AppState>>,
    query: web::Query<ResumeListParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;
    let page = state
        .submission_service
        .list_resumes(query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

#[get("/api/admin/resumes/{id}")]
pub async fn get_resume(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;
    let submission = state.submission_service.get_resume(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(submission)))
}

#[actix_web::put("/api/admin/resumes/{id}")]
pub async fn update_resume(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    request: web::Json<UpdateResumeStatusRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;
    let submission = state
        .submission_service
        .update_resume(&id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(submission)))
}

#[actix_web::delete("/api/admin/resumes/{id}")]
pub async fn delete_resume(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;
    state.submission_service.delete_resume(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Resume submission deleted")))
}
