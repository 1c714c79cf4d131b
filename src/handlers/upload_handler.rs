use std::sync::Arc;

use actix_web::{get, http::header, post, web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::{require_admin, require_staff, Claims, MaybeAuthenticatedUser},
    errors::AppError,
    models::dto::{
        request::UploadParams,
        response::{ApiResponse, UploadResponse},
    },
    services::Bucket,
};

/// Resumes come from the public careers form; everything else is staff content.
fn ensure_can_upload(bucket: Bucket, caller: Option<&Claims>) -> Result<(), AppError> {
    match (bucket, caller) {
        (Bucket::Resumes, _) => Ok(()),
        (_, Some(claims)) => require_staff(claims),
        (_, None) => Err(AppError::Unauthorized("Authentication required".to_string())),
    }
}

/// Thumbnails are public, certificates need a login, resumes are admin-only.
fn ensure_can_download(bucket: Bucket, caller: Option<&Claims>) -> Result<(), AppError> {
    match (bucket, caller) {
        (Bucket::Thumbnails, _) => Ok(()),
        (Bucket::Certificates, Some(_)) => Ok(()),
        (Bucket::Resumes, Some(claims)) => require_admin(claims),
        (_, None) => Err(AppError::Unauthorized("Authentication required".to_string())),
    }
}

#[post("/api/uploads/{bucket}")]
pub async fn upload_file(
    state: web::Data<Arc<AppState>>,
    req: HttpRequest,
    bucket: web::Path<String>,
    query: web::Query<UploadParams>,
    body: web::Bytes,
    caller: MaybeAuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let bucket: Bucket = bucket.parse()?;
    ensure_can_upload(bucket, caller.0.as_ref())?;

    let params = query.into_inner();
    params.validate()?;

    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let (path, url) = state
        .storage_service
        .upload(bucket, &params.file_name, body.to_vec(), &content_type)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(UploadResponse {
        bucket: bucket.as_str().to_string(),
        path,
        url,
    })))
}

#[get("/api/uploads/{bucket}/{path:.*}")]
pub async fn download_file(
    state: web::Data<Arc<AppState>>,
    path: web::Path<(String, String)>,
    caller: MaybeAuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (bucket, object) = path.into_inner();
    let bucket: Bucket = bucket.parse()?;
    ensure_can_download(bucket, caller.0.as_ref())?;

    let (bytes, content_type) = state.storage_service.download(bucket, &object).await?;
    Ok(HttpResponse::Ok()
        .content_type(content_type.unwrap_or_else(|| "application/octet-stream".to_string()))
        .body(bytes))
}

#[actix_web::delete("/api/uploads/{bucket}/{path:.*}")]
pub async fn delete_file(
    state: web::Data<Arc<AppState>>,
    path: web::Path<(String, String)>,
    caller: MaybeAuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (bucket, object) = path.into_inner();
    let bucket: Bucket = bucket.parse()?;
    let claims = caller
        .0
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
    require_admin(&claims)?;

    state.storage_service.delete(bucket, &object).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("File deleted")))
}
