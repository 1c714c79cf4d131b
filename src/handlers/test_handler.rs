use std::sync::Arc;

use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{
        request::{
            CreateQuestionRequest, CreateTestRequest, PaginationParams, SubmitAnswersRequest,
            TestListParams, UpdateQuestionRequest, UpdateTestRequest,
        },
        response::ApiResponse,
    },
};

#[get("/api/tests")]
pub async fn list_tests(
    state: web::Data<Arc<AppState>>,
    query: web::Query<TestListParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let page = state
        .test_service
        .list_tests(&auth.0, query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

#[post("/api/tests")]
pub async fn create_test(
    state: web::Data<Arc<AppState>>,
    request: web::Json<CreateTestRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let test = state
        .test_service
        .create_test(&auth.0, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(test)))
}

/// Full test with the answer key, for its managers.
#[get("/api/tests/{id}")]
pub async fn get_test(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let test = state
        .test_service
        .get_test_with_questions(&auth.0, &id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(test)))
}

#[get("/api/tests/{id}/take")]
pub async fn get_test_for_taking(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let test = state.test_service.get_test_for_taking(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(test)))
}

#[actix_web::put("/api/tests/{id}")]
pub async fn update_test(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    request: web::Json<UpdateTestRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let test = state
        .test_service
        .update_test(&auth.0, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(test)))
}

#[actix_web::delete("/api/tests/{id}")]
pub async fn delete_test(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    state.test_service.delete_test(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Test deleted")))
}

#[post("/api/tests/{id}/recount")]
pub async fn recount_questions(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let test = state.test_service.recount(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(test)))
}

#[get("/api/tests/{id}/questions")]
pub async fn list_questions(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let questions = state.test_service.list_questions(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(questions)))
}

#[post("/api/tests/{id}/questions")]
pub async fn add_question(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    request: web::Json<CreateQuestionRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .test_service
        .add_question(&auth.0, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(response)))
}

#[actix_web::put("/api/questions/{id}")]
pub async fn update_question(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    request: web::Json<UpdateQuestionRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .test_service
        .update_question(&auth.0, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(response)))
}

#[actix_web::delete("/api/questions/{id}")]
pub async fn delete_question(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let response = state.test_service.delete_question(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(response)))
}

#[post("/api/tests/{id}/attempts")]
pub async fn start_attempt(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state.attempt_service.start_attempt(&auth.0, &id).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(attempt)))
}

#[get("/api/tests/{id}/attempts")]
pub async fn list_test_attempts(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    query: web::Query<PaginationParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let page = state
        .attempt_service
        .list_test_attempts(&auth.0, &id, query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

/// Start-or-resume and submit in one call.
#[post("/api/tests/{id}/submit")]
pub async fn submit_for_test(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    request: web::Json<SubmitAnswersRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state
        .attempt_service
        .submit_for_test(&auth.0, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(attempt)))
}
