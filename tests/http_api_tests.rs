mod common;

use std::sync::Arc;

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};

use common::{test_config, InMemoryDb};
use eduhub_server::{
    graphql::create_schema,
    handlers,
    models::domain::{Course, InstructorRef, UserRole, UserStatus},
};

macro_rules! init_app {
    ($db:expr) => {{
        let state = $db.app_state(test_config());
        let schema = create_schema(state.clone());
        let jwt = state.jwt_service.clone();
        test::init_service(
            App::new()
                .app_data(web::Data::new(Arc::new(state)))
                .app_data(web::Data::new(schema))
                .app_data(web::Data::new(jwt))
                .configure(handlers::configure),
        )
        .await
    }};
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

#[actix_web::test]
async fn test_register_then_fetch_profile() {
    let db = InMemoryDb::new();
    let app = init_app!(db);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "name": "Lena Learner",
            "email": "lena@eduhub.test",
            "password": "a long password"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["status"], "pending");
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/users/me")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["email"], "lena@eduhub.test");
    assert!(body["data"].get("password_hash").is_none());
}

#[actix_web::test]
async fn test_admin_routes_reject_anonymous_and_students() {
    let db = InMemoryDb::new();
    let (student, _) = db
        .seed_user("Sam Student", UserRole::Student, UserStatus::Approved)
        .await;
    let app = init_app!(db);

    let req = test::TestRequest::get().uri("/api/admin/contact").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let jwt = db.app_state(test_config()).jwt_service;
    let token = jwt.create_token(&student).unwrap();
    let req = test::TestRequest::get()
        .uri("/api/admin/contact")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_public_contact_form() {
    let db = InMemoryDb::new();
    let app = init_app!(db);

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .set_json(json!({
            "name": "Visitor",
            "email": "visitor@example.com",
            "subject": "Study abroad",
            "message": "Which programs start in spring?"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(db.store.contacts.read().await.len(), 1);

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .set_json(json!({
            "name": "Visitor",
            "email": "not-an-email",
            "subject": "Hi",
            "message": "Hello"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_graphql_lists_only_published_courses() {
    let db = InMemoryDb::new();
    let instructor = InstructorRef {
        id: "instructor-1".to_string(),
        name: "Ivy Instructor".to_string(),
    };
    let mut published = Course::new("Public Speaking", "public-speaking", "", instructor.clone());
    published.published = true;
    let draft = Course::new("Unreleased", "unreleased", "", instructor);
    {
        let mut courses = db.store.courses.write().await;
        courses.insert(published.id.clone(), published);
        courses.insert(draft.id.clone(), draft);
    }
    let app = init_app!(db);

    let req = test::TestRequest::post()
        .uri("/graphql")
        .set_json(json!({ "query": "{ courses { title slug } }" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let courses = body["data"]["courses"].as_array().unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["slug"], "public-speaking");
}

#[actix_web::test]
async fn test_graphql_me_requires_token() {
    let db = InMemoryDb::new();
    let app = init_app!(db);

    let req = test::TestRequest::post()
        .uri("/graphql")
        .set_json(json!({ "query": "{ me { email } }" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert!(body["errors"].as_array().is_some_and(|e| !e.is_empty()));
}

#[actix_web::test]
async fn test_upload_paths_cannot_leave_their_bucket() {
    let db = InMemoryDb::new();
    let app = init_app!(db);

    for uri in [
        "/api/uploads/thumbnails/../resumes/cv.pdf",
        "/api/uploads/thumbnails/..%2Fresumes%2Fcv.pdf",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[actix_web::test]
async fn test_admin_delete_is_confined_to_the_named_bucket() {
    let db = InMemoryDb::new();
    let (admin, _) = db
        .seed_user("Ada Admin", UserRole::Admin, UserStatus::Approved)
        .await;
    let app = init_app!(db);

    let token = db.app_state(test_config()).jwt_service.create_token(&admin).unwrap();
    let req = test::TestRequest::delete()
        .uri("/api/uploads/thumbnails/../certificates/cert.pdf")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
