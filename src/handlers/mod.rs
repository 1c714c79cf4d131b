pub mod announcement_handler;
pub mod attempt_handler;
pub mod auth_handler;
pub mod course_handler;
pub mod dashboard_handler;
pub mod enrollment_handler;
pub mod graphql_handler;
pub mod health_handler;
pub mod submission_handler;
pub mod test_handler;
pub mod upload_handler;
pub mod user_handler;

use actix_web::web;

/// Registers every route. Literal segments (`me`, `slug`) go before `{id}` matches.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_handler::health_check)
        .service(health_handler::health_check_live)
        .service(health_handler::health_check_ready)
        .service(graphql_handler::graphql)
        .service(graphql_handler::graphiql)
        // auth
        .service(auth_handler::register)
        .service(auth_handler::login)
        .service(auth_handler::refresh)
        .service(auth_handler::logout)
        .service(auth_handler::repair_registration)
        // users
        .service(user_handler::get_me)
        .service(user_handler::update_me)
        .service(user_handler::list_users)
        .service(user_handler::approve_user)
        .service(user_handler::suspend_user)
        .service(user_handler::change_role)
        // courses & lessons
        .service(course_handler::list_courses)
        .service(course_handler::get_course_by_slug)
        .service(course_handler::get_course)
        .service(course_handler::create_course)
        .service(course_handler::update_course)
        .service(course_handler::publish_course)
        .service(course_handler::delete_course)
        .service(course_handler::rate_course)
        .service(course_handler::list_lessons)
        .service(course_handler::create_lesson)
        .service(course_handler::reorder_lessons)
        .service(course_handler::update_lesson)
        .service(course_handler::delete_lesson)
        // tests & questions
        .service(test_handler::list_tests)
        .service(test_handler::create_test)
        .service(test_handler::get_test)
        .service(test_handler::get_test_for_taking)
        .service(test_handler::update_test)
        .service(test_handler::delete_test)
        .service(test_handler::recount_questions)
        .service(test_handler::list_questions)
        .service(test_handler::add_question)
        .service(test_handler::update_question)
        .service(test_handler::delete_question)
        .service(test_handler::start_attempt)
        .service(test_handler::list_test_attempts)
        .service(test_handler::submit_for_test)
        // attempts
        .service(attempt_handler::list_my_attempts)
        .service(attempt_handler::get_attempt)
        .service(attempt_handler::submit_attempt)
        .service(attempt_handler::review_attempt)
        // enrollments & certificates
        .service(enrollment_handler::enroll)
        .service(enrollment_handler::list_course_enrollments)
        .service(enrollment_handler::list_my_enrollments)
        .service(enrollment_handler::unenroll)
        .service(enrollment_handler::complete_lesson)
        .service(enrollment_handler::set_progress)
        .service(enrollment_handler::request_certificate)
        .service(enrollment_handler::approve_certificate)
        .service(enrollment_handler::reject_certificate)
        .service(enrollment_handler::list_certificate_requests)
        // announcements
        .service(announcement_handler::list_announcements)
        .service(announcement_handler::create_announcement)
        .service(announcement_handler::update_announcement)
        .service(announcement_handler::delete_announcement)
        // submissions
        .service(submission_handler::submit_contact)
        .service(submission_handler::submit_resume)
        .service(submission_handler::list_contacts)
        .service(submission_handler::get_contact)
        .service(submission_handler::update_contact)
        .service(submission_handler::delete_contact)
        .service(submission_handler::list_resumes)
        .service(submission_handler::get_resume)
        .service(submission_handler::update_resume)
        .service(submission_handler::delete_resume)
        // uploads
        .service(upload_handler::upload_file)
        .service(upload_handler::download_file)
        .service(upload_handler::delete_file)
        // dashboards
        .service(dashboard_handler::admin_dashboard)
        .service(dashboard_handler::instructor_dashboard)
        .service(dashboard_handler::student_dashboard);
}
