//! Plain-text bodies for the notification emails. Each returns `(subject, body)`.

use crate::models::domain::{
    ContactSubmission, Course, Enrollment, ResumeSubmission, Test, TestAttempt, User,
};

pub fn new_registration(user: &User) -> (String, String) {
    (
        format!("New registration: {}", user.name),
        format!(
            "A new {} account is waiting for approval.\n\nName: {}\nEmail: {}\n",
            user.role.as_str(),
            user.name,
            user.email
        ),
    )
}

pub fn account_approved(user: &User) -> (String, String) {
    (
        "Your account has been approved".to_string(),
        format!(
            "Hello {},\n\nYour account is now active. You can sign in and start learning.\n",
            user.name
        ),
    )
}

pub fn certificate_requested(user: &User, course: &Course) -> (String, String) {
    (
        format!("Certificate request: {}", course.title),
        format!(
            "{} ({}) has requested a certificate for \"{}\".\n",
            user.name, user.email, course.title
        ),
    )
}

pub fn certificate_approved(user: &User, course: &Course, enrollment: &Enrollment) -> (String, String) {
    let mut body = format!(
        "Hello {},\n\nYour certificate for \"{}\" has been approved.\n",
        user.name, course.title
    );
    if let Some(url) = &enrollment.certificate_url {
        body.push_str(&format!("\nDownload it here: {}\n", url));
    }
    (format!("Certificate approved: {}", course.title), body)
}

pub fn certificate_rejected(user: &User, course: &Course, enrollment: &Enrollment) -> (String, String) {
    let mut body = format!(
        "Hello {},\n\nYour certificate request for \"{}\" was not approved.\n",
        user.name, course.title
    );
    if let Some(note) = &enrollment.certificate_note {
        body.push_str(&format!("\nNote from the reviewer: {}\n", note));
    }
    body.push_str("\nYou can submit a new request at any time.\n");
    (format!("Certificate request update: {}", course.title), body)
}

pub fn test_result(user: &User, test: &Test, attempt: &TestAttempt) -> (String, String) {
    let outcome = if attempt.passed { "passed" } else { "did not pass" };
    (
        format!("Your result for {}", test.title),
        format!(
            "Hello {},\n\nYou {} \"{}\" with {}/{} correct ({}%). The passing score is {}%.\n",
            user.name,
            outcome,
            test.title,
            attempt.score,
            attempt.total_questions,
            attempt.percentage,
            test.passing_score
        ),
    )
}

pub fn contact_submission(submission: &ContactSubmission) -> (String, String) {
    (
        format!("Contact form: {}", submission.subject),
        format!(
            "From: {} <{}>\nPhone: {}\n\n{}\n",
            submission.name,
            submission.email,
            submission.phone.as_deref().unwrap_or("-"),
            submission.message
        ),
    )
}

pub fn resume_submission(submission: &ResumeSubmission) -> (String, String) {
    (
        format!("New resume from {}", submission.name),
        format!(
            "Name: {}\nEmail: {}\nProgram: {}\nDestination: {}\nResume: {}\n",
            submission.name,
            submission.email,
            submission.desired_program.as_deref().unwrap_or("-"),
            submission.destination_country.as_deref().unwrap_or("-"),
            submission.resume_url
        ),
    )
}
