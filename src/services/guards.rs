//! Access checks shared by the content services.

use crate::{
    auth::{require_staff, Claims},
    errors::{AppError, AppResult},
    models::domain::{Course, Test, User},
    repositories::UserRepository,
};

/// Loads the stored user and requires the approved status.
pub async fn approved_user(users: &dyn UserRepository, id: &str) -> AppResult<User> {
    let user = users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;

    if !user.is_approved() {
        return Err(AppError::Forbidden(
            "Your account is awaiting approval".to_string(),
        ));
    }
    Ok(user)
}

/// Staff allowed to author content: admins, and instructors whose account is approved.
pub async fn require_author(users: &dyn UserRepository, claims: &Claims) -> AppResult<()> {
    require_staff(claims)?;
    if !claims.is_admin() {
        approved_user(users, &claims.sub).await?;
    }
    Ok(())
}

pub fn ensure_course_manager(claims: &Claims, course: &Course) -> AppResult<()> {
    if claims.is_admin() || (claims.is_staff() && course.is_owned_by(&claims.sub)) {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "Only the course instructor or an admin can manage this course".to_string(),
    ))
}

pub fn ensure_test_manager(claims: &Claims, test: &Test) -> AppResult<()> {
    if claims.is_admin() || (claims.is_staff() && test.created_by == claims.sub) {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "Only the test author or an admin can manage this test".to_string(),
    ))
}

/// Published courses are public; drafts are visible to their managers.
pub fn can_view_course(viewer: Option<&Claims>, course: &Course) -> bool {
    course.published || viewer.is_some_and(|c| ensure_course_manager(c, course).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::{InstructorRef, UserRole, UserStatus};

    fn claims(id: &str, role: UserRole) -> Claims {
        Claims {
            sub: id.to_string(),
            email: format!("{}@example.com", id),
            name: id.to_string(),
            role,
            status: UserStatus::Approved,
            iat: 0,
            exp: 9999999999,
        }
    }

    fn draft_course() -> Course {
        Course::new(
            "Draft",
            "draft",
            "",
            InstructorRef {
                id: "inst-1".into(),
                name: "Ada".into(),
            },
        )
    }

    #[test]
    fn owner_and_admin_manage_course() {
        let course = draft_course();

        assert!(ensure_course_manager(&claims("inst-1", UserRole::Instructor), &course).is_ok());
        assert!(ensure_course_manager(&claims("admin", UserRole::Admin), &course).is_ok());
        assert!(ensure_course_manager(&claims("inst-2", UserRole::Instructor), &course).is_err());
        // A student id that happens to match still is not staff.
        assert!(ensure_course_manager(&claims("inst-1", UserRole::Student), &course).is_err());
    }

    #[test]
    fn drafts_are_hidden_from_the_public() {
        let mut course = draft_course();
        let student = claims("stu-1", UserRole::Student);

        assert!(!can_view_course(None, &course));
        assert!(!can_view_course(Some(&student), &course));
        assert!(can_view_course(Some(&claims("inst-1", UserRole::Instructor)), &course));

        course.published = true;
        assert!(can_view_course(None, &course));
    }
}
