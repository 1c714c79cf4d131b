use std::sync::Arc;

use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{user::normalize_email, User, UserRole, UserStatus},
        dto::{
            request::{RepairRegistrationRequest, UpdateProfileRequest, UserListParams},
            response::{PaginatedResponse, RepairRegistrationResponse, UserDto},
        },
    },
    repositories::{UserFilter, UserRepository},
    services::{email_templates, notification_service::EmailMessage, NotificationService},
};

pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    notifications: NotificationService,
    admin_email: Option<String>,
}

impl UserService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        notifications: NotificationService,
        admin_email: Option<String>,
    ) -> Self {
        Self {
            user_repository,
            notifications,
            admin_email: admin_email.map(|e| normalize_email(&e)),
        }
    }

    pub async fn get_user(&self, id: &str) -> AppResult<User> {
        self.user_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", id)))
    }

    /// The stored user behind a token, rejected once suspended.
    pub async fn get_active_user(&self, id: &str) -> AppResult<User> {
        let user = self.get_user(id).await?;
        if user.status == UserStatus::Suspended {
            return Err(AppError::Forbidden("Account is suspended".to_string()));
        }
        Ok(user)
    }

    /// Like [`get_active_user`](Self::get_active_user) but also requires approval.
    pub async fn get_approved_user(&self, id: &str) -> AppResult<User> {
        let user = self.get_user(id).await?;
        if !user.is_approved() {
            return Err(AppError::Forbidden(
                "Your account is awaiting approval".to_string(),
            ));
        }
        Ok(user)
    }

    pub async fn update_profile(&self, id: &str, request: UpdateProfileRequest) -> AppResult<User> {
        request.validate()?;

        let mut user = self.get_user(id).await?;
        if let Some(name) = request.name {
            user.name = name.trim().to_string();
        }
        if let Some(phone) = request.phone {
            user.phone = Some(phone);
        }
        if let Some(avatar_url) = request.avatar_url {
            user.avatar_url = Some(avatar_url);
        }
        user.touch();

        self.user_repository.update(user).await
    }

    pub async fn list_users(&self, params: UserListParams) -> AppResult<PaginatedResponse<UserDto>> {
        params.validate()?;

        let offset = params.offset.unwrap_or(0);
        let limit = params.limit.unwrap_or(20);
        let filter = UserFilter {
            role: params.role,
            status: params.status,
            search: params.search,
        };

        let (users, total) = self.user_repository.list(filter, offset, limit).await?;
        Ok(PaginatedResponse::new(users, total, offset, limit).map(UserDto::from))
    }

    /// pending | suspended → approved. The user is emailed.
    pub async fn approve_user(&self, id: &str) -> AppResult<User> {
        let mut user = self.get_user(id).await?;
        if user.is_approved() {
            return Err(AppError::BadRequest("User is already approved".to_string()));
        }

        user.status = UserStatus::Approved;
        user.touch();
        let user = self.user_repository.update(user).await?;

        log::info!("Approved user {}", user.id);
        let (subject, body) = email_templates::account_approved(&user);
        self.notifications
            .dispatch(EmailMessage::new(&user.email, subject, body));

        Ok(user)
    }

    pub async fn suspend_user(&self, id: &str, acting_admin_id: &str) -> AppResult<User> {
        if id == acting_admin_id {
            return Err(AppError::BadRequest(
                "You cannot suspend your own account".to_string(),
            ));
        }

        let mut user = self.get_user(id).await?;
        if user.status == UserStatus::Suspended {
            return Err(AppError::BadRequest("User is already suspended".to_string()));
        }

        user.status = UserStatus::Suspended;
        user.touch();
        log::info!("Suspending user {}", user.id);
        self.user_repository.update(user).await
    }

    pub async fn change_role(&self, id: &str, role: UserRole, acting_admin_id: &str) -> AppResult<User> {
        if id == acting_admin_id {
            return Err(AppError::BadRequest(
                "You cannot change your own role".to_string(),
            ));
        }

        let mut user = self.get_user(id).await?;
        user.role = role;
        user.touch();
        self.user_repository.update(user).await
    }

    /// Fixes a half-finished or inconsistent registration and reports what changed.
    pub async fn repair_registration(
        &self,
        request: RepairRegistrationRequest,
    ) -> AppResult<RepairRegistrationResponse> {
        request.validate()?;

        let email = normalize_email(&request.email);
        let mut user = self
            .user_repository
            .find_by_email(&email)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No registration found for '{}'", email))
            })?;

        let mut fixes = Vec::new();

        if user.email != email {
            user.email = email.clone();
            fixes.push("normalized email".to_string());
        }

        if user.name.trim().is_empty() {
            user.name = request
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
            fixes.push(format!("set name to '{}'", user.name));
        } else if user.name != user.name.trim() {
            user.name = user.name.trim().to_string();
            fixes.push("trimmed name".to_string());
        }

        if self.admin_email.as_deref() == Some(email.as_str()) {
            if user.role != UserRole::Admin {
                user.role = UserRole::Admin;
                fixes.push("promoted configured admin email to admin".to_string());
            }
            if user.status != UserStatus::Approved {
                user.status = UserStatus::Approved;
                fixes.push("approved configured admin account".to_string());
            }
        } else if let Some(role) = request.role {
            if user.role != role {
                user.role = role;
                fixes.push(format!("set role to {}", role.as_str()));
            }
        }

        if !fixes.is_empty() {
            user.touch();
            user = self.user_repository.update(user).await?;
            log::info!("Repaired registration for {}: {}", user.id, fixes.join(", "));
        }

        Ok(RepairRegistrationResponse {
            user: user.into(),
            fixes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::user_repository::MockUserRepository;
    use mockall::predicate::eq;

    fn service(repo: MockUserRepository) -> UserService {
        UserService::new(
            Arc::new(repo),
            NotificationService::disabled(),
            Some("Admin@EduHub.test".to_string()),
        )
    }

    #[tokio::test]
    async fn approve_moves_pending_user_to_approved() {
        let user = User::test_user("Jane", UserRole::Student, UserStatus::Pending);
        let id = user.id.clone();

        let mut repo = MockUserRepository::new();
        let stored = user.clone();
        repo.expect_find_by_id()
            .with(eq(id.clone()))
            .returning(move |_| Ok(Some(stored.clone())));
        repo.expect_update()
            .withf(|u| u.status == UserStatus::Approved)
            .returning(|u| Ok(u));

        let approved = service(repo).approve_user(&id).await.unwrap();
        assert_eq!(approved.status, UserStatus::Approved);
    }

    #[tokio::test]
    async fn approving_twice_is_rejected() {
        let user = User::test_user("Jane", UserRole::Student, UserStatus::Approved);
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        repo.expect_update().never();

        let result = service(repo).approve_user("any").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn admin_cannot_suspend_self() {
        let repo = MockUserRepository::new();
        let result = service(repo).suspend_user("admin-1", "admin-1").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn pending_user_is_not_approved_for_gated_actions() {
        let user = User::test_user("Jane", UserRole::Student, UserStatus::Pending);
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));

        let result = service(repo).get_approved_user("any").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn repair_fills_empty_name_and_promotes_admin_email() {
        let mut user = User::new("", "admin@eduhub.test", "hash", UserRole::Student);
        user.name = "   ".to_string();

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .with(eq("admin@eduhub.test"))
            .returning(move |_| Ok(Some(user.clone())));
        repo.expect_update().times(1).returning(|u| Ok(u));

        let response = service(repo)
            .repair_registration(RepairRegistrationRequest {
                email: "ADMIN@EduHub.test".to_string(),
                name: None,
                role: None,
            })
            .await
            .unwrap();

        assert_eq!(response.user.name, "admin");
        assert_eq!(response.user.role, UserRole::Admin);
        assert_eq!(response.user.status, UserStatus::Approved);
        assert_eq!(response.fixes.len(), 3);
    }

    #[tokio::test]
    async fn repair_of_consistent_user_changes_nothing() {
        let user = User::test_user("Jane", UserRole::Student, UserStatus::Pending);
        let email = user.email.clone();

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));
        repo.expect_update().never();

        let response = service(repo)
            .repair_registration(RepairRegistrationRequest {
                email,
                name: None,
                role: Some(UserRole::Student),
            })
            .await
            .unwrap();

        assert!(response.fixes.is_empty());
    }

    #[tokio::test]
    async fn repair_unknown_email_is_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));

        let result = service(repo)
            .repair_registration(RepairRegistrationRequest {
                email: "ghost@example.com".to_string(),
                name: None,
                role: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
