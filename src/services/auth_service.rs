use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{password, JwtService},
    errors::{AppError, AppResult},
    models::{
        domain::{user::normalize_email, RefreshToken, User, UserRole, UserStatus},
        dto::{
            request::{LoginRequest, RegisterRequest},
            response::{AuthResponse, RefreshTokenResponse},
        },
    },
    repositories::{RefreshTokenRepository, UserRepository},
    services::{email_templates, NotificationService},
};

pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
    refresh_token_repository: Arc<dyn RefreshTokenRepository>,
    jwt_service: JwtService,
    notifications: NotificationService,
    admin_email: Option<String>,
}

impl AuthService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        refresh_token_repository: Arc<dyn RefreshTokenRepository>,
        jwt_service: JwtService,
        notifications: NotificationService,
        admin_email: Option<String>,
    ) -> Self {
        Self {
            user_repository,
            refresh_token_repository,
            jwt_service,
            notifications,
            admin_email: admin_email.map(|e| normalize_email(&e)),
        }
    }

    /// New accounts start pending, except the configured admin address which is
    /// registered as an approved admin.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        request.validate()?;

        let role = request.role.unwrap_or_default();
        if role == UserRole::Admin {
            return Err(AppError::BadRequest(
                "Admin accounts cannot be self-registered".to_string(),
            ));
        }

        let email = normalize_email(&request.email);
        if self.user_repository.find_by_email(&email).await?.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "User with email '{}' already exists",
                email
            )));
        }

        let password_hash = password::hash_password(&request.password)?;
        let mut user = User::new(&request.name, &email, &password_hash, role);
        user.phone = request.phone;

        let is_configured_admin = self.admin_email.as_deref() == Some(email.as_str());
        if is_configured_admin {
            user.role = UserRole::Admin;
            user.status = UserStatus::Approved;
        }

        let user = self.user_repository.create(user).await?;
        log::info!("Registered {} account {}", user.role.as_str(), user.id);

        if !is_configured_admin {
            let (subject, body) = email_templates::new_registration(&user);
            self.notifications.dispatch_to_admin(subject, body);
        }

        self.issue_tokens(user).await
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        request.validate()?;

        let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

        let user = self
            .user_repository
            .find_by_email(&request.email)
            .await?
            .ok_or_else(invalid)?;

        if !password::verify_password(&request.password, &user.password_hash)? {
            return Err(invalid());
        }

        if user.status == UserStatus::Suspended {
            return Err(AppError::Forbidden("Account is suspended".to_string()));
        }

        self.issue_tokens(user).await
    }

    /// Exchanges a refresh token for a new pair. The presented token is revoked.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<RefreshTokenResponse> {
        let claims = self.jwt_service.validate_refresh_token(refresh_token)?;
        let stored = self
            .refresh_token_repository
            .find_by_token_hash(&RefreshToken::digest(refresh_token))
            .await?
            .filter(|t| t.is_usable_by(&claims.sub))
            .ok_or_else(|| AppError::Unauthorized("Refresh token has been revoked".to_string()))?;

        if !self.refresh_token_repository.revoke_active(&stored.token_hash).await? {
            log::warn!("Refresh token for user {} was reused", stored.user_id);
            return Err(AppError::Unauthorized(
                "Refresh token has already been used".to_string(),
            ));
        }

        let user = self
            .user_repository
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| {
                AppError::Unauthorized("User associated with refresh token not found".to_string())
            })?;

        if user.status == UserStatus::Suspended {
            return Err(AppError::Forbidden("Account is suspended".to_string()));
        }

        let auth = self.issue_tokens(user).await?;
        log::info!("Token refreshed for user {}", claims.sub);

        Ok(RefreshTokenResponse {
            token: auth.token,
            refresh_token: auth.refresh_token,
        })
    }

    /// Revokes every refresh token of the user.
    pub async fn logout(&self, user_id: &str) -> AppResult<u64> {
        let revoked = self
            .refresh_token_repository
            .revoke_all_for_user(user_id)
            .await?;
        log::info!("Revoked {} refresh token(s) for user {}", revoked, user_id);
        Ok(revoked)
    }

    async fn issue_tokens(&self, user: User) -> AppResult<AuthResponse> {
        let token = self.jwt_service.create_token(&user)?;
        let refresh_token = self.jwt_service.create_refresh_token(&user.id)?;

        let ttl_hours = self.jwt_service.refresh_expiration_hours();
        self.refresh_token_repository
            .create(RefreshToken::issue(&user.id, &refresh_token, ttl_hours))
            .await?;

        Ok(AuthResponse {
            token,
            refresh_token,
            user: user.into(),
        })
    }
}
