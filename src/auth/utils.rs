use async_graphql::Context;

use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
    models::domain::UserStatus,
};

pub fn require_admin(claims: &Claims) -> AppResult<()> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can perform this action".to_string(),
        ));
    }
    Ok(())
}

/// Admins and instructors.
pub fn require_staff(claims: &Claims) -> AppResult<()> {
    if !claims.is_staff() {
        return Err(AppError::Forbidden(
            "Only instructors and admins can perform this action".to_string(),
        ));
    }
    Ok(())
}

pub fn require_owner_or_admin(claims: &Claims, resource_owner: &str) -> AppResult<()> {
    if !claims.is_admin() && claims.sub != resource_owner {
        return Err(AppError::Forbidden(
            "You can only access your own resources".to_string(),
        ));
    }
    Ok(())
}

/// Checks the status carried in the token. Services that change state re-check the
/// stored user, since a token can outlive an approval or suspension.
pub fn require_approved(claims: &Claims) -> AppResult<()> {
    if claims.status != UserStatus::Approved {
        return Err(AppError::Forbidden(
            "Your account is awaiting approval".to_string(),
        ));
    }
    Ok(())
}

pub fn extract_claims_from_context(ctx: &Context<'_>) -> AppResult<Claims> {
    ctx.data::<Claims>()
        .cloned()
        .map_err(|_| AppError::Unauthorized("Authentication required".to_string()))
}
