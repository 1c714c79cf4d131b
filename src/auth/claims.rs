use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::{User, UserRole, UserStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn new(user: &User, expiration_hours: i64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours);

        Self {
            sub: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            status: user.status,
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,        // user id
    pub jti: String,        // makes every issued token (and its stored hash) unique
    pub token_type: String, // "refresh"
    pub exp: usize,
    pub iat: usize,
}

impl RefreshClaims {
    pub fn new(user_id: &str, expiration_hours: i64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours);

        Self {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            token_type: "refresh".to_string(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_carry_role_and_status() {
        let user = User::test_user("Jane", UserRole::Instructor, UserStatus::Approved);
        let claims = Claims::new(&user, 24);

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.name, "Jane");
        assert_eq!(claims.role, UserRole::Instructor);
        assert_eq!(claims.status, UserStatus::Approved);
        assert!(claims.is_staff());
        assert!(!claims.is_admin());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_claims_are_unique() {
        let a = RefreshClaims::new("user-1", 168);
        let b = RefreshClaims::new("user-1", 168);

        assert_eq!(a.token_type, "refresh");
        assert_ne!(a.jti, b.jti);
    }
}
