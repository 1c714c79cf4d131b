use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// A refresh token as the server remembers it. The raw token goes back to the
/// client; only its SHA-256 digest is kept, so a leaked collection cannot be replayed.
///
/// Tokens are single use: rotation flips `revoked` before a new pair is issued.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RefreshToken {
    pub id: String,
    pub user_id: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub revoked: bool,
}

impl RefreshToken {
    /// Records `raw` as issued to `user_id` for the next `ttl_hours`.
    pub fn issue(user_id: &str, raw: &str, ttl_hours: i64) -> Self {
        let created_at = Utc::now();
        RefreshToken {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            token_hash: Self::digest(raw),
            expires_at: created_at + Duration::hours(ttl_hours),
            created_at,
            revoked: false,
        }
    }

    /// Lower-case hex SHA-256, the form stored in `token_hash`.
    pub fn digest(raw: &str) -> String {
        format!("{:x}", Sha256::digest(raw.as_bytes()))
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Whether `user_id` may still rotate this token.
    pub fn is_usable_by(&self, user_id: &str) -> bool {
        self.user_id == user_id && !self.revoked && !self.is_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_stores_digest_not_raw_value() {
        let token = RefreshToken::issue("learner-1", "raw-refresh", 168);

        assert_ne!(token.token_hash, "raw-refresh");
        assert_eq!(token.token_hash, RefreshToken::digest("raw-refresh"));
        assert_eq!(token.expires_at - token.created_at, Duration::hours(168));
        assert!(token.is_usable_by("learner-1"));
    }

    #[test]
    fn only_the_owner_can_rotate() {
        let token = RefreshToken::issue("learner-1", "raw-refresh", 1);
        assert!(!token.is_usable_by("learner-2"));
    }

    #[test]
    fn expired_or_revoked_tokens_are_spent() {
        let expired = RefreshToken::issue("learner-1", "raw-refresh", -1);
        assert!(expired.is_expired());
        assert!(!expired.is_usable_by("learner-1"));

        let mut revoked = RefreshToken::issue("learner-1", "raw-refresh", 1);
        revoked.revoked = true;
        assert!(!revoked.is_usable_by("learner-1"));
    }

    #[test]
    fn digest_is_hex_sha256() {
        assert_eq!(
            RefreshToken::digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
