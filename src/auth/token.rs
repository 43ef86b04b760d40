use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::models::{AuthenticatedUser, Claims};
use crate::error::AppError;

/// Signs and verifies HS256 session tokens.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue a token for `user` expiring after the configured lifetime.
    pub fn issue(&self, user: &AuthenticatedUser) -> Result<String, AppError> {
        let claims = Claims {
            sub: user.user_id,
            username: user.username.clone(),
            role: user.role,
            exp: (Utc::now() + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verify signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected session token");
                AppError::Auth("Invalid or expired token".into())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;
    use base64::Engine;

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: 42,
            username: "editor".into(),
            role: Role::Editor,
        }
    }

    #[test]
    fn test_issue_token_structure() {
        let keys = TokenKeys::new("a-very-long-test-secret", 1);
        let token = keys.issue(&user()).unwrap();

        // JWT has 3 parts separated by dots
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);

        let payload_bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(parts[1])
            .unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&payload_bytes).unwrap();

        assert_eq!(payload["sub"], 42);
        assert_eq!(payload["username"], "editor");
        assert_eq!(payload["role"], "editor");
        assert!(payload["exp"].as_i64().unwrap() > Utc::now().timestamp());
    }

    #[test]
    fn test_verify_roundtrip() {
        let keys = TokenKeys::new("a-very-long-test-secret", 1);
        let token = keys.issue(&user()).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(AuthenticatedUser::from(claims), user());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = TokenKeys::new("a-very-long-test-secret", 1)
            .issue(&user())
            .unwrap();
        let err = TokenKeys::new("another-long-test-secret", 1)
            .verify(&token)
            .unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let keys = TokenKeys::new("a-very-long-test-secret", -2);
        let token = keys.issue(&user()).unwrap();
        assert!(matches!(keys.verify(&token), Err(AppError::Auth(_))));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let keys = TokenKeys::new("a-very-long-test-secret", 1);
        assert!(keys.verify("not.a.token").is_err());
    }
}
