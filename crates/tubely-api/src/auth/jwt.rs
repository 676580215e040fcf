//! HS256 access tokens.

use crate::auth::models::JwtClaims;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tubely_core::AppError;
use uuid::Uuid;

/// Issuer stamped into and required on every access token.
pub const ACCESS_TOKEN_ISSUER: &str = "tubely-access";

#[derive(Clone)]
pub struct JwtValidator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_issuer(&[ACCESS_TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a token for `user_id` that expires after `ttl`.
    pub fn issue_token(&self, user_id: Uuid, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id,
            iss: ACCESS_TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Validate a bearer token and return the caller it was issued to.
    pub fn validate_token(&self, token: &str) -> Result<Uuid, AppError> {
        let token_data =
            decode::<JwtClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::Unauthenticated("Token has expired".to_string())
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                        AppError::Unauthenticated("Invalid token issuer".to_string())
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::Unauthenticated("Invalid token signature".to_string())
                    }
                    _ => AppError::Unauthenticated(format!("Invalid or expired token: {}", e)),
                }
            })?;

        Ok(token_data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_issue_and_validate() {
        let validator = JwtValidator::new(SECRET);
        let user_id = Uuid::new_v4();

        let token = validator.issue_token(user_id, Duration::hours(1)).unwrap();
        assert_eq!(validator.validate_token(&token).unwrap(), user_id);
    }

    #[test]
    fn test_expired_token_rejected() {
        let validator = JwtValidator::new(SECRET);
        let token = validator
            .issue_token(Uuid::new_v4(), Duration::hours(-1))
            .unwrap();

        let err = validator.validate_token(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(ref m) if m.contains("expired")));
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let issuer = JwtValidator::new("ffffffffffffffffffffffffffffffff");
        let validator = JwtValidator::new(SECRET);
        let token = issuer.issue_token(Uuid::new_v4(), Duration::hours(1)).unwrap();

        assert!(matches!(
            validator.validate_token(&token),
            Err(AppError::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let validator = JwtValidator::new(SECRET);
        assert!(matches!(
            validator.validate_token("not-a-jwt"),
            Err(AppError::Unauthenticated(_))
        ));
    }
}
