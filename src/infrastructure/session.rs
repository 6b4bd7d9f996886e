use crate::domain::Role;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to sign session token: {0}")]
    Signing(String),
    #[error("Invalid session token: {0}")]
    Invalid(String),
}

/// Claims carried by the session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

/// Verified identity extracted from a session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: Uuid,
    pub role: Role,
}

pub struct SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionTokens {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn issue(&self, user_id: Uuid, role: Role) -> Result<String, SessionError> {
        let exp = (Utc::now() + self.ttl).timestamp().max(0) as usize;
        let claims = SessionClaims {
            sub: user_id.to_string(),
            role: role.to_string(),
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| SessionError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<SessionIdentity, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let data = decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(|e| SessionError::Invalid(e.to_string()))?;

        let user_id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| SessionError::Invalid("subject is not a user id".to_string()))?;
        let role = Role::from_str(&data.claims.role)
            .map_err(|_| SessionError::Invalid(format!("unknown role {}", data.claims.role)))?;

        Ok(SessionIdentity { user_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_to_same_identity() {
        let tokens = SessionTokens::new("test-secret", 30);
        let user_id = Uuid::new_v4();

        let token = tokens.issue(user_id, Role::Admin).unwrap();
        let identity = tokens.verify(&token).unwrap();

        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.role, Role::Admin);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = SessionTokens::new("secret-a", 30);
        let verifier = SessionTokens::new("secret-b", 30);

        let token = issuer.issue(Uuid::new_v4(), Role::User).unwrap();
        assert!(matches!(verifier.verify(&token), Err(SessionError::Invalid(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = SessionTokens::new("test-secret", -10);
        let token = tokens.issue(Uuid::new_v4(), Role::User).unwrap();
        assert!(tokens.verify(&token).is_err());
    }
}
