use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::error::DomainError;

pub const TOKEN_TTL_SECS: i64 = 3600;

/// HS256 signing material for bearer tokens whose subject is a user id.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    iat: i64,
    exp: i64,
}

impl JwtKeys {
    pub fn new(secret: String) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, DomainError> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            iat,
            exp: iat + TOKEN_TTL_SECS,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| DomainError::Internal(format!("token signing failed: {err}")))
    }

    /// Resolves a bearer token to its user id. Expired, tampered or
    /// malformed tokens are all `Unauthorized`.
    pub fn authenticate(&self, token: &str) -> Result<Uuid, DomainError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims.sub)
            .map_err(|err| {
                debug!(error = %err, "rejected bearer token");
                DomainError::Unauthorized
            })
    }
}

pub fn hash_password(password: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| DomainError::Internal(format!("password hashing failed: {err}")))
}

pub fn password_matches(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(error = %err, "stored password hash is unreadable");
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_authenticates_its_user() {
        let keys = JwtKeys::new("test-secret".into());
        let user_id = Uuid::new_v4();
        let token = keys.issue(user_id).unwrap();
        assert_eq!(keys.authenticate(&token).unwrap(), user_id);
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let token = JwtKeys::new("one".into()).issue(Uuid::new_v4()).unwrap();
        let err = JwtKeys::new("two".into()).authenticate(&token).unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let keys = JwtKeys::new("test-secret".into());
        assert!(keys.authenticate("not.a.token").is_err());
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("hunter22").unwrap();
        assert!(password_matches("hunter22", &hash));
        assert!(!password_matches("hunter23", &hash));
        assert!(!password_matches("hunter22", "plain-text"));
    }
}
