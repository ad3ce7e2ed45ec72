use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{SecurityConfig, MAX_JWT_EXPIRY_HOURS};
use crate::database::models::UserIdentity;

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 50;
pub const MAX_PASSWORD_LENGTH: usize = 72;

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub iat: i64,
    pub exp: i64,
}

impl From<Claims> for UserIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.sub,
            first_name: claims.first_name,
            last_name: claims.last_name,
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid token")]
    InvalidToken,
}

#[derive(Debug, Error)]
#[error("Password hashing error: {0}")]
pub struct HashError(String);

/// A freshly minted bearer token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub auth_token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies bearer tokens with the server-held secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        // Clamped so an unvalidated config can never overflow the expiry arithmetic
        let hours = security.jwt_expiry_hours.min(MAX_JWT_EXPIRY_HOURS) as i64;
        Self::new(&security.jwt_secret, Duration::hours(hours))
    }

    pub fn issue(&self, identity: &UserIdentity) -> Result<IssuedToken, JwtError> {
        self.issue_at(identity, Utc::now())
    }

    pub(crate) fn issue_at(&self, identity: &UserIdentity, now: DateTime<Utc>) -> Result<IssuedToken, JwtError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| JwtError::TokenGeneration("token expiry out of range".to_string()))?;
        let claims = Claims {
            sub: identity.username.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))?;

        Ok(IssuedToken {
            auth_token: token,
            token_type: "Bearer",
            expires_at: Utc.timestamp_opt(claims.exp, 0).single().unwrap_or(expires_at),
        })
    }

    /// Check signature and expiry. Every failure collapses to `InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<UserIdentity, JwtError> {
        let mut validation = Validation::new(ALGORITHM);
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims.into())
            .map_err(|e| {
                tracing::debug!("Rejected bearer token: {}", e);
                JwtError::InvalidToken
            })
    }
}

/// Hash a password using argon2id with a random salt
pub fn hash_password(password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| HashError(e.to_string()))
}

/// Verify a password against a stored hash. A malformed hash never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!("Stored password hash is unreadable: {}", e);
            false
        }
    }
}

/// Usernames double as recipe path segments, so they must never look like an id.
pub fn validate_username_format(username: &str) -> Result<(), String> {
    if username.len() < MIN_USERNAME_LENGTH {
        return Err(format!("Username must be at least {} characters", MIN_USERNAME_LENGTH));
    }

    if username.len() > MAX_USERNAME_LENGTH {
        return Err(format!("Username must be at most {} characters", MAX_USERNAME_LENGTH));
    }

    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err("Username can only contain letters, numbers, underscore, and hyphen".to_string());
    }

    if !username.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return Err("Username must start with a letter or number".to_string());
    }

    if Uuid::parse_str(username).is_ok() {
        return Err("Username must not be formatted like a recipe id".to_string());
    }

    Ok(())
}

pub fn validate_password_format(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password cannot be empty".to_string());
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(format!("Password must be at most {} characters", MAX_PASSWORD_LENGTH));
    }

    if password.trim() != password {
        return Err("Password cannot start or end with whitespace".to_string());
    }

    Ok(())
}
