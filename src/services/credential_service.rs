use chrono::Utc;
use once_cell::sync::Lazy;
use serde::Deserialize;
use thiserror::Error;
use tokio::task;
use tracing::{error, info, warn};

use crate::auth::{
    hash_password, validate_password_format, validate_username_format, verify_password, HashError,
    IssuedToken, JwtError, TokenIssuer,
};
use crate::database::models::user::USERS;
use crate::database::models::{User, UserIdentity, UserRecord};
use crate::database::store::{to_document, Document};
use crate::database::{DatabaseError, Filter, SharedStore};

/// Verified against when the username is unknown so both failure paths cost the same.
static DUMMY_HASH: Lazy<String> = Lazy::new(|| hash_password("not-a-real-password").unwrap_or_default());

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Username already taken")]
    UsernameTaken,

    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Hashing(#[from] HashError),

    #[error("Password hashing task failed: {0}")]
    HashingTask(#[from] task::JoinError),

    #[error("Token error: {0}")]
    Token(String),

    #[error(transparent)]
    Store(DatabaseError),
}

impl From<DatabaseError> for AuthError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Conflict(_) => AuthError::UsernameTaken,
            other => AuthError::Store(other),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::InvalidToken => AuthError::InvalidToken,
            JwtError::TokenGeneration(msg) => AuthError::Token(msg),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Registers users, checks passwords, and mints/validates bearer tokens.
#[derive(Clone)]
pub struct CredentialService {
    store: SharedStore,
    tokens: TokenIssuer,
}

impl CredentialService {
    pub fn new(store: SharedStore, tokens: TokenIssuer) -> Self {
        Self { store, tokens }
    }

    /// Declare the username unique in the store. Run once at startup.
    pub async fn prepare(&self) -> Result<(), AuthError> {
        self.store.ensure_unique(USERS, "username").await?;
        Ok(())
    }

    pub async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        let username = required(registration.username, "username")?;
        let password = required(registration.password, "password")?;

        // Username surrounding whitespace is an input error, not something to trim away
        if username.trim() != username {
            return Err(AuthError::InvalidInput(
                "Username cannot start or end with whitespace".to_string(),
            ));
        }
        validate_username_format(&username).map_err(AuthError::InvalidInput)?;
        validate_password_format(&password).map_err(AuthError::InvalidInput)?;

        let record = UserRecord {
            username,
            password_hash: hash_off_runtime(password).await?,
            first_name: trimmed(registration.first_name),
            last_name: trimmed(registration.last_name),
            created_at: Utc::now(),
        };

        let stored = self.store.insert(USERS, to_document(&record)?).await?;
        let user: User = stored.decode::<UserRecord>()?.into();

        info!("Registered user {}", user.username);
        Ok(user)
    }

    /// Never reveals whether the username or the password was wrong.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<UserIdentity, AuthError> {
        let record = self.find_record(username).await?;

        let stored_hash = record.as_ref().map(|r| r.password_hash.clone());
        let matches = verify_off_runtime(password.to_string(), stored_hash).await;

        match record {
            Some(record) if matches => Ok(User::from(record).into()),
            _ => {
                warn!("Failed login attempt for username {:?}", username);
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    pub fn issue_token(&self, identity: &UserIdentity) -> Result<IssuedToken, AuthError> {
        Ok(self.tokens.issue(identity)?)
    }

    pub fn verify_token(&self, token: &str) -> Result<UserIdentity, AuthError> {
        Ok(self.tokens.verify(token)?)
    }

    pub async fn find_user(&self, username: &str) -> Result<User, AuthError> {
        self.find_record(username)
            .await?
            .map(User::from)
            .ok_or(AuthError::UserNotFound)
    }

    pub async fn update_profile(&self, username: &str, update: ProfileUpdate) -> Result<User, AuthError> {
        let mut set = Document::new();
        if let Some(first_name) = update.first_name {
            set.insert("firstName".to_string(), first_name.trim().into());
        }
        if let Some(last_name) = update.last_name {
            set.insert("lastName".to_string(), last_name.trim().into());
        }

        let stored = self
            .store
            .update_one(USERS, &Filter::new().eq("username", username), set)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(stored.decode::<UserRecord>()?.into())
    }

    pub async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validate_password_format(new_password).map_err(AuthError::InvalidInput)?;
        self.authenticate(username, current_password).await?;

        let mut set = Document::new();
        let hash = hash_off_runtime(new_password.to_string()).await?;
        set.insert("passwordHash".to_string(), hash.into());

        self.store
            .update_one(USERS, &Filter::new().eq("username", username), set)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        info!("Changed password for user {}", username);
        Ok(())
    }

    /// Remove the user document. Returns whether it existed.
    pub async fn delete_account(&self, username: &str) -> Result<bool, AuthError> {
        let removed = self
            .store
            .delete_one(USERS, &Filter::new().eq("username", username))
            .await?;

        if removed {
            info!("Deleted user {}", username);
        }
        Ok(removed)
    }

    async fn find_record(&self, username: &str) -> Result<Option<UserRecord>, AuthError> {
        match self
            .store
            .find_one(USERS, &Filter::new().eq("username", username))
            .await?
        {
            Some(stored) => Ok(Some(stored.decode()?)),
            None => Ok(None),
        }
    }
}

// Argon2 is CPU-bound; run it on the blocking pool so other requests keep moving.
async fn hash_off_runtime(password: String) -> Result<String, AuthError> {
    Ok(task::spawn_blocking(move || hash_password(&password)).await??)
}

/// Verify against `stored_hash`, or the dummy hash when there is no such user.
async fn verify_off_runtime(password: String, stored_hash: Option<String>) -> bool {
    let verified = task::spawn_blocking(move || {
        let hash = stored_hash.as_deref().unwrap_or(DUMMY_HASH.as_str());
        verify_password(&password, hash)
    })
    .await;

    verified.unwrap_or_else(|e| {
        error!("Password verification task failed: {}", e);
        false
    })
}

fn required(value: Option<String>, field: &str) -> Result<String, AuthError> {
    value.ok_or_else(|| AuthError::InvalidInput(format!("Missing `{}` in request body", field)))
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}
