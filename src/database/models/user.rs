use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const USERS: &str = "users";

/// User document as persisted; carries the password hash and never leaves the service layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            username: record.username,
            first_name: record.first_name,
            last_name: record.last_name,
        }
    }
}

/// Who a request is acting as, once credentials or a token have been verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for UserIdentity {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}
