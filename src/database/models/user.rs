use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Document;
use crate::types::{ObjectId, RecordStatus, Role};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: ObjectId,
    pub username: String,
    pub email: String,
    /// bcrypt hash; never leaves the server.
    pub password: String,
    pub role: Role,
    pub nama_lengkap: String,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl Document for User {
    const COLLECTION: &'static str = "users";
    const NOT_FOUND: &'static str = "User tidak ditemukan";
}

/// Public view of an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: ObjectId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub nama_lengkap: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            nama_lengkap: user.nama_lengkap.clone(),
        }
    }
}
