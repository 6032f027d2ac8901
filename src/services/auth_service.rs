//! Account registration and login

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};
use tracing::{info, warn};
use validator::Validate;

use super::{take, ServiceError};
use crate::auth::{hash_password, verify_password, TokenService};
use crate::database::models::{Document, User, UserSummary};
use crate::database::{DatabaseError, Repository};
use crate::types::{ObjectId, RecordStatus, Role};
use crate::validation::{trimmed, validate_role};

pub const DUPLICATE_ACCOUNT: &str = "Username atau email sudah terdaftar";

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        required(message = "Username minimal 3 karakter"),
        length(min = 3, message = "Username minimal 3 karakter")
    )]
    pub username: Option<String>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(required(message = "Email tidak valid"), email(message = "Email tidak valid"))]
    pub email: Option<String>,

    #[validate(
        required(message = "Password minimal 6 karakter"),
        length(min = 6, message = "Password minimal 6 karakter")
    )]
    pub password: Option<String>,

    #[validate(required(message = "Role tidak valid"), custom(function = "validate_role", message = "Role tidak valid"))]
    pub role: Option<String>,

    pub nama_lengkap: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    /// Username or email.
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        required(message = "Username wajib diisi"),
        length(min = 1, message = "Username wajib diisi")
    )]
    pub username: Option<String>,

    #[validate(
        required(message = "Password wajib diisi"),
        length(min = 1, message = "Password wajib diisi")
    )]
    pub password: Option<String>,
}

/// Account summary plus a fresh session token.
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub user: UserSummary,
    pub token: String,
}

pub struct AuthService {
    users: Repository<User>,
    tokens: Arc<TokenService>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: Repository<User>, tokens: Arc<TokenService>, bcrypt_cost: u32) -> Self {
        Self {
            users,
            tokens,
            bcrypt_cost,
        }
    }

    pub async fn register(&self, input: RegisterInput) -> Result<AuthPayload, ServiceError> {
        let username = take(input.username);
        let email = take(input.email);
        let role: Role = take(input.role)
            .parse()
            .map_err(|_| ServiceError::invalid("role", "Role tidak valid"))?;

        info!("Registration attempt for username: {}", username);

        // 1. Username and email are both unique
        let existing = self
            .users
            .find_one(json!({ "$or": [{ "username": username }, { "email": email }] }))
            .await?;
        if existing.is_some() {
            warn!("Registration rejected, account exists: {}", username);
            return Err(ServiceError::AlreadyExists(DUPLICATE_ACCOUNT.to_string()));
        }

        // 2. Hash password and store the account
        let password = hash_password(&take(input.password), self.bcrypt_cost).await?;
        let now = Utc::now();
        let nama_lengkap = input
            .nama_lengkap
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| username.clone());

        let user = User {
            id: ObjectId::new(),
            username,
            email,
            password,
            role,
            nama_lengkap,
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
            last_login: None,
        };

        match self.users.create(&user).await {
            Ok(()) => {}
            Err(DatabaseError::Conflict(_)) => {
                warn!("Registration lost a race on a unique key: {}", user.username);
                return Err(ServiceError::AlreadyExists(DUPLICATE_ACCOUNT.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        // 3. Issue token
        let token = self.tokens.issue(&user.id.to_hex(), &user.username, user.role)?;
        info!("Registered {} as {}", user.username, user.role);

        Ok(AuthPayload {
            user: UserSummary::from(&user),
            token,
        })
    }

    /// Unknown account and wrong password fail identically.
    pub async fn login(&self, input: LoginInput) -> Result<AuthPayload, ServiceError> {
        let identifier = take(input.username);
        let password = take(input.password);

        let user = self
            .users
            .find_one(json!({ "$or": [{ "username": identifier }, { "email": identifier }] }))
            .await?;

        let Some(user) = user else {
            warn!("Login failed: unknown account {}", identifier);
            return Err(ServiceError::InvalidCredentials);
        };

        if !verify_password(&password, &user.password).await? {
            warn!("Login failed: wrong password for {}", identifier);
            return Err(ServiceError::InvalidCredentials);
        }

        let mut patch = Map::new();
        patch.insert("last_login".to_string(), serde_json::to_value(Utc::now()).map_err(DatabaseError::from)?);
        self.users.update_partial(&user.id.to_hex(), patch).await?;

        let token = self.tokens.issue(&user.id.to_hex(), &user.username, user.role)?;
        info!("Login successful for {}", user.username);

        Ok(AuthPayload {
            user: UserSummary::from(&user),
            token,
        })
    }

    /// Account behind a verified token.
    pub async fn current_user(&self, user_id: &str) -> Result<UserSummary, ServiceError> {
        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(User::NOT_FOUND.to_string()))?;
        Ok(UserSummary::from(&user))
    }
}
