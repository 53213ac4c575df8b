//! Authentication service: application-layer orchestration
//!
//! HTTP handlers are thin wrappers that delegate to this service.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AdminConfig;
use crate::domain::{DomainError, DomainResult, RepositoryProvider, User, UserRole};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::password::{hash_password, verify_password};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Result of checking an email/password pair
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    Authenticated(User),
    InvalidCredentials,
    Disabled,
}

/// Token returned after a successful login or signup
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

pub struct AuthService {
    repos: Arc<dyn RepositoryProvider>,
    jwt_config: JwtConfig,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, jwt_config: JwtConfig, bcrypt_cost: u32) -> Self {
        Self {
            repos,
            jwt_config,
            bcrypt_cost,
        }
    }

    pub fn jwt_config(&self) -> &JwtConfig {
        &self.jwt_config
    }

    // ── Authentication ──────────────────────────────────────────

    pub async fn verify_credentials(&self, email: &str, password: &str) -> DomainResult<AuthOutcome> {
        let Some(user) = self.repos.users().find_by_email(email).await? else {
            return Ok(AuthOutcome::InvalidCredentials);
        };
        if !verify_password(password, &user.password_hash) {
            return Ok(AuthOutcome::InvalidCredentials);
        }
        if !user.is_active {
            return Ok(AuthOutcome::Disabled);
        }
        Ok(AuthOutcome::Authenticated(user))
    }

    /// Authenticate by email + password and return a JWT.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthResult> {
        match self.verify_credentials(email, password).await? {
            AuthOutcome::Authenticated(user) => {
                info!(user_id = %user.id, "User logged in");
                self.issue_token(user)
            }
            AuthOutcome::InvalidCredentials => {
                Err(DomainError::Unauthorized("Invalid email or password".into()))
            }
            AuthOutcome::Disabled => Err(DomainError::Forbidden("Account is disabled".into())),
        }
    }

    // ── Registration ────────────────────────────────────────────

    /// Register a guest account and log it in.
    pub async fn signup(&self, email: &str, password: &str, name: &str) -> DomainResult<AuthResult> {
        let email = email.trim();
        let name = name.trim();
        if !email.contains('@') || email.len() < 3 {
            return Err(DomainError::Validation("Invalid email address".into()));
        }
        if name.is_empty() {
            return Err(DomainError::Validation("Name is required".into()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let user = User::new(email, name, self.hash(password)?, UserRole::User);
        self.repos.users().create(user.clone()).await?;

        info!(user_id = %user.id, "New user registered");
        self.issue_token(user)
    }

    /// Create the configured admin account when the user table is empty.
    pub async fn ensure_default_admin(&self, admin: &AdminConfig) -> DomainResult<Option<User>> {
        if self.repos.users().count().await? > 0 {
            return Ok(None);
        }
        if admin.password.len() < MIN_PASSWORD_LEN {
            warn!("Default admin password is shorter than {} characters", MIN_PASSWORD_LEN);
        }

        let mut user = User::new(
            admin.email.as_str(),
            admin.name.as_str(),
            self.hash(&admin.password)?,
            UserRole::Admin,
        );
        user.verified = true;
        self.repos.users().create(user.clone()).await?;

        info!(user_id = %user.id, email = %user.email, "Default admin user created");
        Ok(Some(user))
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn current_user(&self, user_id: &str) -> DomainResult<User> {
        self.repos
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", "id", user_id))
    }

    /// Re-issue a token, e.g. after the role changed.
    pub fn issue_token(&self, user: User) -> DomainResult<AuthResult> {
        let token = create_token(&user, &self.jwt_config)
            .map_err(|e| DomainError::Storage(format!("Failed to create token: {}", e)))?;

        Ok(AuthResult {
            token,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.expiration_hours * 3600,
            user,
        })
    }

    fn hash(&self, password: &str) -> DomainResult<String> {
        hash_password(password, self.bcrypt_cost)
            .map_err(|e| DomainError::Storage(format!("Failed to hash password: {}", e)))
    }
}
