//! Identity service, application-layer orchestration
//!
//! Login, admin management and the first-run default admin live here.
//! HTTP handlers are thin wrappers that delegate to this service.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AdminConfig;
use crate::domain::{DomainError, DomainResult, NewUser, RepositoryProvider, User, UserRole};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::password::{hash_password, verify_password};
use crate::shared::errors::InfraError;
use crate::shared::normalize_email;

const INVALID_LOGIN: &str = "Invalid email or password";

/// Authentication result returned after a successful login
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub user: User,
}

pub struct IdentityService {
    repos: Arc<dyn RepositoryProvider>,
    jwt_config: JwtConfig,
    bcrypt_cost: u32,
}

impl IdentityService {
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

    /// Authenticate by e-mail + password and return a JWT.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthResult> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(DomainError::Validation(
                "Email and password are required".into(),
            ));
        }

        let Some(user) = self.repos.users().find_by_email(&email).await? else {
            return Err(DomainError::Unauthorized(INVALID_LOGIN.into()));
        };

        // A corrupt stored hash is treated like a wrong password.
        let valid = verify_password(password, &user.password_hash).unwrap_or(false);
        if !valid {
            return Err(DomainError::Unauthorized(INVALID_LOGIN.into()));
        }

        let token = create_token(&user, &self.jwt_config)
            .map_err(|e| InfraError::Crypto(format!("Failed to create token: {}", e)))?;

        info!(user_id = user.id, "User logged in");
        Ok(AuthResult { token, user })
    }

    // ── Admin management ────────────────────────────────────────

    pub async fn list_admins(&self) -> DomainResult<Vec<User>> {
        self.repos.users().list_admins().await
    }

    pub async fn create_admin(&self, name: &str, email: &str, password: &str) -> DomainResult<User> {
        let name = name.trim();
        let email = normalize_email(email);
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(DomainError::Validation(
                "name, email and password are required".into(),
            ));
        }

        if self.repos.users().find_by_email(&email).await?.is_some() {
            return Err(DomainError::Conflict("Email already exists".into()));
        }

        let password_hash = hash_password(password, self.bcrypt_cost)
            .map_err(|e| InfraError::Crypto(format!("Failed to hash password: {}", e)))?;

        let user = self
            .repos
            .users()
            .create(NewUser {
                name: name.to_string(),
                email,
                password_hash,
                role: UserRole::Admin,
            })
            .await?;

        info!(user_id = user.id, "Admin account created");
        Ok(user)
    }

    /// Delete an admin account on behalf of `actor_id`.
    ///
    /// Self-deletion and removing the last admin are refused.
    pub async fn delete_admin(&self, actor_id: Option<i32>, id: i32) -> DomainResult<()> {
        if actor_id == Some(id) {
            return Err(DomainError::Validation(
                "You cannot delete your own account".into(),
            ));
        }

        let users = self.repos.users();
        if users.count_admins().await? <= 1 {
            return Err(DomainError::Validation(
                "At least one admin must remain".into(),
            ));
        }

        let Some(target) = users.find_by_id(id).await? else {
            return Err(DomainError::not_found("Admin", id));
        };
        if !target.role.is_admin() {
            return Err(DomainError::Validation(
                "Target user is not an admin".into(),
            ));
        }

        users.delete(id).await?;
        info!(user_id = id, "Admin account deleted");
        Ok(())
    }

    // ── Bootstrap ───────────────────────────────────────────────

    /// Create the configured admin when no user exists yet.
    /// Returns the created user, or `None` if users already exist.
    pub async fn ensure_default_admin(&self, admin: &AdminConfig) -> DomainResult<Option<User>> {
        if self.repos.users().count().await? > 0 {
            return Ok(None);
        }

        let user = self
            .create_admin(&admin.name, &admin.email, &admin.password)
            .await?;
        warn!(
            email = %user.email,
            "Created default admin account; change its password"
        );
        Ok(Some(user))
    }
}
