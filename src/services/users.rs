//! Credential store: registration, authentication and sessions

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
    models::user::{SessionClaims, User, UserSummary},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: Arc<AppConfig>,
}

impl UsersService {
    pub fn new(repository: Repository, config: Arc<AppConfig>) -> Self {
        Self { repository, config }
    }

    /// Create an account. Fails with `DuplicateEmail` if the email is taken.
    pub async fn register(&self, email: &str, name: &str, password: &str) -> AppResult<User> {
        let email = email.trim();

        if self.repository.users.email_exists(email).await? {
            tracing::info!("Registration refused, email already in use");
            return Err(AppError::DuplicateEmail);
        }

        let password_hash = self.hash_password(password)?;
        let user = self
            .repository
            .users
            .create(
                name.trim(),
                email,
                &password_hash,
                self.config.is_admin_email(email),
                self.config.auth.first_user_is_admin,
            )
            .await?;

        tracing::info!(user_id = user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Check credentials. Both failure modes surface as `InvalidCredentials`.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<User> {
        let Some(user) = self.repository.users.get_by_email(email.trim()).await? else {
            tracing::info!("Login failed: email does not exist");
            return Err(AppError::InvalidCredentials);
        };

        if !self.verify_password(&user, password)? {
            tracing::info!(user_id = user.id, "Login failed: incorrect password");
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!(user_id = user.id, "User logged in");
        Ok(user)
    }

    /// Issue a session token for `user`
    pub fn create_session(&self, user: &User) -> AppResult<String> {
        SessionClaims::new(user.id, self.config.auth.session_expiration_hours)
            .create_token(&self.config.auth.session_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create session token: {}", e)))
    }

    /// Resolve a session token to its user. Invalid tokens resolve to `None`.
    pub async fn resolve_session(&self, token: &str) -> AppResult<Option<User>> {
        let claims = match SessionClaims::from_token(token, &self.config.auth.session_secret) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!("Ignoring invalid session token: {}", e);
                return Ok(None);
            }
        };

        self.repository.users.get_by_id(claims.sub).await
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<User>> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn list_with_book_counts(&self) -> AppResult<Vec<UserSummary>> {
        self.repository.users.list_with_book_counts().await
    }

    /// Verify user password
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
