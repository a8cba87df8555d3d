//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{Claims, CreateUser, Role, TokenUse, UpdateUser, User, UserQuery},
    repository::Repository,
};

/// Access + refresh token pair issued on login and refresh
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new member account
    pub async fn register(&self, user: CreateUser) -> AppResult<User> {
        let password = user
            .password
            .as_deref()
            .ok_or_else(|| AppError::field("password", "This field is required."))?;

        if self.repository.users.email_exists(&user.email, None).await? {
            return Err(AppError::field("email", "A user with this email already exists."));
        }

        let hash = self.hash_password(password)?;
        self.repository
            .users
            .create(&user.name, &user.email, &hash, Role::Member)
            .await
    }

    /// Authenticate by email and password, issuing a token pair
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<TokenPair> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }

        self.issue_pair(&user)
    }

    /// Exchange a valid refresh token for a fresh pair
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = Claims::from_token(refresh_token, &self.config.jwt_secret)
            .map_err(|_| AppError::Authentication("Invalid or expired refresh token".to_string()))?;

        if claims.token_use != TokenUse::Refresh {
            return Err(AppError::Authentication("Not a refresh token".to_string()));
        }

        // Re-read the user so revoked accounts and role changes take effect
        let user = self.repository.users.get_by_id(claims.user_id).await.map_err(|_| {
            AppError::Authentication("Account no longer exists".to_string())
        })?;

        self.issue_pair(&user)
    }

    /// Issue an access + refresh pair for a user
    fn issue_pair(&self, user: &User) -> AppResult<TokenPair> {
        let now = Utc::now().timestamp();

        let access = Claims {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role,
            token_use: TokenUse::Access,
            exp: now + self.config.access_token_minutes * 60,
            iat: now,
        };
        let refresh = Claims {
            token_use: TokenUse::Refresh,
            exp: now + self.config.refresh_token_days * 86400,
            ..access.clone()
        };

        Ok(TokenPair {
            access_token: access
                .create_token(&self.config.jwt_secret)
                .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?,
            refresh_token: refresh
                .create_token(&self.config.jwt_secret)
                .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?,
        })
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Search users
    pub async fn search_users(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        self.repository.users.search(query).await
    }

    /// Update an existing user
    pub async fn update_user(&self, id: i32, user: UpdateUser) -> AppResult<User> {
        if let Some(ref email) = user.email {
            if self.repository.users.email_exists(email, Some(id)).await? {
                return Err(AppError::field("email", "A user with this email already exists."));
            }
        }

        let password = match user.password.as_deref() {
            Some(raw) => Some(self.hash_password(raw)?),
            None => None,
        };

        self.repository.users.update(id, &user, password).await
    }

    /// Delete a user
    pub async fn delete_user(&self, id: i32) -> AppResult<()> {
        self.repository.users.delete(id).await
    }

    /// Create the configured admin account when none exists yet
    pub async fn bootstrap_admin(&self) -> AppResult<()> {
        if self.repository.users.has_admin().await? {
            return Ok(());
        }

        let hash = self.hash_password(&self.config.admin_password)?;
        let admin = self
            .repository
            .users
            .create("Admin", &self.config.admin_email, &hash, Role::Admin)
            .await?;

        tracing::info!(email = %admin.email, "bootstrapped admin account");
        Ok(())
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
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
