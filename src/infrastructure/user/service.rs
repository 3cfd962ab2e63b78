//! User service for registration, authentication and point awards

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::user::{
    validate_email, validate_name, validate_password, validate_password_confirmation, User,
    UserId, UserRepository, UserValidationError,
};
use crate::domain::DomainError;

use super::password::PasswordHasher;

/// Request for registering a new account
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// User service backed by any [`UserRepository`]
#[derive(Debug, Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    /// Create a new user service
    pub fn new(repository: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repository, hasher }
    }

    /// Register a new account with zero points
    pub async fn register(&self, request: RegisterRequest) -> Result<User, DomainError> {
        let name = request.name.trim();
        let email = normalize_email(&request.email);

        validate_name(name).map_err(validation_error)?;
        validate_email(&email).map_err(validation_error)?;
        validate_password(&request.password).map_err(validation_error)?;
        validate_password_confirmation(&request.password, &request.confirm_password)
            .map_err(validation_error)?;

        if self.repository.email_exists(&email).await? {
            return Err(DomainError::conflict(
                "An account with this email already exists.",
            ));
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let user = User::new(
            UserId::generate(),
            Some(name.to_string()),
            email,
            password_hash,
        );

        let user = self.repository.create(user).await?;
        info!(user_id = %user.id(), "Registered new account");

        Ok(user)
    }

    /// Authenticate with email and password
    ///
    /// Unknown emails and wrong passwords both yield `Ok(None)`.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        let email = normalize_email(email);

        let Some(user) = self.repository.get_by_email(&email).await? else {
            debug!("Login attempt for unknown email");
            return Ok(None);
        };

        if !self.hasher.verify(password, user.password_hash()) {
            debug!(user_id = %user.id(), "Login attempt with wrong password");
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Get a user by ID
    pub async fn get(&self, id: &str) -> Result<Option<User>, DomainError> {
        let user_id = UserId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        self.repository.get(&user_id).await
    }

    /// Get a user by ID, failing with NotFound when absent
    pub async fn require(&self, id: &UserId) -> Result<User, DomainError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))
    }

    /// Add to a user's baseline points
    pub async fn award_points(&self, id: &UserId, amount: u32) -> Result<User, DomainError> {
        let mut user = self.require(id).await?;
        user.award_points(amount);

        let user = self.repository.update(&user).await?;
        info!(user_id = %id, amount, total = user.points(), "Awarded points");

        Ok(user)
    }

    /// List all users
    pub async fn list(&self) -> Result<Vec<User>, DomainError> {
        self.repository.list().await
    }

    /// Count users
    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validation_error(e: UserValidationError) -> DomainError {
    DomainError::validation(e.to_string())
}
