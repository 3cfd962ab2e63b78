//! User domain
//!
//! This module provides domain types and traits for marketplace accounts,
//! including user entities, registration validation, and the repository trait.

mod entity;
mod repository;
mod validation;

pub use entity::{User, UserId};
pub use repository::UserRepository;
pub use validation::{
    validate_email, validate_name, validate_password, validate_password_confirmation,
    validate_user_id, UserValidationError,
};
