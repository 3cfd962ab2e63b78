//! Shared request and response types

pub mod error;
pub mod json;
pub mod views;

pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;
pub use views::{
    load_summaries, ListingResponse, MessageResponse, UserResponse, UserSummary,
};
