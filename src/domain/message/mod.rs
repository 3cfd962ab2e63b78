//! Message domain
//!
//! Messages are exchanged between two users about a single listing.

mod entity;
mod repository;

pub use entity::{validate_content, Message, MessageId, MessageValidationError};
pub use repository::MessageRepository;
