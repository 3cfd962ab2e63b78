//! Message entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::listing::ListingId;
use crate::domain::user::UserId;

/// Errors that can occur while validating a message
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MessageValidationError {
    #[error("Message ID cannot be empty")]
    EmptyId,

    #[error("Message content cannot be empty")]
    EmptyContent,

    #[error("Cannot send message to yourself")]
    SelfMessage,
}

/// Trim message content, rejecting blank input
pub fn validate_content(content: &str) -> Result<String, MessageValidationError> {
    let trimmed = content.trim();

    if trimmed.is_empty() {
        return Err(MessageValidationError::EmptyContent);
    }

    Ok(trimmed.to_string())
}

/// Message identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Result<Self, MessageValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(MessageValidationError::EmptyId);
        }
        Ok(Self(id))
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MessageId {
    type Error = MessageValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MessageId> for String {
    fn from(id: MessageId) -> Self {
        id.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message about a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    id: MessageId,
    listing_id: ListingId,
    sender_id: UserId,
    receiver_id: UserId,
    content: String,
    created_at: DateTime<Utc>,
}

impl Message {
    /// Create a message; content is trimmed and must not be blank
    pub fn new(
        id: MessageId,
        listing_id: ListingId,
        sender_id: UserId,
        receiver_id: UserId,
        content: &str,
    ) -> Result<Self, MessageValidationError> {
        if sender_id == receiver_id {
            return Err(MessageValidationError::SelfMessage);
        }

        Ok(Self {
            id,
            listing_id,
            sender_id,
            receiver_id,
            content: validate_content(content)?,
            created_at: Utc::now(),
        })
    }

    /// Rebuild a message from persisted columns
    pub fn restore(
        id: MessageId,
        listing_id: ListingId,
        sender_id: UserId,
        receiver_id: UserId,
        content: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            listing_id,
            sender_id,
            receiver_id,
            content,
            created_at,
        }
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn listing_id(&self) -> &ListingId {
        &self.listing_id
    }

    pub fn sender_id(&self) -> &UserId {
        &self.sender_id
    }

    pub fn receiver_id(&self) -> &UserId {
        &self.receiver_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// A thread is readable by its two participants and by the listing owner
    pub fn is_visible_to(&self, viewer: &UserId, listing_owner: &UserId) -> bool {
        &self.sender_id == viewer || &self.receiver_id == viewer || listing_owner == viewer
    }
}
