//! In-memory message repository implementation

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::listing::ListingId;
use crate::domain::message::{Message, MessageRepository};
use crate::domain::DomainError;

/// In-memory implementation of MessageRepository, kept in insertion order
#[derive(Debug, Default)]
pub struct InMemoryMessageRepository {
    messages: Arc<RwLock<Vec<Message>>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create(&self, message: Message) -> Result<Message, DomainError> {
        let mut messages = self.messages.write().await;

        if messages.iter().any(|m| m.id() == message.id()) {
            return Err(DomainError::conflict(format!(
                "Message with ID '{}' already exists",
                message.id()
            )));
        }

        messages.push(message.clone());
        Ok(message)
    }

    async fn list_for_listing(&self, listing_id: &ListingId) -> Result<Vec<Message>, DomainError> {
        let messages = self.messages.read().await;
        let mut thread: Vec<Message> = messages
            .iter()
            .filter(|m| m.listing_id() == listing_id)
            .cloned()
            .collect();

        thread.sort_by_key(|m| m.created_at());
        Ok(thread)
    }

    async fn delete_for_listing(&self, listing_id: &ListingId) -> Result<u64, DomainError> {
        let mut messages = self.messages.write().await;
        let before = messages.len();
        messages.retain(|m| m.listing_id() != listing_id);
        Ok((before - messages.len()) as u64)
    }
}
