//! Message service: listing threads and sending

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::listing::{ListingId, ListingRepository};
use crate::domain::message::{Message, MessageId, MessageRepository, MessageValidationError};
use crate::domain::user::{UserId, UserRepository};
use crate::domain::DomainError;

/// Raw message input; every field is required
#[derive(Debug, Clone, Default)]
pub struct SendMessageRequest {
    pub listing_id: Option<String>,
    pub receiver_id: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MessageService {
    messages: Arc<dyn MessageRepository>,
    listings: Arc<dyn ListingRepository>,
    users: Arc<dyn UserRepository>,
}

impl MessageService {
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        listings: Arc<dyn ListingRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            messages,
            listings,
            users,
        }
    }

    /// Messages about a listing that `viewer` may read, oldest first
    ///
    /// A viewer sees messages they sent or received, and the listing owner
    /// sees the whole thread. An unknown listing has no readable messages.
    pub async fn thread_for(
        &self,
        listing_id: &str,
        viewer: &UserId,
    ) -> Result<Vec<Message>, DomainError> {
        let Ok(listing_id) = ListingId::new(listing_id) else {
            return Ok(Vec::new());
        };

        let Some(listing) = self.listings.get(&listing_id).await? else {
            debug!(listing_id = %listing_id, "Thread requested for unknown listing");
            return Ok(Vec::new());
        };

        let thread = self.messages.list_for_listing(&listing_id).await?;

        Ok(thread
            .into_iter()
            .filter(|m| m.is_visible_to(viewer, listing.user_id()))
            .collect())
    }

    /// Every message about a listing, oldest first
    pub async fn full_thread(&self, listing_id: &ListingId) -> Result<Vec<Message>, DomainError> {
        self.messages.list_for_listing(listing_id).await
    }

    /// Send a message from `sender` about a listing
    pub async fn send(
        &self,
        sender: &UserId,
        request: SendMessageRequest,
    ) -> Result<Message, DomainError> {
        let (Some(listing_id), Some(receiver_id), Some(content)) = (
            non_blank(request.listing_id),
            non_blank(request.receiver_id),
            non_blank(request.content),
        ) else {
            return Err(DomainError::validation("Missing required fields"));
        };

        if receiver_id == sender.as_str() {
            return Err(DomainError::validation(
                MessageValidationError::SelfMessage.to_string(),
            ));
        }

        let listing_id = ListingId::new(listing_id)
            .map_err(|_| DomainError::not_found("Listing not found"))?;
        if self.listings.get(&listing_id).await?.is_none() {
            return Err(DomainError::not_found("Listing not found"));
        }

        let receiver_id =
            UserId::new(receiver_id).map_err(|_| DomainError::not_found("Receiver not found"))?;
        if !self.users.exists(&receiver_id).await? {
            return Err(DomainError::not_found("Receiver not found"));
        }

        let message = Message::new(
            MessageId::generate(),
            listing_id,
            sender.clone(),
            receiver_id,
            &content,
        )
        .map_err(|e| DomainError::validation(e.to_string()))?;

        let message = self.messages.create(message).await?;
        info!(
            message_id = %message.id(),
            listing_id = %message.listing_id(),
            "Message sent"
        );

        Ok(message)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
