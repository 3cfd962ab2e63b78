//! Message repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::Message;
use crate::domain::listing::ListingId;
use crate::domain::DomainError;

/// Repository trait for message storage
#[async_trait]
pub trait MessageRepository: Send + Sync + Debug {
    /// Store a new message
    async fn create(&self, message: Message) -> Result<Message, DomainError>;

    /// All messages about a listing, oldest first
    async fn list_for_listing(&self, listing_id: &ListingId) -> Result<Vec<Message>, DomainError>;

    /// Remove every message about a listing, returning how many were removed
    async fn delete_for_listing(&self, listing_id: &ListingId) -> Result<u64, DomainError>;
}
