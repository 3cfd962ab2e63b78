//! Listing repository trait

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::{Listing, ListingFilter, ListingId, ListingStatus};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Repository trait for listing storage
#[async_trait]
pub trait ListingRepository: Send + Sync + Debug {
    /// Get a listing by its ID
    async fn get(&self, id: &ListingId) -> Result<Option<Listing>, DomainError>;

    /// Create a new listing
    async fn create(&self, listing: Listing) -> Result<Listing, DomainError>;

    /// Update an existing listing
    async fn update(&self, listing: &Listing) -> Result<Listing, DomainError>;

    /// Delete a listing
    async fn delete(&self, id: &ListingId) -> Result<bool, DomainError>;

    /// Listings matching `filter`, newest first
    async fn search(&self, filter: &ListingFilter) -> Result<Vec<Listing>, DomainError>;

    /// Listings owned by `user_id`, newest first
    async fn list_by_owner(&self, user_id: &UserId) -> Result<Vec<Listing>, DomainError>;

    /// Status of every listing, grouped by owner. Owners without listings are absent.
    async fn statuses_by_owner(
        &self,
    ) -> Result<HashMap<UserId, Vec<ListingStatus>>, DomainError>;
}
