//! In-memory listing repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::listing::{Listing, ListingFilter, ListingId, ListingRepository, ListingStatus};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// In-memory implementation of ListingRepository
///
/// Listings are kept in insertion order so that equal creation timestamps
/// still list the most recently inserted listing first.
#[derive(Debug, Default)]
pub struct InMemoryListingRepository {
    listings: Arc<RwLock<Vec<Listing>>>,
}

impl InMemoryListingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listings(listings: Vec<Listing>) -> Self {
        Self {
            listings: Arc::new(RwLock::new(listings)),
        }
    }
}

fn newest_first<'a>(listings: impl DoubleEndedIterator<Item = &'a Listing>) -> Vec<Listing> {
    let mut result: Vec<Listing> = listings.rev().cloned().collect();
    result.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    result
}

#[async_trait]
impl ListingRepository for InMemoryListingRepository {
    async fn get(&self, id: &ListingId) -> Result<Option<Listing>, DomainError> {
        let listings = self.listings.read().await;
        Ok(listings.iter().find(|l| l.id() == id).cloned())
    }

    async fn create(&self, listing: Listing) -> Result<Listing, DomainError> {
        let mut listings = self.listings.write().await;

        if listings.iter().any(|l| l.id() == listing.id()) {
            return Err(DomainError::conflict(format!(
                "Listing with ID '{}' already exists",
                listing.id()
            )));
        }

        listings.push(listing.clone());
        Ok(listing)
    }

    async fn update(&self, listing: &Listing) -> Result<Listing, DomainError> {
        let mut listings = self.listings.write().await;

        let Some(existing) = listings.iter_mut().find(|l| l.id() == listing.id()) else {
            return Err(DomainError::not_found(format!(
                "Listing '{}' not found",
                listing.id()
            )));
        };

        *existing = listing.clone();
        Ok(listing.clone())
    }

    async fn delete(&self, id: &ListingId) -> Result<bool, DomainError> {
        let mut listings = self.listings.write().await;
        let before = listings.len();
        listings.retain(|l| l.id() != id);
        Ok(listings.len() < before)
    }

    async fn search(&self, filter: &ListingFilter) -> Result<Vec<Listing>, DomainError> {
        let listings = self.listings.read().await;
        Ok(newest_first(listings.iter().filter(|l| filter.matches(l))))
    }

    async fn list_by_owner(&self, user_id: &UserId) -> Result<Vec<Listing>, DomainError> {
        let listings = self.listings.read().await;
        Ok(newest_first(listings.iter().filter(|l| l.is_owned_by(user_id))))
    }

    async fn statuses_by_owner(
        &self,
    ) -> Result<HashMap<UserId, Vec<ListingStatus>>, DomainError> {
        let listings = self.listings.read().await;
        let mut grouped: HashMap<UserId, Vec<ListingStatus>> = HashMap::new();

        for listing in listings.iter() {
            grouped
                .entry(listing.user_id().clone())
                .or_default()
                .push(listing.status());
        }

        Ok(grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listing::{Condition, ListingType, NewListing};

    fn uid(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn listing(id: &str, owner: &str, product: &str, listing_type: ListingType) -> Listing {
        Listing::new(
            ListingId::new(id).unwrap(),
            uid(owner),
            NewListing {
                title: format!("{} part", product),
                description: None,
                listing_type,
                product: product.to_string(),
                condition: Condition::Good,
                side: None,
                latitude: 51.5,
                longitude: -0.12,
                images: vec![],
            },
        )
    }

    #[tokio::test]
    async fn test_create_get_delete() {
        let repo = InMemoryListingRepository::new();
        let created = repo
            .create(listing("l-1", "alice", "AirPods Pro", ListingType::Bud))
            .await
            .unwrap();

        assert!(repo.get(created.id()).await.unwrap().is_some());
        assert!(repo.delete(created.id()).await.unwrap());
        assert!(!repo.delete(created.id()).await.unwrap());
        assert!(repo.get(created.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_conflicts() {
        let repo = InMemoryListingRepository::new();
        repo.create(listing("l-1", "alice", "AirPods", ListingType::Bud))
            .await
            .unwrap();

        let result = repo
            .create(listing("l-1", "bob", "Galaxy Buds", ListingType::Case))
            .await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_search_filters_and_orders_newest_first() {
        let repo = InMemoryListingRepository::new();
        repo.create(listing("l-1", "alice", "AirPods Pro", ListingType::Bud))
            .await
            .unwrap();
        repo.create(listing("l-2", "bob", "Galaxy Buds", ListingType::Bud))
            .await
            .unwrap();
        repo.create(listing("l-3", "carol", "AirPods Max", ListingType::Case))
            .await
            .unwrap();

        let mut repaired = listing("l-4", "dave", "AirPods 3", ListingType::Bud);
        repaired.set_status(ListingStatus::Repaired);
        repo.create(repaired).await.unwrap();

        let all = repo.search(&ListingFilter::available()).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|l| l.id().as_str()).collect();
        assert_eq!(ids, vec!["l-3", "l-2", "l-1"]);

        let airpods = repo
            .search(&ListingFilter::available().with_product("airpods"))
            .await
            .unwrap();
        assert_eq!(airpods.len(), 2);

        let buds = repo
            .search(
                &ListingFilter::available()
                    .with_type(ListingType::Bud)
                    .with_product("AIRPODS"),
            )
            .await
            .unwrap();
        assert_eq!(buds.len(), 1);
        assert_eq!(buds[0].id().as_str(), "l-1");
    }

    #[tokio::test]
    async fn test_update_listing() {
        let repo = InMemoryListingRepository::new();
        let mut created = repo
            .create(listing("l-1", "alice", "AirPods", ListingType::Bud))
            .await
            .unwrap();

        created.set_status(ListingStatus::Repaired);
        repo.update(&created).await.unwrap();

        let fetched = repo.get(created.id()).await.unwrap().unwrap();
        assert_eq!(fetched.status(), ListingStatus::Repaired);
    }

    #[tokio::test]
    async fn test_update_missing_listing() {
        let repo = InMemoryListingRepository::new();
        let missing = listing("l-9", "alice", "AirPods", ListingType::Bud);

        let result = repo.update(&missing).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_statuses_by_owner() {
        let mut repaired = listing("l-2", "alice", "AirPods", ListingType::Bud);
        repaired.set_status(ListingStatus::Repaired);

        let repo = InMemoryListingRepository::with_listings(vec![
            listing("l-1", "alice", "AirPods", ListingType::Bud),
            repaired,
            listing("l-3", "bob", "Galaxy Buds", ListingType::Case),
        ]);

        let grouped = repo.statuses_by_owner().await.unwrap();

        assert_eq!(grouped.len(), 2);
        assert_eq!(
            grouped[&uid("alice")],
            vec![ListingStatus::Available, ListingStatus::Repaired]
        );
        assert_eq!(grouped[&uid("bob")], vec![ListingStatus::Available]);
        assert!(!grouped.contains_key(&uid("carol")));

        let owned = repo.list_by_owner(&uid("alice")).await.unwrap();
        assert_eq!(owned.len(), 2);
    }
}
