//! Listing service: browsing, creation and owner-only mutation

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::listing::{
    validate_condition_input, validate_coordinates, validate_description, validate_images,
    validate_price, validate_product, validate_side_input, validate_title, validate_type_input,
    Listing, ListingFilter, ListingId, ListingPatch, ListingRepository, ListingStatus,
    ListingType, ListingValidationError, NewListing,
};
use crate::domain::message::MessageRepository;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Raw listing form input, validated by [`ListingService::create`]
#[derive(Debug, Clone)]
pub struct CreateListingRequest {
    pub title: String,
    pub description: Option<String>,
    pub listing_type: String,
    pub product: String,
    pub condition: String,
    pub side: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub images: Vec<String>,
}

/// Raw partial update, validated by [`ListingService::update`]
#[derive(Debug, Clone, Default)]
pub struct UpdateListingRequest {
    pub status: Option<String>,
    pub title: Option<String>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
    pub condition: Option<String>,
    pub price: Option<f64>,
}

/// Browse query parameters
#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
    pub listing_type: Option<String>,
    pub product: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ListingService {
    listings: Arc<dyn ListingRepository>,
    messages: Arc<dyn MessageRepository>,
}

impl ListingService {
    pub fn new(
        listings: Arc<dyn ListingRepository>,
        messages: Arc<dyn MessageRepository>,
    ) -> Self {
        Self { listings, messages }
    }

    /// Available listings, newest first
    ///
    /// The type filter is lenient: "case" in any casing selects cases, any
    /// other non-empty value selects buds.
    pub async fn search(&self, query: ListingQuery) -> Result<Vec<Listing>, DomainError> {
        let mut filter = ListingFilter::available();

        if let Some(listing_type) = query.listing_type.as_deref().filter(|t| !t.is_empty()) {
            filter = filter.with_type(ListingType::normalise(listing_type));
        }

        if let Some(product) = query.product.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            filter = filter.with_product(product);
        }

        self.listings.search(&filter).await
    }

    /// Validate form input and store a new available listing
    pub async fn create(
        &self,
        owner: &UserId,
        request: CreateListingRequest,
    ) -> Result<Listing, DomainError> {
        let input = validate_new_listing(request).map_err(validation_error)?;
        let listing = Listing::new(ListingId::generate(), owner.clone(), input);

        let listing = self.listings.create(listing).await?;
        info!(listing_id = %listing.id(), user_id = %owner, "Created listing");

        Ok(listing)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Listing>, DomainError> {
        let listing_id = parse_id(id)?;
        self.listings.get(&listing_id).await
    }

    /// Get a listing, failing with NotFound when absent
    pub async fn require(&self, id: &str) -> Result<Listing, DomainError> {
        self.get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Listing not found"))
    }

    /// Load a listing and check that `caller` owns it
    pub async fn ensure_owner(&self, id: &str, caller: &UserId) -> Result<Listing, DomainError> {
        let listing = self.require(id).await?;

        if !listing.is_owned_by(caller) {
            debug!(listing_id = %id, user_id = %caller, "Rejected mutation by non-owner");
            return Err(DomainError::forbidden("Forbidden"));
        }

        Ok(listing)
    }

    /// Apply a partial update on behalf of the owner
    pub async fn update(
        &self,
        id: &str,
        caller: &UserId,
        request: UpdateListingRequest,
    ) -> Result<Listing, DomainError> {
        let mut listing = self.ensure_owner(id, caller).await?;
        let patch = validate_patch(request)?;

        if patch.is_empty() {
            return Ok(listing);
        }

        patch.apply(&mut listing);
        let listing = self.listings.update(&listing).await?;
        info!(listing_id = %listing.id(), status = listing.status().as_str(), "Updated listing");

        Ok(listing)
    }

    /// Delete an owned listing together with its message thread
    ///
    /// The listing goes first, so a failed delete leaves the thread intact.
    /// Postgres has already cascaded by the time the thread is cleared.
    pub async fn delete(&self, id: &str, caller: &UserId) -> Result<(), DomainError> {
        let listing = self.ensure_owner(id, caller).await?;

        self.listings.delete(listing.id()).await?;
        let removed = self.messages.delete_for_listing(listing.id()).await?;
        info!(listing_id = %listing.id(), messages = removed, "Deleted listing");

        Ok(())
    }

    /// Listings owned by a user, newest first
    pub async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Listing>, DomainError> {
        self.listings.list_by_owner(owner).await
    }
}

fn parse_id(id: &str) -> Result<ListingId, DomainError> {
    ListingId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))
}

fn validation_error(e: ListingValidationError) -> DomainError {
    DomainError::validation(e.to_string())
}

fn validate_new_listing(request: CreateListingRequest) -> Result<NewListing, ListingValidationError> {
    let title = request.title.trim().to_string();
    let product = request.product.trim().to_string();
    let description = request
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    validate_title(&title)?;
    if let Some(ref description) = description {
        validate_description(description)?;
    }
    let listing_type = validate_type_input(&request.listing_type)?;
    validate_product(&product)?;
    let condition = validate_condition_input(&request.condition)?;
    let side = validate_side_input(request.side.as_deref().filter(|s| !s.is_empty()))?;
    validate_coordinates(request.latitude, request.longitude)?;
    validate_images(&request.images)?;

    Ok(NewListing {
        title,
        description,
        listing_type,
        product,
        condition,
        side,
        latitude: request.latitude,
        longitude: request.longitude,
        images: request.images,
    })
}

fn validate_patch(request: UpdateListingRequest) -> Result<ListingPatch, DomainError> {
    let status = request
        .status
        .map(|s| {
            ListingStatus::parse(&s).ok_or_else(|| {
                DomainError::validation(format!(
                    "Invalid status '{}'. Expected AVAILABLE, REPAIRED or REMOVED",
                    s
                ))
            })
        })
        .transpose()?;

    let title = request.title.map(|t| t.trim().to_string());
    if let Some(ref title) = title {
        validate_title(title).map_err(validation_error)?;
    }

    if let Some(Some(ref description)) = request.description {
        validate_description(description).map_err(validation_error)?;
    }

    let condition = request
        .condition
        .map(|c| validate_condition_input(&c))
        .transpose()
        .map_err(validation_error)?;

    if let Some(price) = request.price {
        validate_price(price).map_err(validation_error)?;
    }

    Ok(ListingPatch {
        status,
        title,
        description: request.description,
        condition,
        price: request.price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    use crate::domain::listing::Condition;
    use crate::domain::message::{Message, MessageId};
    use crate::infrastructure::listing::InMemoryListingRepository;
    use crate::infrastructure::message::InMemoryMessageRepository;

    fn uid(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn create_service() -> (ListingService, Arc<InMemoryMessageRepository>) {
        let messages = Arc::new(InMemoryMessageRepository::new());
        let service = ListingService::new(
            Arc::new(InMemoryListingRepository::new()),
            messages.clone(),
        );
        (service, messages)
    }

    fn request(product: &str, listing_type: &str) -> CreateListingRequest {
        CreateListingRequest {
            title: "Left AirPod".to_string(),
            description: Some("  Works fine  ".to_string()),
            listing_type: listing_type.to_string(),
            product: product.to_string(),
            condition: "For Parts".to_string(),
            side: Some("LEFT".to_string()),
            latitude: 48.85,
            longitude: 2.35,
            images: vec!["https://img.example.com/1.jpg".to_string()],
        }
    }

    #[tokio::test]
    async fn test_create_normalises_input() {
        let (service, _) = create_service();

        let listing = service
            .create(&uid("alice"), request("AirPods Pro", "bud"))
            .await
            .unwrap();

        assert_eq!(listing.listing_type(), ListingType::Bud);
        assert_eq!(listing.condition(), Condition::ForParts);
        assert_eq!(listing.description(), Some("Works fine"));
        assert_eq!(listing.status(), ListingStatus::Available);
        assert!(listing.is_owned_by(&uid("alice")));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let (service, _) = create_service();

        let mut bad_type = request("AirPods", "Case");
        bad_type.listing_type = "Case".to_string();
        assert!(matches!(
            service.create(&uid("alice"), bad_type).await,
            Err(DomainError::Validation { .. })
        ));

        let mut bad_lat = request("AirPods", "case");
        bad_lat.latitude = 91.0;
        assert!(matches!(
            service.create(&uid("alice"), bad_lat).await,
            Err(DomainError::Validation { .. })
        ));

        let mut blank_title = request("AirPods", "case");
        blank_title.title = "   ".to_string();
        assert!(matches!(
            service.create(&uid("alice"), blank_title).await,
            Err(DomainError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_search_filters() {
        let (service, _) = create_service();
        service
            .create(&uid("alice"), request("AirPods Pro", "bud"))
            .await
            .unwrap();
        service
            .create(&uid("bob"), request("AirPods Pro", "case"))
            .await
            .unwrap();
        service
            .create(&uid("carol"), request("Galaxy Buds", "BUD"))
            .await
            .unwrap();

        let all = service.search(ListingQuery::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let cases = service
            .search(ListingQuery {
                listing_type: Some("CASE".to_string()),
                product: None,
            })
            .await
            .unwrap();
        assert_eq!(cases.len(), 1);

        let airpod_buds = service
            .search(ListingQuery {
                listing_type: Some("anything".to_string()),
                product: Some("airpods".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(airpod_buds.len(), 1);
        assert!(airpod_buds[0].is_owned_by(&uid("alice")));
    }

    #[tokio::test]
    async fn test_repaired_listing_leaves_search() {
        let (service, _) = create_service();
        let listing = service
            .create(&uid("alice"), request("AirPods", "bud"))
            .await
            .unwrap();

        let update = UpdateListingRequest {
            status: Some("REPAIRED".to_string()),
            ..Default::default()
        };
        let updated = service
            .update(listing.id().as_str(), &uid("alice"), update)
            .await
            .unwrap();

        assert_eq!(updated.status(), ListingStatus::Repaired);
        assert!(service.search(ListingQuery::default()).await.unwrap().is_empty());
        assert_eq!(service.list_by_owner(&uid("alice")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_by_non_owner_is_forbidden() {
        let (service, _) = create_service();
        let listing = service
            .create(&uid("alice"), request("AirPods", "bud"))
            .await
            .unwrap();

        let update = UpdateListingRequest {
            title: Some("Mine now".to_string()),
            ..Default::default()
        };
        let result = service
            .update(listing.id().as_str(), &uid("mallory"), update)
            .await;

        assert!(matches!(result, Err(DomainError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_update_validates_fields() {
        let (service, _) = create_service();
        let listing = service
            .create(&uid("alice"), request("AirPods", "bud"))
            .await
            .unwrap();
        let id = listing.id().as_str();

        let bad_status = UpdateListingRequest {
            status: Some("SOLD".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service.update(id, &uid("alice"), bad_status).await,
            Err(DomainError::Validation { .. })
        ));

        let bad_price = UpdateListingRequest {
            price: Some(100_001.0),
            ..Default::default()
        };
        assert!(matches!(
            service.update(id, &uid("alice"), bad_price).await,
            Err(DomainError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_clears_description_and_sets_price() {
        let (service, _) = create_service();
        let listing = service
            .create(&uid("alice"), request("AirPods", "bud"))
            .await
            .unwrap();

        let update = UpdateListingRequest {
            description: Some(None),
            price: Some(25.5),
            ..Default::default()
        };
        let updated = service
            .update(listing.id().as_str(), &uid("alice"), update)
            .await
            .unwrap();

        assert!(updated.description().is_none());
        assert_eq!(updated.price(), Some(25.5));
    }

    #[tokio::test]
    async fn test_missing_listing_is_not_found() {
        let (service, _) = create_service();

        let result = service
            .ensure_owner("does-not-exist", &uid("alice"))
            .await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_messages() {
        let (service, messages) = create_service();
        let listing = service
            .create(&uid("alice"), request("AirPods", "bud"))
            .await
            .unwrap();

        let message = Message::new(
            MessageId::generate(),
            listing.id().clone(),
            uid("bob"),
            uid("alice"),
            "Is this still available?",
        )
        .unwrap();
        messages.create(message).await.unwrap();

        let forbidden = service.delete(listing.id().as_str(), &uid("bob")).await;
        assert!(matches!(forbidden, Err(DomainError::Forbidden { .. })));

        service
            .delete(listing.id().as_str(), &uid("alice"))
            .await
            .unwrap();

        assert!(service.get(listing.id().as_str()).await.unwrap().is_none());
        assert!(messages
            .list_for_listing(listing.id())
            .await
            .unwrap()
            .is_empty());
    }

    /// Listing store that serves reads but refuses to delete
    #[derive(Debug, Default)]
    struct UndeletableListingRepository {
        inner: InMemoryListingRepository,
    }

    #[async_trait]
    impl ListingRepository for UndeletableListingRepository {
        async fn get(&self, id: &ListingId) -> Result<Option<Listing>, DomainError> {
            self.inner.get(id).await
        }

        async fn create(&self, listing: Listing) -> Result<Listing, DomainError> {
            self.inner.create(listing).await
        }

        async fn update(&self, listing: &Listing) -> Result<Listing, DomainError> {
            self.inner.update(listing).await
        }

        async fn delete(&self, _id: &ListingId) -> Result<bool, DomainError> {
            Err(DomainError::storage("connection reset"))
        }

        async fn search(&self, filter: &ListingFilter) -> Result<Vec<Listing>, DomainError> {
            self.inner.search(filter).await
        }

        async fn list_by_owner(&self, user_id: &UserId) -> Result<Vec<Listing>, DomainError> {
            self.inner.list_by_owner(user_id).await
        }

        async fn statuses_by_owner(
            &self,
        ) -> Result<HashMap<UserId, Vec<ListingStatus>>, DomainError> {
            self.inner.statuses_by_owner().await
        }
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_thread() {
        let messages = Arc::new(InMemoryMessageRepository::new());
        let service = ListingService::new(
            Arc::new(UndeletableListingRepository::default()),
            messages.clone(),
        );
        let listing = service
            .create(&uid("alice"), request("AirPods", "bud"))
            .await
            .unwrap();

        let message = Message::new(
            MessageId::generate(),
            listing.id().clone(),
            uid("bob"),
            uid("alice"),
            "Still available?",
        )
        .unwrap();
        messages.create(message).await.unwrap();

        let result = service.delete(listing.id().as_str(), &uid("alice")).await;

        assert!(matches!(result, Err(DomainError::Storage { .. })));
        assert!(service.get(listing.id().as_str()).await.unwrap().is_some());
        assert_eq!(messages.list_for_listing(listing.id()).await.unwrap().len(), 1);
    }
}
