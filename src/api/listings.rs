//! Listing endpoints
//!
//! Browsing and detail views are public. Creating needs a session, and
//! updates and deletes additionally need the caller to own the listing.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{load_summaries, ApiError, Json, ListingResponse, MessageResponse};
use crate::domain::listing::Listing;
use crate::infrastructure::listing::{CreateListingRequest, ListingQuery, UpdateListingRequest};

pub fn create_listings_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_listings).post(create_listing))
        .route(
            "/{id}",
            get(get_listing).patch(update_listing).delete(delete_listing),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingSearchParams {
    #[serde(rename = "type")]
    pub listing_type: Option<String>,
    pub product: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingBody {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub listing_type: String,
    pub product: String,
    pub condition: String,
    #[serde(default)]
    pub side: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateListingBody {
    pub status: Option<String>,
    pub title: Option<String>,
    /// Absent leaves the description alone, `null` clears it
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub condition: Option<String>,
    pub price: Option<f64>,
}

/// Listing with its owner and the whole conversation about it
#[derive(Debug, Serialize)]
pub struct ListingDetailResponse {
    #[serde(flatten)]
    pub listing: ListingResponse,
    pub messages: Vec<MessageResponse>,
}

#[derive(Debug, Serialize)]
pub struct DeleteListingResponse {
    pub message: String,
}

fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// GET /api/listings?type=&product=
pub async fn list_listings(
    State(state): State<AppState>,
    Query(params): Query<ListingSearchParams>,
) -> Result<Json<Vec<ListingResponse>>, ApiError> {
    let listings = state
        .listing_service
        .search(ListingQuery {
            listing_type: params.listing_type,
            product: params.product,
        })
        .await?;

    debug!(count = listings.len(), "Listed available listings");
    Ok(Json(with_owners(&state, &listings).await?))
}

/// POST /api/listings
pub async fn create_listing(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<CreateListingBody>,
) -> Result<(StatusCode, Json<ListingResponse>), ApiError> {
    let listing = state
        .listing_service
        .create(
            user.id(),
            CreateListingRequest {
                title: body.title,
                description: body.description,
                listing_type: body.listing_type,
                product: body.product,
                condition: body.condition,
                side: body.side,
                latitude: body.latitude,
                longitude: body.longitude,
                images: body.images,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ListingResponse::new(&listing))))
}

/// GET /api/listings/{id}
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ListingDetailResponse>, ApiError> {
    let listing = state.listing_service.require(&id).await?;
    let thread = state.message_service.full_thread(listing.id()).await?;

    let summaries = load_summaries(
        &state.user_service,
        std::iter::once(listing.user_id()).chain(thread.iter().map(|m| m.sender_id())),
    )
    .await?;

    let messages = thread
        .iter()
        .map(|message| {
            let mut response = MessageResponse::new(message);
            response.sender = summaries.get(message.sender_id()).cloned();
            response
        })
        .collect();

    Ok(Json(ListingDetailResponse {
        listing: ListingResponse::new(&listing)
            .with_owner(summaries.get(listing.user_id()).cloned()),
        messages,
    }))
}

/// PATCH /api/listings/{id}
pub async fn update_listing(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateListingBody>,
) -> Result<Json<ListingResponse>, ApiError> {
    let listing = state
        .listing_service
        .update(
            &id,
            user.id(),
            UpdateListingRequest {
                status: body.status,
                title: body.title,
                description: body.description,
                condition: body.condition,
                price: body.price,
            },
        )
        .await?;

    Ok(Json(ListingResponse::new(&listing)))
}

/// DELETE /api/listings/{id}
pub async fn delete_listing(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteListingResponse>, ApiError> {
    state.listing_service.delete(&id, user.id()).await?;

    Ok(Json(DeleteListingResponse {
        message: "Listing deleted".to_string(),
    }))
}

pub(crate) async fn with_owners(
    state: &AppState,
    listings: &[Listing],
) -> Result<Vec<ListingResponse>, ApiError> {
    let owners = load_summaries(&state.user_service, listings.iter().map(|l| l.user_id())).await?;

    Ok(listings
        .iter()
        .map(|l| ListingResponse::new(l).with_owner(owners.get(l.user_id()).cloned()))
        .collect())
}
