//! Profile endpoint

use axum::{extract::State, routing::get, Router};
use serde::Serialize;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, ListingResponse};

pub fn create_profile_router() -> Router<AppState> {
    Router::new().route("/", get(get_profile))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub image: Option<String>,
    pub points: u32,
    pub listings: Vec<ListingResponse>,
    pub score: u64,
    pub available_count: usize,
    pub repaired_count: usize,
    /// 1-based over every user; `None` only if the account vanished mid-request
    pub rank: Option<usize>,
}

/// GET /api/profile
pub async fn get_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let listings = state.listing_service.list_by_owner(user.id()).await?;
    let card = state.leaderboard_service.score_card(user.id()).await?;
    let rank = state.leaderboard_service.rank_of(user.id()).await?;

    Ok(Json(ProfileResponse {
        id: user.id().as_str().to_string(),
        name: user.name().map(str::to_string),
        email: user.email().to_string(),
        image: user.image().map(str::to_string),
        points: user.points(),
        listings: listings.iter().map(ListingResponse::new).collect(),
        score: card.score,
        available_count: card.available_count,
        repaired_count: card.repaired_count,
        rank,
    }))
}
