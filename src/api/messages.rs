//! Message endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{load_summaries, ApiError, Json, MessageResponse};
use crate::domain::message::Message;
use crate::infrastructure::message::SendMessageRequest;

pub fn create_messages_router() -> Router<AppState> {
    Router::new().route("/", get(list_messages).post(send_message))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadParams {
    pub listing_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageBody {
    pub listing_id: Option<String>,
    pub receiver_id: Option<String>,
    pub content: Option<String>,
}

/// GET /api/messages?listingId=
///
/// Only messages the caller sent or received, or every message when the
/// caller owns the listing.
pub async fn list_messages(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(params): Query<ThreadParams>,
) -> Result<Json<Vec<MessageResponse>>, ApiError> {
    let listing_id = params
        .listing_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("listingId is required").with_param("listingId"))?;

    let thread = state.message_service.thread_for(&listing_id, user.id()).await?;

    Ok(Json(with_participants(&state, &thread).await?))
}

/// POST /api/messages
pub async fn send_message(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<SendMessageBody>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let message = state
        .message_service
        .send(
            user.id(),
            SendMessageRequest {
                listing_id: body.listing_id,
                receiver_id: body.receiver_id,
                content: body.content,
            },
        )
        .await?;

    let mut responses = with_participants(&state, std::slice::from_ref(&message)).await?;
    let response = responses
        .pop()
        .ok_or_else(|| ApiError::internal("Failed to render message"))?;

    Ok((StatusCode::CREATED, Json(response)))
}

async fn with_participants(
    state: &AppState,
    messages: &[Message],
) -> Result<Vec<MessageResponse>, ApiError> {
    let people = load_summaries(
        &state.user_service,
        messages
            .iter()
            .flat_map(|m| [m.sender_id(), m.receiver_id()]),
    )
    .await?;

    Ok(messages
        .iter()
        .map(|message| {
            let mut response = MessageResponse::new(message);
            response.sender = people.get(message.sender_id()).cloned();
            response.receiver = people.get(message.receiver_id()).cloned();
            response
        })
        .collect())
}
