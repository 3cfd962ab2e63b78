//! Account endpoints: registration, credential login and session info
//!
//! Sessions are stateless JWT bearer tokens, so logout only acknowledges
//! the request and the client drops its token.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, UserResponse};
use crate::domain::user::User;
use crate::infrastructure::user::RegisterRequest;

pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(get_current_user))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// Token issued on registration and login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub user: UserResponse,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// POST /auth/register
///
/// Creates the account and signs it in straight away.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let user = state
        .user_service
        .register(RegisterRequest {
            name: body.name,
            email: body.email,
            password: body.password,
            confirm_password: body.confirm_password,
        })
        .await?;

    let session = issue_session(&state, &user)?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<SessionResponse>, ApiError> {
    let user = state
        .user_service
        .authenticate(&body.email, &body.password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    debug!(user_id = %user.id(), "Signed in");
    Ok(Json(issue_session(&state, &user)?))
}

/// POST /auth/logout
pub async fn logout(RequireUser(user): RequireUser) -> Json<LogoutResponse> {
    debug!(user_id = %user.id(), "Signed out");

    Json(LogoutResponse {
        message: "Logged out successfully".to_string(),
    })
}

/// GET /auth/me
pub async fn get_current_user(RequireUser(user): RequireUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

fn issue_session(state: &AppState, user: &User) -> Result<SessionResponse, ApiError> {
    let issued = state.jwt_service.issue(user)?;

    Ok(SessionResponse {
        token: issued.token,
        user: UserResponse::from(user),
        expires_at: issued.expires_at,
    })
}
