//! Application state shared by every handler

use std::sync::Arc;

use crate::infrastructure::auth::JwtGenerator;
use crate::infrastructure::leaderboard::LeaderboardService;
use crate::infrastructure::listing::ListingService;
use crate::infrastructure::message::MessageService;
use crate::infrastructure::user::UserService;

/// Services are backend-agnostic; the storage choice is made when the
/// repositories behind them are built.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub listing_service: Arc<ListingService>,
    pub message_service: Arc<MessageService>,
    pub leaderboard_service: Arc<LeaderboardService>,
    pub jwt_service: Arc<dyn JwtGenerator>,
    /// Size of the leaderboard top-N window
    pub leaderboard_limit: usize,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("leaderboard_limit", &self.leaderboard_limit)
            .finish_non_exhaustive()
    }
}
