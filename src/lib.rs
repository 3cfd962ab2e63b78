//! RePaired
//!
//! A peer-to-peer marketplace for spare earbud and charging-case parts:
//! - Listings with type, condition, side and a location
//! - Private message threads per listing
//! - A contribution leaderboard driven by the scoring engine
//! - In-memory or PostgreSQL storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use anyhow::Context;
use rand::{distributions::Alphanumeric, Rng};
use sqlx::PgPool;
use tracing::{info, warn};

use api::state::AppState;
use config::StorageBackend;
use domain::{ListingRepository, MessageRepository, UserRepository};
use infrastructure::{
    auth::{JwtConfig, JwtService},
    leaderboard::LeaderboardService,
    listing::{InMemoryListingRepository, ListingService, PostgresListingRepository},
    message::{InMemoryMessageRepository, MessageService, PostgresMessageRepository},
    storage::{connect_pool, run_migrations, PostgresConfig},
    user::{Argon2Hasher, InMemoryUserRepository, PostgresUserRepository, UserService},
};

/// Repository set every service is built from
#[derive(Debug, Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub listings: Arc<dyn ListingRepository>,
    pub messages: Arc<dyn MessageRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            listings: Arc::new(InMemoryListingRepository::new()),
            messages: Arc::new(InMemoryMessageRepository::new()),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            listings: Arc::new(PostgresListingRepository::new(pool.clone())),
            messages: Arc::new(PostgresMessageRepository::new(pool)),
        }
    }
}

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state for the configured storage backend
///
/// The PostgreSQL backend connects and brings the schema up to date before
/// any service is built.
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    info!("Storage backend: {:?}", config.storage.backend);

    let repositories = match config.storage.backend {
        StorageBackend::InMemory => Repositories::in_memory(),
        StorageBackend::Postgres => {
            let pool = connect_database(config).await?;
            let applied = run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            info!(applied, "Database schema up to date");

            Repositories::postgres(pool)
        }
    };

    Ok(build_app_state(repositories, config))
}

/// In-memory application state with default configuration
pub fn create_in_memory_app_state() -> AppState {
    build_app_state(Repositories::in_memory(), &AppConfig::default())
}

/// Wire services over an explicit repository set
pub fn build_app_state(repositories: Repositories, config: &AppConfig) -> AppState {
    let jwt_secret = config.auth.jwt_secret.clone().unwrap_or_else(|| {
        warn!("JWT_SECRET is not set; generated a random secret, sessions will not survive a restart");
        generate_secret()
    });

    let jwt_service = JwtService::new(JwtConfig::new(
        jwt_secret,
        config.auth.jwt_expiration_hours,
    ));

    let Repositories {
        users,
        listings,
        messages,
    } = repositories;

    AppState {
        user_service: Arc::new(UserService::new(users.clone(), Arc::new(Argon2Hasher::new()))),
        listing_service: Arc::new(ListingService::new(listings.clone(), messages.clone())),
        message_service: Arc::new(MessageService::new(messages, listings.clone(), users.clone())),
        leaderboard_service: Arc::new(LeaderboardService::new(users, listings)),
        jwt_service: Arc::new(jwt_service),
        leaderboard_limit: config.leaderboard.limit,
    }
}

/// Connect to PostgreSQL using the configured URL
pub async fn connect_database(config: &AppConfig) -> anyhow::Result<PgPool> {
    let url = config.storage.database_url.as_deref().ok_or_else(|| {
        anyhow::anyhow!(
            "DATABASE_URL environment variable is required for the postgres storage backend"
        )
    })?;

    info!("Connecting to PostgreSQL...");
    let pool = connect_pool(
        &PostgresConfig::new(url).with_max_connections(config.storage.max_connections),
    )
    .await?;

    Ok(pool)
}

fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}
