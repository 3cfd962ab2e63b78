//! Migrate command - brings the PostgreSQL schema up to date

use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::storage::run_migrations;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    init_logging(&config.logging);

    let pool = crate::connect_database(&config).await?;
    let applied = run_migrations(&pool).await?;

    if applied == 0 {
        info!("Schema already up to date");
    } else {
        info!(applied, "Applied migrations");
    }

    pool.close().await;
    Ok(())
}
