//! Storage infrastructure - PostgreSQL pooling and schema migrations

pub mod migrations;
mod postgres;

pub use migrations::{marketplace_migrations, run_migrations, Migration, PostgresMigrator};
pub use postgres::{connect_pool, PostgresConfig};
