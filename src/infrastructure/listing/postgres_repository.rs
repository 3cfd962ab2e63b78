//! PostgreSQL listing repository implementation

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::listing::{
    Condition, Listing, ListingFilter, ListingId, ListingRepository, ListingStatus, ListingType,
    NewListing, Side,
};
use crate::domain::user::UserId;
use crate::domain::DomainError;

const LISTING_COLUMNS: &str = "id, user_id, title, description, listing_type, product, \
     condition, side, latitude, longitude, images, price, status, created_at, updated_at";

/// PostgreSQL implementation of ListingRepository
#[derive(Debug, Clone)]
pub struct PostgresListingRepository {
    pool: PgPool,
}

impl PostgresListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingRepository for PostgresListingRepository {
    async fn get(&self, id: &ListingId) -> Result<Option<Listing>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM listings WHERE id = $1",
            LISTING_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get listing: {}", e)))?;

        row.as_ref().map(row_to_listing).transpose()
    }

    async fn create(&self, listing: Listing) -> Result<Listing, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO listings (id, user_id, title, description, listing_type, product,
                                  condition, side, latitude, longitude, images, price,
                                  status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(listing.id().as_str())
        .bind(listing.user_id().as_str())
        .bind(listing.title())
        .bind(listing.description())
        .bind(listing.listing_type().as_str())
        .bind(listing.product())
        .bind(listing.condition().as_str())
        .bind(listing.side().map(|s| s.as_str()))
        .bind(listing.latitude())
        .bind(listing.longitude())
        .bind(listing.images().to_vec())
        .bind(listing.price())
        .bind(listing.status().as_str())
        .bind(listing.created_at())
        .bind(listing.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict(format!(
                    "Listing with ID '{}' already exists",
                    listing.id()
                ))
            } else if msg.contains("foreign key") {
                DomainError::not_found(format!("User '{}' not found", listing.user_id()))
            } else {
                DomainError::storage(format!("Failed to create listing: {}", e))
            }
        })?;

        Ok(listing)
    }

    async fn update(&self, listing: &Listing) -> Result<Listing, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE listings
            SET title = $2, description = $3, condition = $4, price = $5, status = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(listing.id().as_str())
        .bind(listing.title())
        .bind(listing.description())
        .bind(listing.condition().as_str())
        .bind(listing.price())
        .bind(listing.status().as_str())
        .bind(listing.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update listing: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Listing '{}' not found",
                listing.id()
            )));
        }

        Ok(listing.clone())
    }

    async fn delete(&self, id: &ListingId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete listing: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn search(&self, filter: &ListingFilter) -> Result<Vec<Listing>, DomainError> {
        let product_pattern = filter
            .product
            .as_ref()
            .map(|p| format!("%{}%", escape_like(p)));

        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM listings
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::TEXT IS NULL OR listing_type = $2)
              AND ($3::TEXT IS NULL OR product ILIKE $3)
            ORDER BY created_at DESC
            "#,
            LISTING_COLUMNS
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.listing_type.map(|t| t.as_str()))
        .bind(product_pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to search listings: {}", e)))?;

        rows.iter().map(row_to_listing).collect()
    }

    async fn list_by_owner(&self, user_id: &UserId) -> Result<Vec<Listing>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM listings WHERE user_id = $1 ORDER BY created_at DESC",
            LISTING_COLUMNS
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list listings: {}", e)))?;

        rows.iter().map(row_to_listing).collect()
    }

    async fn statuses_by_owner(
        &self,
    ) -> Result<HashMap<UserId, Vec<ListingStatus>>, DomainError> {
        let rows = sqlx::query("SELECT user_id, status FROM listings ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to load listing statuses: {}", e))
            })?;

        let mut grouped: HashMap<UserId, Vec<ListingStatus>> = HashMap::new();

        for row in rows {
            let user_id: String = row.get("user_id");
            let status: String = row.get("status");

            let user_id = UserId::new(&user_id)
                .map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))?;

            grouped
                .entry(user_id)
                .or_default()
                .push(parse_column(&status, ListingStatus::parse, "status")?);
        }

        Ok(grouped)
    }
}

fn row_to_listing(row: &sqlx::postgres::PgRow) -> Result<Listing, DomainError> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let listing_type: String = row.get("listing_type");
    let condition: String = row.get("condition");
    let side: Option<String> = row.get("side");
    let status: String = row.get("status");

    let listing_id = ListingId::new(&id)
        .map_err(|e| DomainError::storage(format!("Invalid listing ID in database: {}", e)))?;
    let user_id = UserId::new(&user_id)
        .map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))?;

    let side = side
        .map(|s| parse_column(&s, Side::parse, "side"))
        .transpose()?;

    let input = NewListing {
        title: row.get("title"),
        description: row.get("description"),
        listing_type: parse_column(&listing_type, ListingType::parse, "listing_type")?,
        product: row.get("product"),
        condition: parse_column(&condition, Condition::parse, "condition")?,
        side,
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        images: row.get("images"),
    };

    Ok(Listing::new(listing_id, user_id, input).with_persisted_state(
        parse_column(&status, ListingStatus::parse, "status")?,
        row.get("price"),
        row.get("created_at"),
        row.get("updated_at"),
    ))
}

fn parse_column<T>(
    value: &str,
    parse: impl Fn(&str) -> Option<T>,
    column: &str,
) -> Result<T, DomainError> {
    parse(value).ok_or_else(|| {
        DomainError::storage(format!("Invalid {} '{}' in database", column, value))
    })
}

/// Escape LIKE wildcards so user input matches literally
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
