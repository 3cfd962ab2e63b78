//! Listing entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_listing_id, ListingValidationError};
use crate::domain::user::UserId;

/// Listing identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ListingId(String);

impl ListingId {
    pub fn new(id: impl Into<String>) -> Result<Self, ListingValidationError> {
        let id = id.into();
        validate_listing_id(&id)?;
        Ok(Self(id))
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ListingId {
    type Error = ListingValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ListingId> for String {
    fn from(id: ListingId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ListingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of part offered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingType {
    Case,
    Bud,
}

impl ListingType {
    /// Lenient parse used for query filters and form input: anything other
    /// than "case" is a bud
    pub fn normalise(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("case") {
            Self::Case
        } else {
            Self::Bud
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Case => "CASE",
            Self::Bud => "BUD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CASE" => Some(Self::Case),
            "BUD" => Some(Self::Bud),
            _ => None,
        }
    }
}

/// Physical condition of the part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    New,
    Good,
    Fair,
    ForParts,
}

impl Condition {
    /// Map form spellings ("Good", "For Parts", "FOR_PARTS") to a condition,
    /// falling back to `Fair` for anything unrecognised
    pub fn normalise(raw: &str) -> Self {
        let key = raw.to_uppercase().replacen(' ', "_", 1);
        Self::parse(&key).unwrap_or(Self::Fair)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Good => "GOOD",
            Self::Fair => "FAIR",
            Self::ForParts => "FOR_PARTS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NEW" => Some(Self::New),
            "GOOD" => Some(Self::Good),
            "FAIR" => Some(Self::Fair),
            "FOR_PARTS" => Some(Self::ForParts),
            _ => None,
        }
    }
}

/// Which earbud a bud listing is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Left,
    Right,
    Both,
}

impl Side {
    pub fn normalise(raw: Option<&str>) -> Option<Self> {
        raw.filter(|s| !s.is_empty())
            .and_then(|s| Self::parse(&s.to_uppercase()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Both => "BOTH",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LEFT" => Some(Self::Left),
            "RIGHT" => Some(Self::Right),
            "BOTH" => Some(Self::Both),
            _ => None,
        }
    }
}

/// Lifecycle state of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    /// Open for exchange and shown in search
    #[default]
    Available,
    /// The part found a match and completed a repair
    Repaired,
    /// Taken down by its owner
    Removed,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Repaired => "REPAIRED",
            Self::Removed => "REMOVED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "AVAILABLE" => Some(Self::Available),
            "REPAIRED" => Some(Self::Repaired),
            "REMOVED" => Some(Self::Removed),
            _ => None,
        }
    }
}

/// Validated input for creating a listing
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub title: String,
    pub description: Option<String>,
    pub listing_type: ListingType,
    pub product: String,
    pub condition: Condition,
    pub side: Option<Side>,
    pub latitude: f64,
    pub longitude: f64,
    pub images: Vec<String>,
}

/// Marketplace listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    id: ListingId,
    user_id: UserId,
    title: String,
    description: Option<String>,
    #[serde(rename = "type")]
    listing_type: ListingType,
    product: String,
    condition: Condition,
    side: Option<Side>,
    latitude: f64,
    longitude: f64,
    images: Vec<String>,
    price: Option<f64>,
    status: ListingStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Listing {
    /// Create an available listing owned by `user_id`
    pub fn new(id: ListingId, user_id: UserId, input: NewListing) -> Self {
        let now = Utc::now();

        Self {
            id,
            user_id,
            title: input.title,
            description: input.description,
            listing_type: input.listing_type,
            product: input.product,
            condition: input.condition,
            side: input.side,
            latitude: input.latitude,
            longitude: input.longitude,
            images: input.images,
            price: None,
            status: ListingStatus::Available,
            created_at: now,
            updated_at: now,
        }
    }

    // Getters

    pub fn id(&self) -> &ListingId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn listing_type(&self) -> ListingType {
        self.listing_type
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn side(&self) -> Option<Side> {
        self.side
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn price(&self) -> Option<f64> {
        self.price
    }

    pub fn status(&self) -> ListingStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Check whether `user_id` owns this listing
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    // Mutators

    pub fn set_status(&mut self, status: ListingStatus) {
        self.status = status;
        self.touch();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
        self.touch();
    }

    pub fn set_condition(&mut self, condition: Condition) {
        self.condition = condition;
        self.touch();
    }

    pub fn set_price(&mut self, price: Option<f64>) {
        self.price = price;
        self.touch();
    }

    /// Restore persisted timestamps and price after loading from storage
    pub fn with_persisted_state(
        mut self,
        status: ListingStatus,
        price: Option<f64>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        self.status = status;
        self.price = price;
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Partial update of an owned listing. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPatch {
    pub status: Option<ListingStatus>,
    pub title: Option<String>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
    pub condition: Option<Condition>,
    pub price: Option<f64>,
}

impl ListingPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.condition.is_none()
            && self.price.is_none()
    }

    pub fn apply(self, listing: &mut Listing) {
        if let Some(status) = self.status {
            listing.set_status(status);
        }
        if let Some(title) = self.title {
            listing.set_title(title);
        }
        if let Some(description) = self.description {
            listing.set_description(description);
        }
        if let Some(condition) = self.condition {
            listing.set_condition(condition);
        }
        if let Some(price) = self.price {
            listing.set_price(Some(price));
        }
    }
}

/// Search criteria for browsing listings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    pub status: Option<ListingStatus>,
    pub listing_type: Option<ListingType>,
    /// Case-insensitive substring of the product name
    pub product: Option<String>,
}

impl ListingFilter {
    /// Only listings still open for exchange
    pub fn available() -> Self {
        Self {
            status: Some(ListingStatus::Available),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, listing_type: ListingType) -> Self {
        self.listing_type = Some(listing_type);
        self
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(status) = self.status {
            if listing.status() != status {
                return false;
            }
        }

        if let Some(listing_type) = self.listing_type {
            if listing.listing_type() != listing_type {
                return false;
            }
        }

        if let Some(ref product) = self.product {
            if !listing
                .product()
                .to_lowercase()
                .contains(&product.to_lowercase())
            {
                return false;
            }
        }

        true
    }
}
