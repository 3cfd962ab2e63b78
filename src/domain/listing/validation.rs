//! Listing validation utilities

use thiserror::Error;

use super::entity::{Condition, ListingType, Side};

/// Errors that can occur while validating listing input
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ListingValidationError {
    #[error("Listing ID cannot be empty")]
    EmptyId,

    #[error("Listing ID exceeds maximum length of {0} characters")]
    IdTooLong(usize),

    #[error("Listing ID contains invalid character: '{0}'")]
    InvalidIdCharacter(char),

    #[error("Title is required")]
    TitleRequired,

    #[error("Title too long. Maximum length is {0} characters")]
    TitleTooLong(usize),

    #[error("Description too long. Maximum length is {0} characters")]
    DescriptionTooLong(usize),

    #[error("Product is required")]
    ProductRequired,

    #[error("Product name too long. Maximum length is {0} characters")]
    ProductTooLong(usize),

    #[error("Invalid listing type '{0}'. Expected CASE or BUD")]
    InvalidType(String),

    #[error("Invalid condition '{0}'. Expected NEW, GOOD, FAIR or FOR_PARTS")]
    InvalidCondition(String),

    #[error("Invalid side '{0}'. Expected LEFT, RIGHT or BOTH")]
    InvalidSide(String),

    #[error("Latitude must be between -90 and 90")]
    LatitudeOutOfRange,

    #[error("Longitude must be between -180 and 180")]
    LongitudeOutOfRange,

    #[error("At most {0} images are allowed")]
    TooManyImages(usize),

    #[error("Image reference is not a valid URL: '{0}'")]
    InvalidImageUrl(String),

    #[error("Price must be between 0 and {0}")]
    PriceOutOfRange(u32),
}

impl ListingValidationError {
    /// Request field the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::IdTooLong(_) | Self::InvalidIdCharacter(_) => "id",
            Self::TitleRequired | Self::TitleTooLong(_) => "title",
            Self::DescriptionTooLong(_) => "description",
            Self::ProductRequired | Self::ProductTooLong(_) => "product",
            Self::InvalidType(_) => "type",
            Self::InvalidCondition(_) => "condition",
            Self::InvalidSide(_) => "side",
            Self::LatitudeOutOfRange => "latitude",
            Self::LongitudeOutOfRange => "longitude",
            Self::TooManyImages(_) | Self::InvalidImageUrl(_) => "images",
            Self::PriceOutOfRange(_) => "price",
        }
    }
}

const MAX_LISTING_ID_LENGTH: usize = 64;
const MAX_TITLE_LENGTH: usize = 120;
const MAX_DESCRIPTION_LENGTH: usize = 1000;
const MAX_PRODUCT_LENGTH: usize = 100;
const MAX_IMAGES: usize = 10;
const MAX_PRICE: u32 = 100_000;

const ACCEPTED_TYPES: [&str; 4] = ["CASE", "BUD", "case", "bud"];
const ACCEPTED_CONDITIONS: [&str; 8] = [
    "NEW",
    "GOOD",
    "FAIR",
    "FOR_PARTS",
    "New",
    "Good",
    "Fair",
    "For Parts",
];

/// Validate a listing ID (alphanumeric and hyphens, max 64 characters)
pub fn validate_listing_id(id: &str) -> Result<(), ListingValidationError> {
    if id.is_empty() {
        return Err(ListingValidationError::EmptyId);
    }

    if id.len() > MAX_LISTING_ID_LENGTH {
        return Err(ListingValidationError::IdTooLong(MAX_LISTING_ID_LENGTH));
    }

    if let Some(c) = id.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '-') {
        return Err(ListingValidationError::InvalidIdCharacter(c));
    }

    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), ListingValidationError> {
    if title.is_empty() {
        return Err(ListingValidationError::TitleRequired);
    }

    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ListingValidationError::TitleTooLong(MAX_TITLE_LENGTH));
    }

    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ListingValidationError> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ListingValidationError::DescriptionTooLong(
            MAX_DESCRIPTION_LENGTH,
        ));
    }

    Ok(())
}

pub fn validate_product(product: &str) -> Result<(), ListingValidationError> {
    if product.is_empty() {
        return Err(ListingValidationError::ProductRequired);
    }

    if product.chars().count() > MAX_PRODUCT_LENGTH {
        return Err(ListingValidationError::ProductTooLong(MAX_PRODUCT_LENGTH));
    }

    Ok(())
}

/// Accept only the exact spellings the listing form produces, then normalise
pub fn validate_type_input(raw: &str) -> Result<ListingType, ListingValidationError> {
    if !ACCEPTED_TYPES.contains(&raw) {
        return Err(ListingValidationError::InvalidType(raw.to_string()));
    }

    Ok(ListingType::normalise(raw))
}

/// Accept only the exact spellings the listing form produces, then normalise
pub fn validate_condition_input(raw: &str) -> Result<Condition, ListingValidationError> {
    if !ACCEPTED_CONDITIONS.contains(&raw) {
        return Err(ListingValidationError::InvalidCondition(raw.to_string()));
    }

    Ok(Condition::normalise(raw))
}

pub fn validate_side_input(raw: Option<&str>) -> Result<Option<Side>, ListingValidationError> {
    match raw {
        None => Ok(None),
        Some(value) => Side::parse(value)
            .map(Some)
            .ok_or_else(|| ListingValidationError::InvalidSide(value.to_string())),
    }
}

pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), ListingValidationError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ListingValidationError::LatitudeOutOfRange);
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ListingValidationError::LongitudeOutOfRange);
    }

    Ok(())
}

pub fn validate_images(images: &[String]) -> Result<(), ListingValidationError> {
    if images.len() > MAX_IMAGES {
        return Err(ListingValidationError::TooManyImages(MAX_IMAGES));
    }

    for image in images {
        if url::Url::parse(image).is_err() {
            return Err(ListingValidationError::InvalidImageUrl(image.clone()));
        }
    }

    Ok(())
}

pub fn validate_price(price: f64) -> Result<(), ListingValidationError> {
    if !(0.0..=f64::from(MAX_PRICE)).contains(&price) {
        return Err(ListingValidationError::PriceOutOfRange(MAX_PRICE));
    }

    Ok(())
}
