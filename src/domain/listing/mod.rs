//! Listing domain
//!
//! A listing is a marketplace post describing one spare part (a single earbud
//! or a charging case) offered by a user at a location.

mod entity;
mod repository;
mod validation;

pub use entity::{
    Condition, Listing, ListingFilter, ListingId, ListingPatch, ListingStatus, ListingType,
    NewListing, Side,
};
pub use repository::ListingRepository;
pub use validation::{
    validate_condition_input, validate_coordinates, validate_description, validate_images,
    validate_listing_id, validate_price, validate_product, validate_side_input, validate_title,
    validate_type_input, ListingValidationError,
};
