use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::geo::GeoPoint;

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddressRequest {
    #[validate(length(min = 1, max = 50, message = "must be 1 to 50 characters"))]
    pub label: String,
    #[validate(length(min = 1, message = "is required"))]
    pub street: String,
    #[validate(length(min = 1, message = "is required"))]
    pub city: String,
    pub details: Option<String>,
    pub location: GeoPoint,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAddressRequest {
    #[validate(length(min = 1, max = 50, message = "must be 1 to 50 characters"))]
    pub label: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub street: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub city: Option<String>,
    pub details: Option<String>,
    pub location: Option<GeoPoint>,
}
