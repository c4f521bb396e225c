use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeliveryAreaRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "is required"))]
    pub city: String,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub delivery_fee: i64,
    #[validate(range(min = 1, message = "must be positive"))]
    pub estimated_time_minutes: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeliveryAreaRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub city: Option<String>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub delivery_fee: Option<i64>,
    #[validate(range(min = 1, message = "must be positive"))]
    pub estimated_time_minutes: Option<i32>,
    pub is_active: Option<bool>,
}

fn default_true() -> bool {
    true
}
