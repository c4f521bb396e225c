use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::Platform;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterFcmTokenRequest {
    #[validate(length(min = 10, max = 4096, message = "is not a valid device token"))]
    pub token: String,
    pub platform: Platform,
}
