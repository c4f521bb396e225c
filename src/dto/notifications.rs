use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::domain::NotificationTarget;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct BroadcastNotificationRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 2000, message = "must be 1 to 2000 characters"))]
    pub body: String,
    pub target: NotificationTarget,
    pub data: Option<Value>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    #[validate(length(min = 1, max = 1000, message = "must list 1 to 1000 users"))]
    pub user_ids: Vec<Uuid>,
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 2000, message = "must be 1 to 2000 characters"))]
    pub body: String,
    pub data: Option<Value>,
}
