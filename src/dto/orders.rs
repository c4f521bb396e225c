use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::domain::{OrderStatus, PaymentMethod};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub item_id: Uuid,
    #[validate(range(min = 1, max = 100, message = "must be between 1 and 100"))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PreviewOrderRequest {
    pub vendor_id: Uuid,
    pub delivery_area_id: Uuid,
    #[validate(length(min = 1, message = "must contain at least one item"), nested)]
    pub items: Vec<OrderLineRequest>,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub vendor_id: Uuid,
    pub delivery_area_id: Uuid,
    pub address_id: Uuid,
    #[validate(length(min = 1, message = "must contain at least one item"), nested)]
    pub items: Vec<OrderLineRequest>,
    pub coupon_code: Option<String>,
    pub payment_method: PaymentMethod,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub notes: Option<String>,
}

impl CreateOrderRequest {
    pub fn preview(&self) -> PreviewOrderRequest {
        PreviewOrderRequest {
            vendor_id: self.vendor_id,
            delivery_area_id: self.delivery_area_id,
            items: self.items.clone(),
            coupon_code: self.coupon_code.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct CancelOrderRequest {
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}
