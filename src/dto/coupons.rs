use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::domain::DiscountType;

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_coupon"))]
pub struct CreateCouponRequest {
    #[validate(length(min = 3, max = 32, message = "must be 3 to 32 characters"))]
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    #[validate(range(min = 1, message = "must be positive"))]
    pub discount_value: i64,
    #[validate(range(min = 1, message = "must be positive"))]
    pub max_discount: Option<i64>,
    #[validate(range(min = 0, message = "must not be negative"))]
    #[serde(default)]
    pub min_order_amount: i64,
    #[validate(range(min = 1, message = "must be positive"))]
    pub max_uses: Option<i32>,
    #[validate(range(min = 1, message = "must be positive"))]
    pub max_uses_per_user: Option<i32>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCouponRequest {
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    #[validate(range(min = 1, message = "must be positive"))]
    pub discount_value: Option<i64>,
    #[validate(range(min = 1, message = "must be positive"))]
    pub max_discount: Option<i64>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub min_order_amount: Option<i64>,
    #[validate(range(min = 1, message = "must be positive"))]
    pub max_uses: Option<i32>,
    #[validate(range(min = 1, message = "must be positive"))]
    pub max_uses_per_user: Option<i32>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

fn default_true() -> bool {
    true
}

fn validate_create_coupon(req: &CreateCouponRequest) -> Result<(), ValidationError> {
    check_coupon_shape(req.discount_type, req.discount_value, req.start_date, req.end_date)
}

/// Percentages are capped at 100 and the window must not be empty.
pub fn check_coupon_shape(
    discount_type: DiscountType,
    discount_value: i64,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if discount_type == DiscountType::Percentage && discount_value > 100 {
        let mut err = ValidationError::new("percentage");
        err.message = Some("discountValue must be at most 100 for percentage coupons".into());
        return Err(err);
    }
    if end_date <= start_date {
        let mut err = ValidationError::new("window");
        err.message = Some("endDate must be after startDate".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request(discount_type: DiscountType, value: i64) -> CreateCouponRequest {
        let now = Utc::now();
        CreateCouponRequest {
            code: "WELCOME10".into(),
            description: None,
            discount_type,
            discount_value: value,
            max_discount: None,
            min_order_amount: 0,
            max_uses: Some(100),
            max_uses_per_user: Some(1),
            start_date: now,
            end_date: now + Duration::days(30),
            is_active: true,
        }
    }

    #[test]
    fn accepts_well_formed_coupon() {
        assert!(request(DiscountType::Percentage, 10).validate().is_ok());
        assert!(request(DiscountType::Fixed, 5_000).validate().is_ok());
    }

    #[test]
    fn rejects_percentage_over_100() {
        assert!(request(DiscountType::Percentage, 150).validate().is_err());
    }

    #[test]
    fn rejects_inverted_window() {
        let mut req = request(DiscountType::Fixed, 100);
        req.end_date = req.start_date - Duration::hours(1);
        assert!(req.validate().is_err());
    }
}
