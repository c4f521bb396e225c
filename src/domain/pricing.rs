use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{coupon::CouponTerms, enums::DiscountType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceLine {
    pub item_id: Uuid,
    pub name: String,
    pub unit_price: i64,
    pub quantity: i32,
}

impl PriceLine {
    pub fn line_total(&self) -> i64 {
        self.unit_price.saturating_mul(i64::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteLine {
    pub item_id: Uuid,
    pub name: String,
    pub unit_price: i64,
    pub quantity: i32,
    pub line_total: i64,
}

/// The coupon a quote was priced with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub max_discount: Option<i64>,
}

impl From<&CouponTerms> for AppliedCoupon {
    fn from(terms: &CouponTerms) -> Self {
        Self {
            code: terms.code.clone(),
            discount_type: terms.discount_type,
            discount_value: terms.discount_value,
            max_discount: terms.max_discount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub items: Vec<QuoteLine>,
    pub subtotal: i64,
    pub discount: i64,
    pub delivery_fee: i64,
    pub total: i64,
    pub coupon: Option<AppliedCoupon>,
}

/// Prices an order: `total = subtotal - discount + delivery_fee`.
///
/// The coupon must already have passed its eligibility checks.
pub fn quote(lines: &[PriceLine], coupon: Option<&CouponTerms>, delivery_fee: i64) -> Quote {
    let items: Vec<QuoteLine> = lines
        .iter()
        .map(|line| QuoteLine {
            item_id: line.item_id,
            name: line.name.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            line_total: line.line_total(),
        })
        .collect();
    let subtotal = items.iter().map(|l| l.line_total).sum::<i64>();
    let discount = coupon.map(|c| c.discount_for(subtotal)).unwrap_or(0);
    Quote {
        items,
        subtotal,
        discount,
        delivery_fee,
        total: subtotal - discount + delivery_fee,
        coupon: coupon.map(AppliedCoupon::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::coupon::tests::terms;

    fn line(price: i64, qty: i32) -> PriceLine {
        PriceLine {
            item_id: Uuid::new_v4(),
            name: "Falafel wrap".into(),
            unit_price: price,
            quantity: qty,
        }
    }

    #[test]
    fn total_without_coupon() {
        let q = quote(&[line(2_500, 2), line(1_000, 1)], None, 700);
        assert_eq!(q.subtotal, 6_000);
        assert_eq!(q.discount, 0);
        assert_eq!(q.total, 6_700);
        assert_eq!(q.items[0].line_total, 5_000);
        assert!(q.coupon.is_none());
    }

    #[test]
    fn total_is_subtotal_minus_discount_plus_fee() {
        let coupon = terms(DiscountType::Percentage, 10);
        let q = quote(&[line(3_333, 3)], Some(&coupon), 500);
        assert_eq!(q.subtotal, 9_999);
        assert_eq!(q.discount, 999);
        assert_eq!(q.total, q.subtotal - q.discount + q.delivery_fee);
        let applied = q.coupon.expect("coupon summary");
        assert_eq!(applied.code, "SAVE");
        assert_eq!(applied.discount_type, DiscountType::Percentage);
        assert_eq!(applied.discount_value, 10);
    }

    #[test]
    fn quote_serializes_coupon_summary() {
        let coupon = terms(DiscountType::Fixed, 400);
        let q = quote(&[line(2_000, 1)], Some(&coupon), 0);
        let json = serde_json::to_value(&q).expect("serialize");
        assert_eq!(json["coupon"]["code"], "SAVE");
        assert_eq!(json["coupon"]["discountValue"], 400);
        assert!(json.get("couponCode").is_none());
    }

    #[test]
    fn oversized_fixed_discount_leaves_only_fee() {
        let coupon = terms(DiscountType::Fixed, 50_000);
        let q = quote(&[line(1_200, 1)], Some(&coupon), 300);
        assert_eq!(q.discount, 1_200);
        assert_eq!(q.total, 300);
    }
}
