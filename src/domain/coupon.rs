use chrono::{DateTime, Utc};

use super::enums::DiscountType;

/// The parts of a coupon that decide whether it applies and how much it takes off.
#[derive(Debug, Clone)]
pub struct CouponTerms {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub max_discount: Option<i64>,
    pub min_order_amount: i64,
    pub max_uses: Option<i32>,
    pub max_uses_per_user: Option<i32>,
    pub used_count: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponRejection {
    Inactive,
    NotStarted,
    Expired,
    Exhausted,
    UserLimitReached,
    BelowMinimum { min_order_amount: i64 },
}

impl std::fmt::Display for CouponRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CouponRejection::Inactive => f.write_str("Coupon is not active"),
            CouponRejection::NotStarted => f.write_str("Coupon is not valid yet"),
            CouponRejection::Expired => f.write_str("Coupon has expired"),
            CouponRejection::Exhausted => f.write_str("Coupon usage limit reached"),
            CouponRejection::UserLimitReached => {
                f.write_str("You have already used this coupon the maximum number of times")
            }
            CouponRejection::BelowMinimum { min_order_amount } => {
                write!(f, "Minimum order amount for this coupon is {min_order_amount}")
            }
        }
    }
}

impl CouponTerms {
    /// Checks everything except the order amount.
    pub fn check_available(&self, now: DateTime<Utc>, user_uses: i64) -> Result<(), CouponRejection> {
        if !self.is_active {
            return Err(CouponRejection::Inactive);
        }
        if now < self.start_date {
            return Err(CouponRejection::NotStarted);
        }
        if now > self.end_date {
            return Err(CouponRejection::Expired);
        }
        if let Some(max) = self.max_uses {
            if self.used_count >= max {
                return Err(CouponRejection::Exhausted);
            }
        }
        if let Some(max) = self.max_uses_per_user {
            if user_uses >= i64::from(max) {
                return Err(CouponRejection::UserLimitReached);
            }
        }
        Ok(())
    }

    pub fn check_applicable(
        &self,
        now: DateTime<Utc>,
        user_uses: i64,
        subtotal: i64,
    ) -> Result<(), CouponRejection> {
        self.check_available(now, user_uses)?;
        if subtotal < self.min_order_amount {
            return Err(CouponRejection::BelowMinimum {
                min_order_amount: self.min_order_amount,
            });
        }
        Ok(())
    }

    /// Discount for a subtotal, never more than the subtotal itself.
    pub fn discount_for(&self, subtotal: i64) -> i64 {
        let raw = match self.discount_type {
            DiscountType::Percentage => {
                let pct = subtotal.saturating_mul(self.discount_value) / 100;
                match self.max_discount {
                    Some(cap) => pct.min(cap),
                    None => pct,
                }
            }
            DiscountType::Fixed => self.discount_value,
        };
        raw.clamp(0, subtotal.max(0))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;

    pub(crate) fn terms(discount_type: DiscountType, value: i64) -> CouponTerms {
        let now = Utc::now();
        CouponTerms {
            code: "SAVE".into(),
            discount_type,
            discount_value: value,
            max_discount: None,
            min_order_amount: 0,
            max_uses: None,
            max_uses_per_user: None,
            used_count: 0,
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(1),
            is_active: true,
        }
    }

    #[test]
    fn percentage_discount_floors_and_caps() {
        let mut c = terms(DiscountType::Percentage, 15);
        assert_eq!(c.discount_for(1_999), 299);
        c.max_discount = Some(100);
        assert_eq!(c.discount_for(1_999), 100);
    }

    #[test]
    fn fixed_discount_never_exceeds_subtotal() {
        let c = terms(DiscountType::Fixed, 5_000);
        assert_eq!(c.discount_for(12_000), 5_000);
        assert_eq!(c.discount_for(3_000), 3_000);
    }

    #[test]
    fn window_and_flag_are_enforced() {
        let now = Utc::now();
        let mut c = terms(DiscountType::Fixed, 10);
        c.is_active = false;
        assert_eq!(c.check_available(now, 0), Err(CouponRejection::Inactive));

        let mut c = terms(DiscountType::Fixed, 10);
        c.start_date = now + Duration::hours(1);
        assert_eq!(c.check_available(now, 0), Err(CouponRejection::NotStarted));

        let mut c = terms(DiscountType::Fixed, 10);
        c.end_date = now - Duration::hours(1);
        assert_eq!(c.check_available(now, 0), Err(CouponRejection::Expired));
    }

    #[test]
    fn usage_caps_are_enforced() {
        let now = Utc::now();
        let mut c = terms(DiscountType::Fixed, 10);
        c.max_uses = Some(3);
        c.used_count = 3;
        assert_eq!(c.check_available(now, 0), Err(CouponRejection::Exhausted));

        let mut c = terms(DiscountType::Fixed, 10);
        c.max_uses_per_user = Some(1);
        assert!(c.check_available(now, 0).is_ok());
        assert_eq!(c.check_available(now, 1), Err(CouponRejection::UserLimitReached));
    }

    #[test]
    fn minimum_order_amount() {
        let mut c = terms(DiscountType::Fixed, 10);
        c.min_order_amount = 5_000;
        assert_eq!(
            c.check_applicable(Utc::now(), 0, 4_999),
            Err(CouponRejection::BelowMinimum { min_order_amount: 5_000 })
        );
        assert!(c.check_applicable(Utc::now(), 0, 5_000).is_ok());
    }
}
