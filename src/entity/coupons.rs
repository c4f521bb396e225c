use chrono::Utc;
use sea_orm::entity::prelude::*;

use crate::domain::{DiscountType, coupon::CouponTerms};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub max_discount: Option<i64>,
    pub min_order_amount: i64,
    pub max_uses: Option<i32>,
    pub max_uses_per_user: Option<i32>,
    pub used_count: i32,
    pub start_date: DateTimeWithTimeZone,
    pub end_date: DateTimeWithTimeZone,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn terms(&self) -> CouponTerms {
        CouponTerms {
            code: self.code.clone(),
            discount_type: self.discount_type,
            discount_value: self.discount_value,
            max_discount: self.max_discount,
            min_order_amount: self.min_order_amount,
            max_uses: self.max_uses,
            max_uses_per_user: self.max_uses_per_user,
            used_count: self.used_count,
            start_date: self.start_date.with_timezone(&Utc),
            end_date: self.end_date.with_timezone(&Utc),
            is_active: self.is_active,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::coupon_usages::Entity")]
    CouponUsages,
}

impl Related<super::coupon_usages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CouponUsages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
