use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::{
        AppType, DiscountType, NotificationTarget, OrderStatus, PaymentMethod, Platform, UserRole,
        geo::GeoPoint,
    },
    entity,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<entity::users::Model> for User {
    fn from(model: entity::users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            role: model.role,
            email_verified: model.email_verified,
            phone_verified: model.phone_verified,
            is_available: model.is_available,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    pub label: String,
    pub street: String,
    pub city: String,
    pub details: Option<String>,
    pub location: GeoPoint,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<entity::addresses::Model> for Address {
    fn from(model: entity::addresses::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            label: model.label,
            street: model.street,
            city: model.city,
            details: model.details,
            location: GeoPoint::new(model.longitude, model.latitude),
            is_default: model.is_default,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ad {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub vendor_id: Option<Uuid>,
    pub priority: i32,
    pub created_at: DateTime<Utc>,
}

impl From<entity::ads::Model> for Ad {
    fn from(model: entity::ads::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            image_url: model.image_url,
            link_url: model.link_url,
            vendor_id: model.vendor_id,
            priority: model.priority,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub cuisine: Option<String>,
    /// Relative URL of the logo image, when one is uploaded
    pub logo_url: Option<String>,
    pub rating: f64,
    pub is_open: bool,
    pub created_at: DateTime<Utc>,
}

impl From<entity::vendors::Model> for Vendor {
    fn from(model: entity::vendors::Model) -> Self {
        let logo_url = model
            .logo_path
            .as_ref()
            .map(|_| format!("/api/vendors/{}/logo", model.id));
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            phone: model.phone,
            address: model.address,
            cuisine: model.cuisine,
            logo_url,
            rating: model.rating,
            is_open: model.is_open,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuCategory {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
}

impl From<entity::menu_categories::Model> for MenuCategory {
    fn from(model: entity::menu_categories::Model) -> Self {
        Self {
            id: model.id,
            vendor_id: model.vendor_id,
            name: model.name,
            description: model.description,
            sort_order: model.sort_order,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

impl From<entity::items::Model> for Item {
    fn from(model: entity::items::Model) -> Self {
        Self {
            id: model.id,
            vendor_id: model.vendor_id,
            category_id: model.category_id,
            name: model.name,
            description: model.description,
            price: model.price,
            image_url: model.image_url,
            is_available: model.is_available,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryArea {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub delivery_fee: i64,
    pub estimated_time_minutes: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<entity::delivery_areas::Model> for DeliveryArea {
    fn from(model: entity::delivery_areas::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            city: model.city,
            delivery_fee: model.delivery_fee,
            estimated_time_minutes: model.estimated_time_minutes,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub description: Option<String>,
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
    pub created_at: DateTime<Utc>,
}

impl From<entity::coupons::Model> for Coupon {
    fn from(model: entity::coupons::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            description: model.description,
            discount_type: model.discount_type,
            discount_value: model.discount_value,
            max_discount: model.max_discount,
            min_order_amount: model.min_order_amount,
            max_uses: model.max_uses,
            max_uses_per_user: model.max_uses_per_user,
            used_count: model.used_count,
            start_date: model.start_date.with_timezone(&Utc),
            end_date: model.end_date.with_timezone(&Utc),
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub item_id: Uuid,
    pub name: String,
    pub unit_price: i64,
    pub quantity: i32,
    pub line_total: i64,
}

impl From<entity::order_items::Model> for OrderItem {
    fn from(model: entity::order_items::Model) -> Self {
        Self {
            id: model.id,
            item_id: model.item_id,
            name: model.name,
            unit_price: model.unit_price,
            quantity: model.quantity,
            line_total: model.line_total,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    #[schema(example = "ORD-20260101-1A2B3C4D")]
    pub order_number: String,
    pub user_id: Uuid,
    pub vendor_id: Uuid,
    pub address_id: Uuid,
    pub delivery_area_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub coupon_id: Option<Uuid>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub subtotal: i64,
    pub discount: i64,
    pub delivery_fee: i64,
    /// Always `subtotal - discount + deliveryFee`
    pub total: i64,
    pub notes: Option<String>,
    pub cancel_reason: Option<String>,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn from_parts(model: entity::orders::Model, items: Vec<entity::order_items::Model>) -> Self {
        Self {
            id: model.id,
            order_number: model.order_number,
            user_id: model.user_id,
            vendor_id: model.vendor_id,
            address_id: model.address_id,
            delivery_area_id: model.delivery_area_id,
            driver_id: model.driver_id,
            coupon_id: model.coupon_id,
            status: model.status,
            payment_method: model.payment_method,
            subtotal: model.subtotal,
            discount: model.discount,
            delivery_fee: model.delivery_fee,
            total: model.total,
            notes: model.notes,
            cancel_reason: model.cancel_reason,
            items: items.into_iter().map(OrderItem::from).collect(),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppVersion {
    pub app_type: AppType,
    pub platform: Platform,
    pub latest_version: String,
    pub min_supported_version: String,
    pub is_mandatory: bool,
    pub release_notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<entity::app_versions::Model> for AppVersion {
    fn from(model: entity::app_versions::Model) -> Self {
        Self {
            app_type: model.app_type,
            platform: model.platform,
            latest_version: model.latest_version,
            min_supported_version: model.min_supported_version,
            is_mandatory: model.is_mandatory,
            release_notes: model.release_notes,
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FcmTokenStatus {
    pub registered: bool,
    pub platform: Option<Platform>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationReceipt {
    pub notification_id: Uuid,
    pub target: NotificationTarget,
    pub recipient_count: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn now() -> DateTime<FixedOffset> {
        Utc::now().fixed_offset()
    }

    #[test]
    fn address_location_is_geojson() {
        let address = Address::from(entity::addresses::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            label: "Home".into(),
            street: "12 Nile St".into(),
            city: "Cairo".into(),
            details: None,
            longitude: 31.23,
            latitude: 30.04,
            is_default: true,
            created_at: now(),
            updated_at: now(),
        });
        let json = serde_json::to_value(&address).unwrap();
        assert_eq!(json["location"]["type"], "Point");
        assert_eq!(json["location"]["coordinates"][0], 31.23);
        assert_eq!(json["isDefault"], true);
    }

    #[test]
    fn vendor_logo_url_only_when_uploaded() {
        let mut model = entity::vendors::Model {
            id: Uuid::new_v4(),
            owner_id: None,
            name: "Koshary Abou Tarek".into(),
            description: None,
            phone: None,
            address: None,
            cuisine: Some("egyptian".into()),
            logo_path: None,
            rating: 4.7,
            is_open: true,
            is_active: true,
            created_at: now(),
        };
        assert!(Vendor::from(model.clone()).logo_url.is_none());
        model.logo_path = Some("logos/abou-tarek.png".into());
        let vendor = Vendor::from(model.clone());
        assert_eq!(vendor.logo_url, Some(format!("/api/vendors/{}/logo", model.id)));
    }

    #[test]
    fn user_never_exposes_password_hash() {
        let user = User::from(entity::users::Model {
            id: Uuid::new_v4(),
            name: "Mona".into(),
            email: "mona@example.com".into(),
            phone: None,
            password_hash: "secret-hash".into(),
            role: UserRole::User,
            email_verified: false,
            phone_verified: false,
            is_available: false,
            created_at: now(),
            updated_at: now(),
        });
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"role\":\"user\""));
    }
}
