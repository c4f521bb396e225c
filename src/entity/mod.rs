pub mod addresses;
pub mod ads;
pub mod app_versions;
pub mod coupon_usages;
pub mod coupons;
pub mod delivery_areas;
pub mod fcm_tokens;
pub mod items;
pub mod menu_categories;
pub mod notifications;
pub mod order_items;
pub mod orders;
pub mod otp_codes;
pub mod refresh_tokens;
pub mod users;
pub mod vendors;

pub use addresses::Entity as Addresses;
pub use ads::Entity as Ads;
pub use app_versions::Entity as AppVersions;
pub use coupon_usages::Entity as CouponUsages;
pub use coupons::Entity as Coupons;
pub use delivery_areas::Entity as DeliveryAreas;
pub use fcm_tokens::Entity as FcmTokens;
pub use items::Entity as Items;
pub use menu_categories::Entity as MenuCategories;
pub use notifications::Entity as Notifications;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use otp_codes::Entity as OtpCodes;
pub use refresh_tokens::Entity as RefreshTokens;
pub use users::Entity as Users;
pub use vendors::Entity as Vendors;
