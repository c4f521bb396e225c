//! Business rules that do not touch the database.

pub mod coupon;
pub mod enums;
pub mod geo;
pub mod order_status;
pub mod pricing;
pub mod version;

pub use enums::{AppType, DiscountType, NotificationTarget, OtpPurpose, PaymentMethod, Platform, UserRole};
pub use order_status::OrderStatus;
