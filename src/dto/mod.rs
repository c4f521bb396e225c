pub mod addresses;
pub mod auth;
pub mod coupons;
pub mod delivery_areas;
pub mod fcm;
pub mod notifications;
pub mod orders;
pub mod users;
pub mod versions;
