use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "vendor")]
    Vendor,
    #[sea_orm(string_value = "delivery")]
    Delivery,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Vendor => "vendor",
            UserRole::Delivery => "delivery",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(UserRole::User),
            "vendor" => Some(UserRole::Vendor),
            "delivery" => Some(UserRole::Delivery),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    #[sea_orm(string_value = "percentage")]
    Percentage,
    #[sea_orm(string_value = "fixed")]
    Fixed,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "card")]
    Card,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[sea_orm(string_value = "android")]
    Android,
    #[sea_orm(string_value = "ios")]
    Ios,
}

/// Which client application a version record describes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum AppType {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "vendor")]
    Vendor,
    #[sea_orm(string_value = "delivery")]
    Delivery,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum NotificationTarget {
    #[sea_orm(string_value = "all")]
    All,
    #[sea_orm(string_value = "users")]
    Users,
    #[sea_orm(string_value = "vendors")]
    Vendors,
    #[sea_orm(string_value = "delivery")]
    Delivery,
    #[sea_orm(string_value = "selected")]
    Selected,
}

impl NotificationTarget {
    /// Role a broadcast is restricted to; `None` means every account.
    pub fn role(&self) -> Option<UserRole> {
        match self {
            NotificationTarget::All | NotificationTarget::Selected => None,
            NotificationTarget::Users => Some(UserRole::User),
            NotificationTarget::Vendors => Some(UserRole::Vendor),
            NotificationTarget::Delivery => Some(UserRole::Delivery),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum OtpPurpose {
    #[sea_orm(string_value = "email_verification")]
    EmailVerification,
    #[sea_orm(string_value = "phone_verification")]
    PhoneVerification,
    #[sea_orm(string_value = "password_reset")]
    PasswordReset,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::EmailVerification => "email_verification",
            OtpPurpose::PhoneVerification => "phone_verification",
            OtpPurpose::PasswordReset => "password_reset",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_its_name() {
        for role in [UserRole::User, UserRole::Vendor, UserRole::Delivery, UserRole::Admin] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("root"), None);
    }

    #[test]
    fn broadcast_targets_map_to_roles() {
        assert_eq!(NotificationTarget::All.role(), None);
        assert_eq!(NotificationTarget::Delivery.role(), Some(UserRole::Delivery));
        assert_eq!(NotificationTarget::Vendors.role(), Some(UserRole::Vendor));
    }
}
