use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    domain::{
        AppType, DiscountType, NotificationTarget, OrderStatus, PaymentMethod, Platform, UserRole,
        geo::GeoPoint,
        pricing::{AppliedCoupon, Quote, QuoteLine},
    },
    dto::{
        addresses::{CreateAddressRequest, UpdateAddressRequest},
        auth::{
            AuthTokens, ForgotPasswordRequest, LoginRequest, LoginResponse, RefreshTokenRequest,
            RegisterRequest, ResetPasswordRequest, VerifyOtpRequest,
        },
        coupons::{CreateCouponRequest, UpdateCouponRequest},
        delivery_areas::{CreateDeliveryAreaRequest, UpdateDeliveryAreaRequest},
        fcm::RegisterFcmTokenRequest,
        notifications::{BroadcastNotificationRequest, SendNotificationRequest},
        orders::{
            CancelOrderRequest, CreateOrderRequest, OrderLineRequest, PreviewOrderRequest,
            UpdateOrderStatusRequest,
        },
        users::{AvailabilityRequest, ChangePasswordRequest, UpdateProfileRequest},
        versions::{UpsertVersionRequest, VersionCheck},
    },
    models::{
        Ad, Address, AppVersion, Coupon, DeliveryArea, FcmTokenStatus, Item, MenuCategory,
        NotificationReceipt, Order, OrderItem, User, Vendor,
    },
    realtime::OrderEvent,
    response::{ErrorResponse, Meta},
    routes::{
        addresses, admin, ads, auth, catalog, coupons, delivery, delivery_areas, fcm, health,
        notifications, orders, realtime, versions,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness_check,
        auth::register,
        auth::login,
        auth::logout,
        auth::refresh_token,
        auth::send_email_otp,
        auth::verify_email_otp,
        auth::send_phone_otp,
        auth::verify_phone_otp,
        auth::forgot_password,
        auth::reset_password,
        addresses::list_addresses,
        addresses::create_address,
        addresses::get_default_address,
        addresses::get_address,
        addresses::update_address,
        addresses::delete_address,
        addresses::set_default_address,
        ads::list_ads,
        ads::get_ad,
        catalog::list_vendors,
        catalog::get_vendor,
        catalog::get_vendor_logo,
        catalog::list_categories,
        catalog::get_category,
        catalog::list_items,
        catalog::get_item,
        catalog::list_vendor_items,
        catalog::get_vendor_item,
        coupons::list_coupons,
        coupons::create_coupon,
        coupons::get_coupon,
        coupons::update_coupon,
        coupons::delete_coupon,
        coupons::toggle_coupon,
        coupons::list_available_coupons,
        delivery_areas::list_areas,
        delivery_areas::create_area,
        delivery_areas::get_area,
        delivery_areas::update_area,
        delivery_areas::delete_area,
        delivery_areas::list_active_areas,
        orders::preview_order,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::cancel_order,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::delete_order,
        admin::update_order_status,
        delivery::list_available_orders,
        delivery::list_my_orders,
        delivery::get_delivery_order,
        delivery::assign_order,
        delivery::update_delivery_status,
        delivery::get_profile,
        delivery::update_profile,
        delivery::change_password,
        delivery::set_availability,
        fcm::register_token,
        fcm::remove_token,
        fcm::token_status,
        notifications::broadcast,
        notifications::send_to_users,
        versions::get_version,
        versions::upsert_version,
        realtime::ws_handler
    ),
    components(
        schemas(
            User,
            Address,
            Ad,
            Vendor,
            MenuCategory,
            Item,
            DeliveryArea,
            Coupon,
            Order,
            OrderItem,
            AppVersion,
            FcmTokenStatus,
            NotificationReceipt,
            OrderEvent,
            Quote,
            QuoteLine,
            AppliedCoupon,
            GeoPoint,
            UserRole,
            OrderStatus,
            PaymentMethod,
            DiscountType,
            Platform,
            AppType,
            NotificationTarget,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            AuthTokens,
            RefreshTokenRequest,
            VerifyOtpRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            CreateAddressRequest,
            UpdateAddressRequest,
            CreateCouponRequest,
            UpdateCouponRequest,
            CreateDeliveryAreaRequest,
            UpdateDeliveryAreaRequest,
            OrderLineRequest,
            PreviewOrderRequest,
            CreateOrderRequest,
            CancelOrderRequest,
            UpdateOrderStatusRequest,
            UpdateProfileRequest,
            ChangePasswordRequest,
            AvailabilityRequest,
            RegisterFcmTokenRequest,
            BroadcastNotificationRequest,
            SendNotificationRequest,
            UpsertVersionRequest,
            VersionCheck,
            health::HealthData,
            Meta,
            ErrorResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness checks"),
        (name = "Auth", description = "Accounts, tokens and one-time codes"),
        (name = "Addresses", description = "Customer delivery addresses"),
        (name = "Ads", description = "Promotional banners"),
        (name = "Vendors", description = "Restaurants and shops"),
        (name = "Menu", description = "Menu categories and items"),
        (name = "Coupons", description = "Discount codes"),
        (name = "Delivery areas", description = "Zones served and their fees"),
        (name = "Orders", description = "Customer ordering"),
        (name = "Admin", description = "Order administration"),
        (name = "Delivery", description = "Driver order handling and profile"),
        (name = "Notifications", description = "Device tokens and push messages"),
        (name = "Versions", description = "Client app release tracking"),
        (name = "Realtime", description = "WebSocket feed for drivers"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
