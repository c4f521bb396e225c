use food_delivery_api::routes::doc::ApiDoc;
use utoipa::OpenApi;

#[test]
fn every_surface_is_documented() {
    let doc = ApiDoc::openapi();
    let paths = &doc.paths.paths;
    for path in [
        "/health",
        "/health/ready",
        "/api/auth/register",
        "/api/auth/refresh-token",
        "/api/user/addresses/{id}/default",
        "/api/vendors/{id}/items/{item_id}",
        "/api/user/orders/preview",
        "/api/user/orders/{id}/cancel",
        "/api/admin/orders/{id}/status",
        "/api/delivery/orders/{id}/assign",
        "/api/delivery/profile/availability",
        "/api/admin/coupons/{id}/toggle",
        "/api/user/coupons",
        "/api/admin/notifications/broadcast",
        "/api/versions/{app_type}",
        "/ws/delivery",
    ] {
        assert!(paths.contains_key(path), "missing {path}");
    }
}

#[test]
fn bearer_scheme_is_registered() {
    let doc = ApiDoc::openapi();
    let components = doc.components.expect("components");
    assert!(components.security_schemes.contains_key("bearer_auth"));
    assert!(components.schemas.contains_key("Order"));
    assert!(components.schemas.contains_key("OrderEvent"));
    assert!(components.schemas.contains_key("AppliedCoupon"));
}
