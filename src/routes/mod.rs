use std::time::Duration;

use axum::{
    Json, Router,
    http::{HeaderName, HeaderValue, Request, Response, StatusCode, Uri},
    routing::get,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{response::ErrorResponse, state::AppState};

pub mod addresses;
pub mod admin;
pub mod ads;
pub mod auth;
pub mod catalog;
pub mod coupons;
pub mod delivery;
pub mod delivery_areas;
pub mod doc;
pub mod fcm;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod params;
pub mod realtime;
pub mod versions;

const BODY_LIMIT_BYTES: usize = 1024 * 1024;
const CONCURRENCY_LIMIT: usize = 100;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/ads", ads::router())
        .merge(catalog::router())
        .nest("/versions", versions::router())
        .nest("/fcm-token", fcm::router())
        .nest("/user/addresses", addresses::router())
        .nest("/user/coupons", coupons::user_router())
        .nest("/user/delivery-areas", delivery_areas::user_router())
        .nest("/user/orders", orders::router())
        .nest("/delivery/orders", delivery::orders_router())
        .nest("/delivery/profile", delivery::profile_router())
        .nest("/admin/orders", admin::router())
        .nest("/admin/coupons", coupons::admin_router())
        .nest("/admin/delivery-areas", delivery_areas::admin_router())
        .nest("/admin/notifications", notifications::router())
        .nest("/admin/versions", versions::admin_router())
}

/// Full HTTP surface: health checks, the JSON API, the driver socket and the docs UI.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);
    let request_id_header = HeaderName::from_static("x-request-id");
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id
            )
        })
        .on_request(|request: &Request<_>, _span: &tracing::Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "request started"
            );
        })
        .on_response(|response: &Response<_>, latency: Duration, _span: &tracing::Span| {
            tracing::info!(
                status = %response.status(),
                ms = %latency.as_millis(),
                "request finished"
            );
        });

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/ws/delivery", get(realtime::ws_handler))
        .nest("/api", create_api_router())
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .layer(trace_layer)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(ConcurrencyLimitLayer::new(CONCURRENCY_LIMIT))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ErrorResponse>) {
    tracing::debug!(path = %uri.path(), "no route matched");
    (StatusCode::NOT_FOUND, Json(ErrorResponse::fail("Route not found")))
}
