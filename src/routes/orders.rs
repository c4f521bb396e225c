use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::pricing::Quote,
    dto::orders::{CancelOrderRequest, CreateOrderRequest, PreviewOrderRequest},
    error::AppResult,
    middleware::{auth::AuthUser, extract::{AppJson, AppPath, AppQuery}},
    models::Order,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/preview", post(preview_order))
        .route("/{id}", get(get_order))
        .route("/{id}/cancel", patch(cancel_order))
}

#[utoipa::path(
    post,
    path = "/api/user/orders/preview",
    request_body = PreviewOrderRequest,
    responses(
        (status = 200, description = "Priced basket, nothing is stored", body = ApiResponse<Quote>),
        (status = 400, description = "Item, area or coupon rejected"),
        (status = 404, description = "Vendor or area not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn preview_order(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<PreviewOrderRequest>,
) -> AppResult<Json<ApiResponse<Quote>>> {
    payload.validate()?;
    let resp = order_service::preview_order(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/user/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = ApiResponse<Order>),
        (status = 400, description = "Item, area or coupon rejected"),
        (status = 404, description = "Vendor, area or address not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Order>>)> {
    payload.validate()?;
    let resp = order_service::create_order(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/user/orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Caller's orders, newest first", body = ApiResponse<Vec<Order>>),
        (status = 400, description = "Unknown status filter")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<OrderListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let resp = order_service::list_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/user/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with its items", body = ApiResponse<Order>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/user/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = CancelOrderRequest,
    responses(
        (status = 200, description = "Order cancelled", body = ApiResponse<Order>),
        (status = 400, description = "Order is no longer pending"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    payload: Option<AppJson<CancelOrderRequest>>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let payload = payload.map(|AppJson(p)| p).unwrap_or_default();
    payload.validate()?;
    let resp = order_service::cancel_order(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
