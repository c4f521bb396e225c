use axum::{
    Json, Router,
    extract::State,
    routing::{get, patch},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        orders::UpdateOrderStatusRequest,
        users::{AvailabilityRequest, ChangePasswordRequest, UpdateProfileRequest},
    },
    error::AppResult,
    middleware::{auth::AuthUser, extract::{AppJson, AppPath, AppQuery}},
    models::{Order, User},
    response::ApiResponse,
    routes::params::{OrderListQuery, Pagination},
    services::delivery_service,
    state::AppState,
};

pub fn orders_router() -> Router<AppState> {
    Router::new()
        .route("/available", get(list_available_orders))
        .route("/mine", get(list_my_orders))
        .route("/{id}", get(get_delivery_order))
        .route("/{id}/assign", patch(assign_order))
        .route("/{id}/status", patch(update_delivery_status))
}

pub fn profile_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_profile).put(update_profile))
        .route("/password", patch(change_password))
        .route("/availability", patch(set_availability))
}

#[utoipa::path(
    get,
    path = "/api/delivery/orders/available",
    params(Pagination),
    responses(
        (status = 200, description = "Unassigned pending or preparing orders, oldest first", body = ApiResponse<Vec<Order>>),
        (status = 403, description = "Not a delivery account")
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery"
)]
pub async fn list_available_orders(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(pagination): AppQuery<Pagination>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let resp = delivery_service::list_available_orders(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/delivery/orders/mine",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Orders assigned to the caller", body = ApiResponse<Vec<Order>>),
        (status = 403, description = "Not a delivery account")
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery"
)]
pub async fn list_my_orders(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<OrderListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let resp = delivery_service::list_my_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/delivery/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = ApiResponse<Order>),
        (status = 404, description = "Not assigned to the caller and not available")
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery"
)]
pub async fn get_delivery_order(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = delivery_service::get_delivery_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/delivery/orders/{id}/assign",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order assigned to the caller", body = ApiResponse<Order>),
        (status = 400, description = "Caller unavailable or order not assignable"),
        (status = 409, description = "Another driver took the order")
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery"
)]
pub async fn assign_order(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = delivery_service::assign_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/delivery/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<Order>),
        (status = 400, description = "Status not settable by drivers or transition not allowed"),
        (status = 403, description = "Order is not assigned to the caller")
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery"
)]
pub async fn update_delivery_status(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = delivery_service::update_delivery_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/delivery/profile",
    responses(
        (status = 200, description = "Driver profile", body = ApiResponse<User>),
        (status = 403, description = "Not a delivery account")
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = delivery_service::get_profile(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/delivery/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<User>),
        (status = 409, description = "Phone number already in use")
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    payload.validate()?;
    let resp = delivery_service::update_profile(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/delivery/profile/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed, other sessions revoked"),
        (status = 400, description = "Current password is wrong")
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery"
)]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    payload.validate()?;
    let resp = delivery_service::change_password(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/delivery/profile/availability",
    request_body = AvailabilityRequest,
    responses((status = 200, description = "Availability updated", body = ApiResponse<User>)),
    security(("bearer_auth" = [])),
    tag = "Delivery"
)]
pub async fn set_availability(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<AvailabilityRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = delivery_service::set_availability(&state, &user, payload).await?;
    Ok(Json(resp))
}
