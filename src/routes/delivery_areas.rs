use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::delivery_areas::{CreateDeliveryAreaRequest, UpdateDeliveryAreaRequest},
    error::AppResult,
    middleware::{auth::AuthUser, extract::{AppJson, AppPath, AppQuery}},
    models::DeliveryArea,
    response::ApiResponse,
    routes::params::Pagination,
    services::delivery_area_service,
    state::AppState,
};

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_areas).post(create_area))
        .route("/{id}", get(get_area).put(update_area).delete(delete_area))
}

pub fn user_router() -> Router<AppState> {
    Router::new().route("/", get(list_active_areas))
}

#[utoipa::path(
    get,
    path = "/api/admin/delivery-areas",
    params(Pagination),
    responses(
        (status = 200, description = "Delivery areas", body = ApiResponse<Vec<DeliveryArea>>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery areas"
)]
pub async fn list_areas(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(pagination): AppQuery<Pagination>,
) -> AppResult<Json<ApiResponse<Vec<DeliveryArea>>>> {
    let resp = delivery_area_service::list_areas(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/delivery-areas",
    request_body = CreateDeliveryAreaRequest,
    responses(
        (status = 201, description = "Area created", body = ApiResponse<DeliveryArea>),
        (status = 409, description = "Name already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery areas"
)]
pub async fn create_area(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateDeliveryAreaRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<DeliveryArea>>)> {
    payload.validate()?;
    let resp = delivery_area_service::create_area(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/admin/delivery-areas/{id}",
    params(("id" = Uuid, Path, description = "Delivery area id")),
    responses(
        (status = 200, description = "Delivery area", body = ApiResponse<DeliveryArea>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery areas"
)]
pub async fn get_area(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<DeliveryArea>>> {
    let resp = delivery_area_service::get_area(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/delivery-areas/{id}",
    params(("id" = Uuid, Path, description = "Delivery area id")),
    request_body = UpdateDeliveryAreaRequest,
    responses(
        (status = 200, description = "Area updated", body = ApiResponse<DeliveryArea>),
        (status = 404, description = "Not found"),
        (status = 409, description = "Name already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery areas"
)]
pub async fn update_area(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateDeliveryAreaRequest>,
) -> AppResult<Json<ApiResponse<DeliveryArea>>> {
    payload.validate()?;
    let resp = delivery_area_service::update_area(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/delivery-areas/{id}",
    params(("id" = Uuid, Path, description = "Delivery area id")),
    responses(
        (status = 200, description = "Area deleted"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Orders still reference the area")
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery areas"
)]
pub async fn delete_area(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = delivery_area_service::delete_area(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/user/delivery-areas",
    responses((status = 200, description = "Active areas by name", body = ApiResponse<Vec<DeliveryArea>>)),
    security(("bearer_auth" = [])),
    tag = "Delivery areas"
)]
pub async fn list_active_areas(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<DeliveryArea>>>> {
    let resp = delivery_area_service::list_active_areas(&state).await?;
    Ok(Json(resp))
}
