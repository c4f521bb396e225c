use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::coupons::{CreateCouponRequest, UpdateCouponRequest},
    error::AppResult,
    middleware::{auth::AuthUser, extract::{AppJson, AppPath, AppQuery}},
    models::Coupon,
    response::ApiResponse,
    routes::params::CouponListQuery,
    services::coupon_service,
    state::AppState,
};

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_coupons).post(create_coupon))
        .route(
            "/{id}",
            get(get_coupon).put(update_coupon).delete(delete_coupon),
        )
        .route("/{id}/toggle", patch(toggle_coupon))
}

pub fn user_router() -> Router<AppState> {
    Router::new().route("/", get(list_available_coupons))
}

#[utoipa::path(
    get,
    path = "/api/admin/coupons",
    params(CouponListQuery),
    responses(
        (status = 200, description = "Coupons", body = ApiResponse<Vec<Coupon>>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Coupons"
)]
pub async fn list_coupons(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<CouponListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Coupon>>>> {
    let resp = coupon_service::list_coupons(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/coupons",
    request_body = CreateCouponRequest,
    responses(
        (status = 201, description = "Coupon created", body = ApiResponse<Coupon>),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Code already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Coupons"
)]
pub async fn create_coupon(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateCouponRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Coupon>>)> {
    payload.validate()?;
    let resp = coupon_service::create_coupon(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/admin/coupons/{id}",
    params(("id" = Uuid, Path, description = "Coupon id")),
    responses(
        (status = 200, description = "Coupon", body = ApiResponse<Coupon>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Coupons"
)]
pub async fn get_coupon(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<Coupon>>> {
    let resp = coupon_service::get_coupon(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/coupons/{id}",
    params(("id" = Uuid, Path, description = "Coupon id")),
    request_body = UpdateCouponRequest,
    responses(
        (status = 200, description = "Coupon updated", body = ApiResponse<Coupon>),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Coupons"
)]
pub async fn update_coupon(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateCouponRequest>,
) -> AppResult<Json<ApiResponse<Coupon>>> {
    payload.validate()?;
    let resp = coupon_service::update_coupon(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/coupons/{id}",
    params(("id" = Uuid, Path, description = "Coupon id")),
    responses(
        (status = 200, description = "Coupon deleted"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Coupons"
)]
pub async fn delete_coupon(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = coupon_service::delete_coupon(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/coupons/{id}/toggle",
    params(("id" = Uuid, Path, description = "Coupon id")),
    responses(
        (status = 200, description = "Active flag flipped", body = ApiResponse<Coupon>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Coupons"
)]
pub async fn toggle_coupon(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<Coupon>>> {
    let resp = coupon_service::toggle_coupon(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/user/coupons",
    responses((status = 200, description = "Coupons the caller can still use", body = ApiResponse<Vec<Coupon>>)),
    security(("bearer_auth" = [])),
    tag = "Coupons"
)]
pub async fn list_available_coupons(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<Coupon>>>> {
    let resp = coupon_service::list_available_coupons(&state, &user).await?;
    Ok(Json(resp))
}
