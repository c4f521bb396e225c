use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use uuid::Uuid;

use crate::{
    middleware::extract::{AppPath, AppQuery},
    error::AppResult,
    models::Ad,
    response::ApiResponse,
    routes::params::AdQuery,
    services::ad_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_ads))
        .route("/{id}", get(get_ad))
}

#[utoipa::path(
    get,
    path = "/api/ads",
    params(AdQuery),
    responses((status = 200, description = "Active ads", body = ApiResponse<Vec<Ad>>)),
    tag = "Ads"
)]
pub async fn list_ads(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<AdQuery>,
) -> AppResult<Json<ApiResponse<Vec<Ad>>>> {
    let resp = ad_service::list_ads(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/ads/{id}",
    params(("id" = Uuid, Path, description = "Ad id")),
    responses(
        (status = 200, description = "Ad", body = ApiResponse<Ad>),
        (status = 404, description = "Not found or inactive")
    ),
    tag = "Ads"
)]
pub async fn get_ad(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<Ad>>> {
    let resp = ad_service::get_ad(&state, id).await?;
    Ok(Json(resp))
}
