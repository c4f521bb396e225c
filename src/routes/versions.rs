use axum::{
    Json, Router,
    extract::State,
    routing::{get, put},
};
use validator::Validate;

use crate::{
    domain::AppType,
    dto::versions::{UpsertVersionRequest, VersionCheck, VersionQuery},
    error::AppResult,
    middleware::{auth::AuthUser, extract::{AppJson, AppPath, AppQuery}},
    models::AppVersion,
    response::ApiResponse,
    services::version_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{app_type}", get(get_version))
}

pub fn admin_router() -> Router<AppState> {
    Router::new().route("/", put(upsert_version))
}

#[utoipa::path(
    get,
    path = "/api/versions/{app_type}",
    params(
        ("app_type" = AppType, Path, description = "user, vendor or delivery"),
        VersionQuery
    ),
    responses(
        (status = 200, description = "Release info, with upgrade advice when currentVersion is given", body = ApiResponse<VersionCheck>),
        (status = 400, description = "Malformed version"),
        (status = 404, description = "No release recorded for this app and platform")
    ),
    tag = "Versions"
)]
pub async fn get_version(
    State(state): State<AppState>,
    AppPath(app_type): AppPath<AppType>,
    AppQuery(query): AppQuery<VersionQuery>,
) -> AppResult<Json<ApiResponse<VersionCheck>>> {
    let resp = version_service::get_version(&state, app_type, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/versions",
    request_body = UpsertVersionRequest,
    responses(
        (status = 200, description = "Release info saved", body = ApiResponse<AppVersion>),
        (status = 400, description = "Malformed version"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Versions"
)]
pub async fn upsert_version(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<UpsertVersionRequest>,
) -> AppResult<Json<ApiResponse<AppVersion>>> {
    payload.validate()?;
    let resp = version_service::upsert_version(&state, &user, payload).await?;
    Ok(Json(resp))
}
