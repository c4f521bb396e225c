use axum::{Json, Router, extract::State, routing::{get, post}};
use validator::Validate;

use crate::{
    dto::fcm::RegisterFcmTokenRequest,
    error::AppResult,
    middleware::{auth::AuthUser, extract::AppJson},
    models::FcmTokenStatus,
    response::ApiResponse,
    services::fcm_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register_token).delete(remove_token))
        .route("/status", get(token_status))
}

#[utoipa::path(
    post,
    path = "/api/fcm-token",
    request_body = RegisterFcmTokenRequest,
    responses((status = 200, description = "Token stored, replacing any previous one", body = ApiResponse<FcmTokenStatus>)),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn register_token(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<RegisterFcmTokenRequest>,
) -> AppResult<Json<ApiResponse<FcmTokenStatus>>> {
    payload.validate()?;
    let resp = fcm_service::register_token(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/fcm-token",
    responses(
        (status = 200, description = "Token removed"),
        (status = 404, description = "No token registered")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn remove_token(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = fcm_service::remove_token(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/fcm-token/status",
    responses((status = 200, description = "Whether a token is registered", body = ApiResponse<FcmTokenStatus>)),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn token_status(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<FcmTokenStatus>>> {
    let resp = fcm_service::token_status(&state, &user).await?;
    Ok(Json(resp))
}
