use axum::{Json, Router, extract::State, routing::post};
use validator::Validate;

use crate::{
    dto::notifications::{BroadcastNotificationRequest, SendNotificationRequest},
    error::AppResult,
    middleware::{auth::AuthUser, extract::AppJson},
    models::NotificationReceipt,
    response::ApiResponse,
    services::notification_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/broadcast", post(broadcast))
        .route("/send", post(send_to_users))
}

#[utoipa::path(
    post,
    path = "/api/admin/notifications/broadcast",
    request_body = BroadcastNotificationRequest,
    responses(
        (status = 200, description = "Pushed to every device of the target group", body = ApiResponse<NotificationReceipt>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn broadcast(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<BroadcastNotificationRequest>,
) -> AppResult<Json<ApiResponse<NotificationReceipt>>> {
    payload.validate()?;
    let resp = notification_service::broadcast(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/notifications/send",
    request_body = SendNotificationRequest,
    responses(
        (status = 200, description = "Pushed to the listed users", body = ApiResponse<NotificationReceipt>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn send_to_users(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<SendNotificationRequest>,
) -> AppResult<Json<ApiResponse<NotificationReceipt>>> {
    payload.validate()?;
    let resp = notification_service::send_to_users(&state, &user, payload).await?;
    Ok(Json(resp))
}
