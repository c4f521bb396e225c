use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, RelationTrait, Set};
use sea_orm::JoinType;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    audit,
    domain::NotificationTarget,
    dto::notifications::{BroadcastNotificationRequest, SendNotificationRequest},
    entity::{
        fcm_tokens::{self, Column as FcmCol, Entity as FcmTokens},
        notifications::ActiveModel as NotificationActive,
        users::Column as UserCol,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::NotificationReceipt,
    notify::PushMessage,
    response::ApiResponse,
    state::AppState,
};

pub async fn broadcast(
    state: &AppState,
    user: &AuthUser,
    payload: BroadcastNotificationRequest,
) -> AppResult<ApiResponse<NotificationReceipt>> {
    ensure_admin(user)?;
    if payload.target == NotificationTarget::Selected {
        return Err(AppError::BadRequest(
            "Use the send endpoint to notify selected users".into(),
        ));
    }

    let mut finder = FcmTokens::find();
    if let Some(role) = payload.target.role() {
        finder = finder
            .join(JoinType::InnerJoin, fcm_tokens::Relation::Users.def())
            .filter(UserCol::Role.eq(role));
    }
    let tokens = finder
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|row| row.token)
        .collect::<Vec<_>>();

    let message = PushMessage {
        title: payload.title,
        body: payload.body,
        data: payload.data,
    };
    let receipt = deliver(state, user, payload.target, tokens, message).await?;
    Ok(ApiResponse::ok("Notification broadcast", receipt))
}

pub async fn send_to_users(
    state: &AppState,
    user: &AuthUser,
    payload: SendNotificationRequest,
) -> AppResult<ApiResponse<NotificationReceipt>> {
    ensure_admin(user)?;
    let tokens = FcmTokens::find()
        .filter(FcmCol::UserId.is_in(payload.user_ids.clone()))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|row| row.token)
        .collect::<Vec<_>>();

    let mut data = payload.data.unwrap_or_else(|| serde_json::json!({}));
    if let Value::Object(map) = &mut data {
        map.insert("userIds".into(), serde_json::json!(payload.user_ids));
    }
    let message = PushMessage {
        title: payload.title,
        body: payload.body,
        data: Some(data),
    };
    let receipt = deliver(state, user, NotificationTarget::Selected, tokens, message).await?;
    Ok(ApiResponse::ok("Notification sent", receipt))
}

/// Hands the message to the push channel and stores what was sent.
async fn deliver(
    state: &AppState,
    user: &AuthUser,
    target: NotificationTarget,
    tokens: Vec<String>,
    message: PushMessage,
) -> AppResult<NotificationReceipt> {
    let accepted = if tokens.is_empty() {
        0
    } else {
        match state.push.send(&tokens, &message).await {
            Ok(accepted) => accepted,
            Err(err) => {
                tracing::warn!(error = %err, recipients = tokens.len(), "push delivery failed");
                0
            }
        }
    };
    let recipient_count = i32::try_from(accepted).unwrap_or(i32::MAX);

    let record = NotificationActive {
        id: Set(Uuid::new_v4()),
        title: Set(message.title),
        body: Set(message.body),
        target: Set(target),
        recipient_count: Set(recipient_count),
        data: Set(message.data),
        sent_by: Set(Some(user.user_id)),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "notification_send",
        "notifications",
        serde_json::json!({ "notification_id": record.id, "recipients": recipient_count }),
    )
    .await;

    Ok(NotificationReceipt {
        notification_id: record.id,
        target,
        recipient_count,
    })
}
