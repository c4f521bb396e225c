use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    dto::fcm::RegisterFcmTokenRequest,
    entity::fcm_tokens::{ActiveModel as FcmActive, Column as FcmCol, Entity as FcmTokens},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::FcmTokenStatus,
    response::ApiResponse,
    state::AppState,
};

/// Each user keeps a single device token; registering again replaces it.
pub async fn register_token(
    state: &AppState,
    user: &AuthUser,
    payload: RegisterFcmTokenRequest,
) -> AppResult<ApiResponse<FcmTokenStatus>> {
    let now = Utc::now();
    let existing = FcmTokens::find()
        .filter(FcmCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?;

    let saved = match existing {
        Some(model) => {
            let mut active: FcmActive = model.into();
            active.token = Set(payload.token);
            active.platform = Set(payload.platform);
            active.updated_at = Set(now.into());
            active.update(&state.orm).await?
        }
        None => {
            FcmActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.user_id),
                token: Set(payload.token),
                platform: Set(payload.platform),
                updated_at: Set(now.into()),
            }
            .insert(&state.orm)
            .await?
        }
    };

    tracing::debug!(user_id = %user.user_id, platform = ?saved.platform, "fcm token registered");
    Ok(ApiResponse::ok(
        "Device token registered",
        FcmTokenStatus {
            registered: true,
            platform: Some(saved.platform),
            updated_at: Some(saved.updated_at.with_timezone(&Utc)),
        },
    ))
}

pub async fn remove_token(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = FcmTokens::delete_many()
        .filter(FcmCol::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Device token"));
    }
    Ok(ApiResponse::ok("Device token removed", serde_json::json!({})))
}

pub async fn token_status(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<FcmTokenStatus>> {
    let status = match FcmTokens::find()
        .filter(FcmCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
    {
        Some(model) => FcmTokenStatus {
            registered: true,
            platform: Some(model.platform),
            updated_at: Some(model.updated_at.with_timezone(&Utc)),
        },
        None => FcmTokenStatus {
            registered: false,
            platform: None,
            updated_at: None,
        },
    };
    Ok(ApiResponse::ok("Device token status", status))
}
