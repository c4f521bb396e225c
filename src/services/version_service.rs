use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    audit,
    domain::{
        AppType,
        version::{AppVersionNumber, upgrade_advice},
    },
    dto::versions::{UpsertVersionRequest, VersionCheck, VersionQuery},
    entity::app_versions::{ActiveModel as VersionActive, Column as VersionCol, Entity as AppVersions},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::AppVersion,
    response::ApiResponse,
    state::AppState,
};

pub async fn get_version(
    state: &AppState,
    app_type: AppType,
    query: VersionQuery,
) -> AppResult<ApiResponse<VersionCheck>> {
    let record = AppVersions::find()
        .filter(VersionCol::AppType.eq(app_type))
        .filter(VersionCol::Platform.eq(query.platform))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("App version"))?;

    let advice = match query.current_version.as_deref() {
        Some(current) => {
            let current = AppVersionNumber::parse(current).map_err(AppError::BadRequest)?;
            let latest = AppVersionNumber::parse(&record.latest_version)
                .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
            let min_supported = AppVersionNumber::parse(&record.min_supported_version)
                .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
            Some(upgrade_advice(&current, &latest, &min_supported, record.is_mandatory))
        }
        None => None,
    };

    Ok(ApiResponse::ok(
        "App version",
        VersionCheck {
            version: AppVersion::from(record),
            update_available: advice.map(|a| a.update_available),
            must_update: advice.map(|a| a.must_update),
        },
    ))
}

pub async fn upsert_version(
    state: &AppState,
    user: &AuthUser,
    payload: UpsertVersionRequest,
) -> AppResult<ApiResponse<AppVersion>> {
    ensure_admin(user)?;
    let latest = AppVersionNumber::parse(&payload.latest_version).map_err(AppError::Validation)?;
    let min_supported =
        AppVersionNumber::parse(&payload.min_supported_version).map_err(AppError::Validation)?;
    if min_supported > latest {
        return Err(AppError::Validation(
            "minSupportedVersion must not be newer than latestVersion".into(),
        ));
    }

    let existing = AppVersions::find()
        .filter(VersionCol::AppType.eq(payload.app_type))
        .filter(VersionCol::Platform.eq(payload.platform))
        .one(&state.orm)
        .await?;

    let now = Utc::now();
    let saved = match existing {
        Some(model) => {
            let mut active: VersionActive = model.into();
            active.latest_version = Set(payload.latest_version);
            active.min_supported_version = Set(payload.min_supported_version);
            active.is_mandatory = Set(payload.is_mandatory);
            active.release_notes = Set(payload.release_notes);
            active.updated_at = Set(now.into());
            active.update(&state.orm).await?
        }
        None => {
            VersionActive {
                id: Set(Uuid::new_v4()),
                app_type: Set(payload.app_type),
                platform: Set(payload.platform),
                latest_version: Set(payload.latest_version),
                min_supported_version: Set(payload.min_supported_version),
                is_mandatory: Set(payload.is_mandatory),
                release_notes: Set(payload.release_notes),
                updated_at: Set(now.into()),
            }
            .insert(&state.orm)
            .await?
        }
    };

    audit::record(
        &state.pool,
        user.user_id,
        "app_version_upsert",
        "app_versions",
        serde_json::json!({
            "app_type": saved.app_type,
            "platform": saved.platform,
            "latest_version": saved.latest_version,
        }),
    )
    .await;

    Ok(ApiResponse::ok("App version saved", AppVersion::from(saved)))
}
