use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::delivery_areas::{CreateDeliveryAreaRequest, UpdateDeliveryAreaRequest},
    entity::{
        delivery_areas::{ActiveModel as AreaActive, Column as AreaCol, Entity as DeliveryAreas},
        orders::{Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::DeliveryArea,
    response::ApiResponse,
    routes::params::Pagination,
    services::fetch_page,
    state::AppState,
};

pub async fn list_active_areas(state: &AppState) -> AppResult<ApiResponse<Vec<DeliveryArea>>> {
    let items = DeliveryAreas::find()
        .filter(AreaCol::IsActive.eq(true))
        .order_by_asc(AreaCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(DeliveryArea::from)
        .collect();
    Ok(ApiResponse::ok("Delivery areas", items))
}

pub async fn list_areas(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<DeliveryArea>>> {
    ensure_admin(user)?;
    let finder = DeliveryAreas::find().order_by_asc(AreaCol::Name);
    let (rows, meta) = fetch_page(finder, &state.orm, &pagination).await?;
    let items = rows.into_iter().map(DeliveryArea::from).collect();
    Ok(ApiResponse::success("Delivery areas", items, Some(meta)))
}

pub async fn get_area(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<DeliveryArea>> {
    ensure_admin(user)?;
    let area = DeliveryAreas::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Delivery area"))?;
    Ok(ApiResponse::ok("Delivery area", DeliveryArea::from(area)))
}

pub async fn create_area(
    state: &AppState,
    user: &AuthUser,
    payload: CreateDeliveryAreaRequest,
) -> AppResult<ApiResponse<DeliveryArea>> {
    ensure_admin(user)?;
    ensure_name_free(state, &payload.name, None).await?;

    let area = AreaActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        city: Set(payload.city),
        delivery_fee: Set(payload.delivery_fee),
        estimated_time_minutes: Set(payload.estimated_time_minutes),
        is_active: Set(payload.is_active),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "delivery_area_create",
        "delivery_areas",
        serde_json::json!({ "delivery_area_id": area.id }),
    )
    .await;

    Ok(ApiResponse::ok("Delivery area created", DeliveryArea::from(area)))
}

pub async fn update_area(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateDeliveryAreaRequest,
) -> AppResult<ApiResponse<DeliveryArea>> {
    ensure_admin(user)?;
    let existing = DeliveryAreas::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Delivery area"))?;

    let mut active: AreaActive = existing.into();
    if let Some(name) = payload.name {
        ensure_name_free(state, &name, Some(id)).await?;
        active.name = Set(name);
    }
    if let Some(city) = payload.city {
        active.city = Set(city);
    }
    if let Some(fee) = payload.delivery_fee {
        active.delivery_fee = Set(fee);
    }
    if let Some(minutes) = payload.estimated_time_minutes {
        active.estimated_time_minutes = Set(minutes);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    let area = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "delivery_area_update",
        "delivery_areas",
        serde_json::json!({ "delivery_area_id": area.id }),
    )
    .await;

    Ok(ApiResponse::ok("Delivery area updated", DeliveryArea::from(area)))
}

pub async fn delete_area(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let in_use = Orders::find()
        .filter(OrderCol::DeliveryAreaId.eq(id))
        .one(&state.orm)
        .await?
        .is_some();
    if in_use {
        return Err(AppError::Conflict(
            "Delivery area has orders; deactivate it instead".into(),
        ));
    }
    let result = DeliveryAreas::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Delivery area"));
    }

    audit::record(
        &state.pool,
        user.user_id,
        "delivery_area_delete",
        "delivery_areas",
        serde_json::json!({ "delivery_area_id": id }),
    )
    .await;

    Ok(ApiResponse::ok("Delivery area deleted", serde_json::json!({ "id": id })))
}

async fn ensure_name_free(state: &AppState, name: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut finder = DeliveryAreas::find().filter(AreaCol::Name.eq(name));
    if let Some(id) = except {
        finder = finder.filter(AreaCol::Id.ne(id));
    }
    if finder.one(&state.orm).await?.is_some() {
        return Err(AppError::Conflict(format!("Delivery area '{name}' already exists")));
    }
    Ok(())
}
