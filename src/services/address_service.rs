use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use sea_orm::sea_query::Expr;
use uuid::Uuid;

use crate::{
    domain::UserRole,
    dto::addresses::{CreateAddressRequest, UpdateAddressRequest},
    entity::{
        addresses::{self, ActiveModel as AddressActive, Column as AddressCol, Entity as Addresses},
        orders::{Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::Address,
    response::ApiResponse,
    state::AppState,
};

pub async fn list_addresses(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Vec<Address>>> {
    ensure_role(user, UserRole::User)?;
    let items = Addresses::find()
        .filter(AddressCol::UserId.eq(user.user_id))
        .order_by_desc(AddressCol::IsDefault)
        .order_by_desc(AddressCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Address::from)
        .collect();
    Ok(ApiResponse::ok("Addresses", items))
}

pub async fn get_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Address>> {
    ensure_role(user, UserRole::User)?;
    let address = find_owned(&state.orm, user.user_id, id).await?;
    Ok(ApiResponse::ok("Address", Address::from(address)))
}

pub async fn get_default_address(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Address>> {
    ensure_role(user, UserRole::User)?;
    let address = Addresses::find()
        .filter(AddressCol::UserId.eq(user.user_id))
        .filter(AddressCol::IsDefault.eq(true))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Default address"))?;
    Ok(ApiResponse::ok("Default address", Address::from(address)))
}

pub async fn create_address(
    state: &AppState,
    user: &AuthUser,
    payload: CreateAddressRequest,
) -> AppResult<ApiResponse<Address>> {
    ensure_role(user, UserRole::User)?;
    payload.location.validate().map_err(AppError::Validation)?;

    let txn = state.orm.begin().await?;
    let has_any = Addresses::find()
        .filter(AddressCol::UserId.eq(user.user_id))
        .one(&txn)
        .await?
        .is_some();
    // The first address always becomes the default.
    let is_default = payload.is_default || !has_any;
    if is_default {
        clear_default(&txn, user.user_id).await?;
    }

    let now = Utc::now();
    let address = AddressActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        label: Set(payload.label),
        street: Set(payload.street),
        city: Set(payload.city),
        details: Set(payload.details),
        longitude: Set(payload.location.longitude()),
        latitude: Set(payload.location.latitude()),
        is_default: Set(is_default),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    Ok(ApiResponse::ok("Address created", Address::from(address)))
}

pub async fn update_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateAddressRequest,
) -> AppResult<ApiResponse<Address>> {
    ensure_role(user, UserRole::User)?;
    let existing = find_owned(&state.orm, user.user_id, id).await?;

    let mut active: AddressActive = existing.into();
    if let Some(label) = payload.label {
        active.label = Set(label);
    }
    if let Some(street) = payload.street {
        active.street = Set(street);
    }
    if let Some(city) = payload.city {
        active.city = Set(city);
    }
    if let Some(details) = payload.details {
        active.details = Set(Some(details));
    }
    if let Some(location) = payload.location {
        location.validate().map_err(AppError::Validation)?;
        active.longitude = Set(location.longitude());
        active.latitude = Set(location.latitude());
    }
    active.updated_at = Set(Utc::now().into());
    let address = active.update(&state.orm).await?;

    Ok(ApiResponse::ok("Address updated", Address::from(address)))
}

pub async fn set_default_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Address>> {
    ensure_role(user, UserRole::User)?;
    let txn = state.orm.begin().await?;
    let existing = find_owned(&txn, user.user_id, id).await?;
    clear_default(&txn, user.user_id).await?;

    let mut active: AddressActive = existing.into();
    active.is_default = Set(true);
    active.updated_at = Set(Utc::now().into());
    let address = active.update(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::ok("Default address updated", Address::from(address)))
}

pub async fn delete_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_role(user, UserRole::User)?;
    let txn = state.orm.begin().await?;
    let existing = find_owned(&txn, user.user_id, id).await?;
    let in_use = Orders::find()
        .filter(OrderCol::AddressId.eq(existing.id))
        .one(&txn)
        .await?
        .is_some();
    if in_use {
        return Err(AppError::Conflict(
            "Address is used by an order and cannot be deleted".into(),
        ));
    }
    let was_default = existing.is_default;
    Addresses::delete_by_id(existing.id).exec(&txn).await?;

    if was_default {
        let next = Addresses::find()
            .filter(AddressCol::UserId.eq(user.user_id))
            .order_by_desc(AddressCol::CreatedAt)
            .one(&txn)
            .await?;
        if let Some(next) = next {
            let mut active: AddressActive = next.into();
            active.is_default = Set(true);
            active.update(&txn).await?;
        }
    }
    txn.commit().await?;

    Ok(ApiResponse::ok("Address deleted", serde_json::json!({ "id": id })))
}

async fn find_owned<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    id: Uuid,
) -> AppResult<addresses::Model> {
    Addresses::find_by_id(id)
        .filter(AddressCol::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Address"))
}

async fn clear_default<C: ConnectionTrait>(db: &C, user_id: Uuid) -> AppResult<()> {
    Addresses::update_many()
        .col_expr(AddressCol::IsDefault, Expr::value(false))
        .filter(AddressCol::UserId.eq(user_id))
        .filter(AddressCol::IsDefault.eq(true))
        .exec(db)
        .await?;
    Ok(())
}
