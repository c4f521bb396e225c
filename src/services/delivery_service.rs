use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::{
        UserRole,
        order_status::{ASSIGNABLE, DRIVER_SETTABLE},
    },
    dto::{
        orders::UpdateOrderStatusRequest,
        users::{AvailabilityRequest, ChangePasswordRequest, UpdateProfileRequest},
    },
    entity::{
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        users::{self, ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::{Order, User},
    response::ApiResponse,
    routes::params::{OrderListQuery, Pagination},
    security,
    services::{
        auth_service::revoke_all_refresh_tokens,
        fetch_page,
        order_service::{attach_items, parse_status_filter, with_items},
    },
    state::AppState,
};

fn available_condition() -> Condition {
    Condition::all()
        .add(OrderCol::DriverId.is_null())
        .add(OrderCol::Status.is_in(ASSIGNABLE))
}

pub async fn list_available_orders(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<Order>>> {
    ensure_role(user, UserRole::Delivery)?;
    let finder = Orders::find()
        .filter(available_condition())
        .order_by_asc(OrderCol::CreatedAt);
    let (rows, meta) = fetch_page(finder, &state.orm, &pagination).await?;
    let orders = attach_items(&state.orm, rows).await?;
    Ok(ApiResponse::success("Available orders", orders, Some(meta)))
}

pub async fn list_my_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<Vec<Order>>> {
    ensure_role(user, UserRole::Delivery)?;
    let mut condition = Condition::all().add(OrderCol::DriverId.eq(user.user_id));
    if let Some(status) = parse_status_filter(query.status.as_deref())? {
        condition = condition.add(OrderCol::Status.eq(status));
    }
    let finder = Orders::find()
        .filter(condition)
        .order_by_desc(OrderCol::UpdatedAt);
    let (rows, meta) = fetch_page(finder, &state.orm, &query.pagination()).await?;
    let orders = attach_items(&state.orm, rows).await?;
    Ok(ApiResponse::success("Assigned orders", orders, Some(meta)))
}

pub async fn get_delivery_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    ensure_role(user, UserRole::Delivery)?;
    let visible = Condition::any()
        .add(OrderCol::DriverId.eq(user.user_id))
        .add(available_condition());
    let order = Orders::find_by_id(id)
        .filter(visible)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;
    let order = with_items(&state.orm, order).await?;
    Ok(ApiResponse::ok("Order", order))
}

pub async fn assign_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    ensure_role(user, UserRole::Delivery)?;
    let txn = state.orm.begin().await?;

    let driver = Users::find_by_id(user.user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".into()))?;
    if !driver.is_available {
        return Err(AppError::BadRequest(
            "Set yourself as available before taking orders".into(),
        ));
    }

    let existing = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;
    if existing.driver_id.is_some() {
        return Err(AppError::Conflict("Order is already assigned to a driver".into()));
    }
    if !existing.status.is_assignable() {
        return Err(AppError::BadRequest(format!(
            "Orders in status {} cannot be assigned",
            existing.status
        )));
    }

    let mut active: OrderActive = existing.into();
    active.driver_id = Set(Some(user.user_id));
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;
    let order = with_items(&txn, order).await?;
    txn.commit().await?;

    tracing::info!(order_id = %order.id, driver_id = %user.user_id, "order assigned");
    state.events.order_assigned(&order, user.user_id);
    audit::record(
        &state.pool,
        user.user_id,
        "order_assign",
        "orders",
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    Ok(ApiResponse::ok("Order assigned", order))
}

pub async fn update_delivery_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_role(user, UserRole::Delivery)?;
    if !DRIVER_SETTABLE.contains(&payload.status) {
        return Err(AppError::BadRequest(format!(
            "Drivers cannot set status {}",
            payload.status
        )));
    }

    let txn = state.orm.begin().await?;
    let existing = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;
    if existing.driver_id != Some(user.user_id) {
        return Err(AppError::Forbidden);
    }

    let previous = existing.status;
    let next = previous
        .transition(payload.status)
        .map_err(AppError::BadRequest)?;

    let mut active: OrderActive = existing.into();
    active.status = Set(next);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;
    let order = with_items(&txn, order).await?;
    txn.commit().await?;

    tracing::info!(order_id = %order.id, from = %previous, to = %next, "order status changed by driver");
    state.events.status_changed(&order);
    audit::record(
        &state.pool,
        user.user_id,
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "from": previous, "to": next }),
    )
    .await;

    Ok(ApiResponse::ok("Order status updated", order))
}

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    ensure_role(user, UserRole::Delivery)?;
    let driver = find_driver(state, user.user_id).await?;
    Ok(ApiResponse::ok("Profile", User::from(driver)))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_role(user, UserRole::Delivery)?;
    let driver = find_driver(state, user.user_id).await?;

    if let Some(phone) = payload.phone.as_deref() {
        let taken = Users::find()
            .filter(UserCol::Phone.eq(phone))
            .filter(UserCol::Id.ne(user.user_id))
            .one(&state.orm)
            .await?
            .is_some();
        if taken {
            return Err(AppError::Conflict("Phone number is already in use".into()));
        }
    }

    let phone_changed = payload
        .phone
        .as_deref()
        .is_some_and(|p| driver.phone.as_deref() != Some(p));
    let mut active: UserActive = driver.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if phone_changed {
        active.phone_verified = Set(false);
    }
    active.updated_at = Set(Utc::now().into());
    let driver = active.update(&state.orm).await?;

    Ok(ApiResponse::ok("Profile updated", User::from(driver)))
}

pub async fn change_password(
    state: &AppState,
    user: &AuthUser,
    payload: ChangePasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_role(user, UserRole::Delivery)?;
    let driver = find_driver(state, user.user_id).await?;
    if !security::verify_password(&payload.current_password, &driver.password_hash)? {
        return Err(AppError::BadRequest("Current password is incorrect".into()));
    }

    let password_hash = security::hash_password(&payload.new_password)?;
    let txn = state.orm.begin().await?;
    let mut active: UserActive = driver.into();
    active.password_hash = Set(password_hash);
    active.updated_at = Set(Utc::now().into());
    active.update(&txn).await?;
    let revoked = revoke_all_refresh_tokens(&txn, user.user_id).await?;
    txn.commit().await?;

    tracing::debug!(user_id = %user.user_id, revoked, "password changed");
    audit::record(
        &state.pool,
        user.user_id,
        "password_change",
        "users",
        serde_json::json!({ "revoked_sessions": revoked }),
    )
    .await;

    Ok(ApiResponse::ok("Password updated", serde_json::json!({})))
}

pub async fn set_availability(
    state: &AppState,
    user: &AuthUser,
    payload: AvailabilityRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_role(user, UserRole::Delivery)?;
    let driver = find_driver(state, user.user_id).await?;
    let mut active: UserActive = driver.into();
    active.is_available = Set(payload.is_available);
    active.updated_at = Set(Utc::now().into());
    let driver = active.update(&state.orm).await?;

    let message = if payload.is_available {
        "You are now available"
    } else {
        "You are now offline"
    };
    Ok(ApiResponse::ok(message, User::from(driver)))
}

async fn find_driver(state: &AppState, user_id: Uuid) -> AppResult<users::Model> {
    Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
}
