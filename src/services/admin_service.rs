use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::UpdateOrderStatusRequest,
    entity::orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Order,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::{
        fetch_page,
        order_service::{attach_items, parse_status_filter, release_coupon, releases_coupon, with_items},
    },
    state::AppState,
};

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<Vec<Order>>> {
    ensure_admin(user)?;
    let mut condition = Condition::all();
    if let Some(status) = parse_status_filter(query.status.as_deref())? {
        condition = condition.add(OrderCol::Status.eq(status));
    }
    let finder = Orders::find()
        .filter(condition)
        .order_by_desc(OrderCol::CreatedAt);
    let (rows, meta) = fetch_page(finder, &state.orm, &query.pagination()).await?;
    let orders = attach_items(&state.orm, rows).await?;
    Ok(ApiResponse::success("Orders", orders, Some(meta)))
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;
    let order = with_items(&state.orm, order).await?;
    Ok(ApiResponse::ok("Order", order))
}

pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;
    let order = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;
    // Usage rows cascade with the order, so the counter must come down first.
    release_coupon(&txn, &order).await?;
    Orders::delete_by_id(order.id).exec(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "order_delete",
        "orders",
        serde_json::json!({ "order_id": id }),
    )
    .await;

    Ok(ApiResponse::ok("Order deleted", serde_json::json!({ "id": id })))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;
    let existing = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    let previous = existing.status;
    let next = previous
        .transition(payload.status)
        .map_err(AppError::BadRequest)?;

    let mut active: OrderActive = existing.into();
    active.status = Set(next);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;
    if releases_coupon(next) {
        release_coupon(&txn, &order).await?;
    }
    let order = with_items(&txn, order).await?;
    txn.commit().await?;

    tracing::info!(order_id = %order.id, from = %previous, to = %next, "order status changed by admin");
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
