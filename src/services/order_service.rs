use std::{collections::HashMap, str::FromStr};

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::{
        OrderStatus, UserRole,
        pricing::{self, PriceLine, Quote},
    },
    dto::orders::{CancelOrderRequest, CreateOrderRequest, PreviewOrderRequest},
    entity::{
        addresses::{Column as AddressCol, Entity as Addresses},
        coupon_usages::{
            ActiveModel as UsageActive, Column as UsageCol, Entity as CouponUsages,
        },
        coupons::{self, Column as CouponCol, Entity as Coupons},
        delivery_areas::Entity as DeliveryAreas,
        items::{Column as ItemCol, Entity as Items},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{self, ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        vendors::Entity as Vendors,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::Order,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::{coupon_service::normalize_code, fetch_page},
    state::AppState,
};

pub async fn preview_order(
    state: &AppState,
    user: &AuthUser,
    payload: PreviewOrderRequest,
) -> AppResult<ApiResponse<Quote>> {
    ensure_role(user, UserRole::User)?;
    let (quote, _) = price_order(&state.orm, user.user_id, &payload, false).await?;
    Ok(ApiResponse::ok("Order preview", quote))
}

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_role(user, UserRole::User)?;
    let txn = state.orm.begin().await?;

    Addresses::find_by_id(payload.address_id)
        .filter(AddressCol::UserId.eq(user.user_id))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Address"))?;

    let (quote, coupon) = price_order(&txn, user.user_id, &payload.preview(), true).await?;

    let now = Utc::now();
    let order_id = Uuid::new_v4();
    let order = OrderActive {
        id: Set(order_id),
        order_number: Set(build_order_number(order_id, now)),
        user_id: Set(user.user_id),
        vendor_id: Set(payload.vendor_id),
        address_id: Set(payload.address_id),
        delivery_area_id: Set(payload.delivery_area_id),
        driver_id: Set(None),
        coupon_id: Set(coupon.as_ref().map(|c| c.id)),
        status: Set(OrderStatus::Pending),
        payment_method: Set(payload.payment_method),
        subtotal: Set(quote.subtotal),
        discount: Set(quote.discount),
        delivery_fee: Set(quote.delivery_fee),
        total: Set(quote.total),
        notes: Set(payload.notes),
        cancel_reason: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(quote.items.len());
    for line in &quote.items {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            item_id: Set(line.item_id),
            name: Set(line.name.clone()),
            unit_price: Set(line.unit_price),
            quantity: Set(line.quantity),
            line_total: Set(line.line_total),
        }
        .insert(&txn)
        .await?;
        items.push(item);
    }

    if let Some(coupon) = &coupon {
        UsageActive {
            id: Set(Uuid::new_v4()),
            coupon_id: Set(coupon.id),
            user_id: Set(user.user_id),
            order_id: Set(order.id),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        Coupons::update_many()
            .col_expr(CouponCol::UsedCount, Expr::col(CouponCol::UsedCount).add(1))
            .filter(CouponCol::Id.eq(coupon.id))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;

    tracing::info!(order_id = %order.id, order_number = %order.order_number, total = order.total, "order created");
    audit::record(
        &state.pool,
        user.user_id,
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order.id, "coupon_id": order.coupon_id }),
    )
    .await;

    Ok(ApiResponse::ok("Order created", Order::from_parts(order, items)))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<Vec<Order>>> {
    ensure_role(user, UserRole::User)?;
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
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

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    ensure_role(user, UserRole::User)?;
    let order = Orders::find_by_id(id)
        .filter(OrderCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;
    let order = with_items(&state.orm, order).await?;
    Ok(ApiResponse::ok("Order", order))
}

pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: CancelOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_role(user, UserRole::User)?;
    let txn = state.orm.begin().await?;
    let existing = Orders::find_by_id(id)
        .filter(OrderCol::UserId.eq(user.user_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    if existing.status != OrderStatus::Pending {
        return Err(AppError::BadRequest(format!(
            "Only pending orders can be cancelled, this order is {}",
            existing.status
        )));
    }

    let mut active: OrderActive = existing.into();
    active.status = Set(OrderStatus::Cancelled);
    active.cancel_reason = Set(payload.reason);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;
    release_coupon(&txn, &order).await?;
    let order = with_items(&txn, order).await?;
    txn.commit().await?;

    state.events.status_changed(&order);
    audit::record(
        &state.pool,
        user.user_id,
        "order_cancel",
        "orders",
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    Ok(ApiResponse::ok("Order cancelled", order))
}

/// Validates the basket against the catalog and prices it.
///
/// With `lock_coupon` the coupon row stays locked until the surrounding
/// transaction ends, so concurrent checkouts cannot overshoot its caps.
async fn price_order<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    payload: &PreviewOrderRequest,
    lock_coupon: bool,
) -> AppResult<(Quote, Option<coupons::Model>)> {
    let vendor = Vendors::find_by_id(payload.vendor_id)
        .one(db)
        .await?
        .filter(|v| v.is_active)
        .ok_or_else(|| AppError::not_found("Vendor"))?;
    if !vendor.is_open {
        return Err(AppError::BadRequest(format!(
            "{} is not accepting orders right now",
            vendor.name
        )));
    }

    let area = DeliveryAreas::find_by_id(payload.delivery_area_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Delivery area"))?;
    if !area.is_active {
        return Err(AppError::BadRequest(format!(
            "Delivery to {} is currently unavailable",
            area.name
        )));
    }

    let ids: Vec<Uuid> = payload.items.iter().map(|line| line.item_id).collect();
    let catalog: HashMap<Uuid, _> = Items::find()
        .filter(ItemCol::Id.is_in(ids))
        .filter(ItemCol::VendorId.eq(vendor.id))
        .all(db)
        .await?
        .into_iter()
        .map(|item| (item.id, item))
        .collect();

    let mut lines = Vec::with_capacity(payload.items.len());
    for line in &payload.items {
        let item = catalog.get(&line.item_id).ok_or_else(|| {
            AppError::BadRequest(format!("Item {} is not on this vendor's menu", line.item_id))
        })?;
        if !item.is_available {
            return Err(AppError::BadRequest(format!("{} is not available", item.name)));
        }
        lines.push(PriceLine {
            item_id: item.id,
            name: item.name.clone(),
            unit_price: item.price,
            quantity: line.quantity,
        });
    }

    let code = payload
        .coupon_code
        .as_deref()
        .map(normalize_code)
        .filter(|c| !c.is_empty());
    let coupon = match code {
        Some(code) => {
            let mut finder = Coupons::find().filter(CouponCol::Code.eq(code.as_str()));
            if lock_coupon {
                finder = finder.lock(LockType::Update);
            }
            let coupon = finder
                .one(db)
                .await?
                .ok_or_else(|| AppError::BadRequest(format!("Coupon '{code}' does not exist")))?;
            let user_uses = CouponUsages::find()
                .filter(UsageCol::CouponId.eq(coupon.id))
                .filter(UsageCol::UserId.eq(user_id))
                .count(db)
                .await? as i64;
            let subtotal: i64 = lines.iter().map(PriceLine::line_total).sum();
            coupon
                .terms()
                .check_applicable(Utc::now(), user_uses, subtotal)
                .map_err(|rejection| AppError::BadRequest(rejection.to_string()))?;
            Some(coupon)
        }
        None => None,
    };

    let terms = coupon.as_ref().map(coupons::Model::terms);
    let quote = pricing::quote(&lines, terms.as_ref(), area.delivery_fee);
    Ok((quote, coupon))
}

/// Cancelled orders give their coupon use back.
pub(crate) fn releases_coupon(status: OrderStatus) -> bool {
    matches!(status, OrderStatus::Cancelled | OrderStatus::CanceledByVendor)
}

pub(crate) async fn release_coupon<C: ConnectionTrait>(
    db: &C,
    order: &orders::Model,
) -> AppResult<()> {
    let Some(coupon_id) = order.coupon_id else {
        return Ok(());
    };
    let removed = CouponUsages::delete_many()
        .filter(UsageCol::OrderId.eq(order.id))
        .exec(db)
        .await?;
    if removed.rows_affected > 0 {
        Coupons::update_many()
            .col_expr(CouponCol::UsedCount, Expr::cust("GREATEST(used_count - 1, 0)"))
            .filter(CouponCol::Id.eq(coupon_id))
            .exec(db)
            .await?;
        tracing::debug!(order_id = %order.id, %coupon_id, "coupon usage released");
    }
    Ok(())
}

pub(crate) fn parse_status_filter(raw: Option<&str>) -> AppResult<Option<OrderStatus>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => OrderStatus::from_str(s)
            .map(Some)
            .map_err(AppError::BadRequest),
        None => Ok(None),
    }
}

pub(crate) async fn with_items<C: ConnectionTrait>(
    db: &C,
    order: orders::Model,
) -> AppResult<Order> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(db)
        .await?;
    Ok(Order::from_parts(order, items))
}

/// Loads the line items of a page of orders in one query.
pub(crate) async fn attach_items<C: ConnectionTrait>(
    db: &C,
    orders: Vec<orders::Model>,
) -> AppResult<Vec<Order>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut grouped: HashMap<Uuid, Vec<_>> = HashMap::new();
    for item in OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(ids))
        .all(db)
        .await?
    {
        grouped.entry(item.order_id).or_default().push(item);
    }
    Ok(orders
        .into_iter()
        .map(|order| {
            let items = grouped.remove(&order.id).unwrap_or_default();
            Order::from_parts(order, items)
        })
        .collect())
}

fn build_order_number(order_id: Uuid, now: DateTime<Utc>) -> String {
    let suffix = order_id.simple().to_string();
    format!("ORD-{}-{}", now.format("%Y%m%d"), suffix[..8].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn order_number_carries_date_and_id_prefix() {
        let id = Uuid::parse_str("1a2b3c4d-0000-4000-8000-000000000000").unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
        assert_eq!(build_order_number(id, at), "ORD-20260314-1A2B3C4D");
    }

    #[test]
    fn status_filter_accepts_wire_names() {
        assert_eq!(parse_status_filter(None).unwrap(), None);
        assert_eq!(parse_status_filter(Some("  ")).unwrap(), None);
        assert_eq!(
            parse_status_filter(Some("out_for_delivery")).unwrap(),
            Some(OrderStatus::OutForDelivery)
        );
        assert!(matches!(
            parse_status_filter(Some("shipped")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn only_cancellations_release_coupons() {
        assert!(releases_coupon(OrderStatus::Cancelled));
        assert!(releases_coupon(OrderStatus::CanceledByVendor));
        assert!(!releases_coupon(OrderStatus::Delivered));
        assert!(!releases_coupon(OrderStatus::Completed));
    }
}
