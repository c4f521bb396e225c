use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit,
    domain::UserRole,
    dto::coupons::{CreateCouponRequest, UpdateCouponRequest, check_coupon_shape},
    entity::{
        coupon_usages::{Column as UsageCol, Entity as CouponUsages},
        coupons::{self, ActiveModel as CouponActive, Column as CouponCol, Entity as Coupons},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_role},
    models::Coupon,
    response::ApiResponse,
    routes::params::CouponListQuery,
    services::fetch_page,
    state::AppState,
};

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

pub async fn list_coupons(
    state: &AppState,
    user: &AuthUser,
    query: CouponListQuery,
) -> AppResult<ApiResponse<Vec<Coupon>>> {
    ensure_admin(user)?;
    let mut condition = Condition::all();
    if let Some(is_active) = query.is_active {
        condition = condition.add(CouponCol::IsActive.eq(is_active));
    }
    let finder = Coupons::find()
        .filter(condition)
        .order_by_desc(CouponCol::CreatedAt);
    let (rows, meta) = fetch_page(finder, &state.orm, &query.pagination()).await?;
    let items = rows.into_iter().map(Coupon::from).collect();
    Ok(ApiResponse::success("Coupons", items, Some(meta)))
}

pub async fn get_coupon(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(user)?;
    let coupon = find_coupon(state, id).await?;
    Ok(ApiResponse::ok("Coupon", Coupon::from(coupon)))
}

pub async fn create_coupon(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(user)?;
    let code = normalize_code(&payload.code);
    let exists = Coupons::find()
        .filter(CouponCol::Code.eq(code.as_str()))
        .one(&state.orm)
        .await?
        .is_some();
    if exists {
        return Err(AppError::Conflict(format!("Coupon code '{code}' already exists")));
    }

    let coupon = CouponActive {
        id: Set(Uuid::new_v4()),
        code: Set(code),
        description: Set(payload.description),
        discount_type: Set(payload.discount_type),
        discount_value: Set(payload.discount_value),
        max_discount: Set(payload.max_discount),
        min_order_amount: Set(payload.min_order_amount),
        max_uses: Set(payload.max_uses),
        max_uses_per_user: Set(payload.max_uses_per_user),
        used_count: Set(0),
        start_date: Set(payload.start_date.into()),
        end_date: Set(payload.end_date.into()),
        is_active: Set(payload.is_active),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "coupon_create",
        "coupons",
        serde_json::json!({ "coupon_id": coupon.id, "code": coupon.code }),
    )
    .await;

    Ok(ApiResponse::ok("Coupon created", Coupon::from(coupon)))
}

pub async fn update_coupon(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(user)?;
    let existing = find_coupon(state, id).await?;

    let discount_type = payload.discount_type.unwrap_or(existing.discount_type);
    let discount_value = payload.discount_value.unwrap_or(existing.discount_value);
    let start_date = payload
        .start_date
        .unwrap_or_else(|| existing.start_date.with_timezone(&Utc));
    let end_date = payload
        .end_date
        .unwrap_or_else(|| existing.end_date.with_timezone(&Utc));
    check_coupon_shape(discount_type, discount_value, start_date, end_date).map_err(|e| {
        AppError::Validation(
            e.message
                .map(|m| m.to_string())
                .unwrap_or_else(|| "Invalid coupon".into()),
        )
    })?;

    let mut active: CouponActive = existing.into();
    active.discount_type = Set(discount_type);
    active.discount_value = Set(discount_value);
    active.start_date = Set(start_date.into());
    active.end_date = Set(end_date.into());
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(max_discount) = payload.max_discount {
        active.max_discount = Set(Some(max_discount));
    }
    if let Some(min_order_amount) = payload.min_order_amount {
        active.min_order_amount = Set(min_order_amount);
    }
    if let Some(max_uses) = payload.max_uses {
        active.max_uses = Set(Some(max_uses));
    }
    if let Some(max_uses_per_user) = payload.max_uses_per_user {
        active.max_uses_per_user = Set(Some(max_uses_per_user));
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    let coupon = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "coupon_update",
        "coupons",
        serde_json::json!({ "coupon_id": coupon.id }),
    )
    .await;

    Ok(ApiResponse::ok("Coupon updated", Coupon::from(coupon)))
}

pub async fn toggle_coupon(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(user)?;
    let existing = find_coupon(state, id).await?;
    let next = !existing.is_active;

    let mut active: CouponActive = existing.into();
    active.is_active = Set(next);
    let coupon = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "coupon_toggle",
        "coupons",
        serde_json::json!({ "coupon_id": coupon.id, "is_active": next }),
    )
    .await;

    let message = if next { "Coupon activated" } else { "Coupon deactivated" };
    Ok(ApiResponse::ok(message, Coupon::from(coupon)))
}

pub async fn delete_coupon(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Coupons::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Coupon"));
    }

    audit::record(
        &state.pool,
        user.user_id,
        "coupon_delete",
        "coupons",
        serde_json::json!({ "coupon_id": id }),
    )
    .await;

    Ok(ApiResponse::ok("Coupon deleted", serde_json::json!({ "id": id })))
}

/// Coupons the caller could apply right now, ignoring order minimums.
pub async fn list_available_coupons(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Vec<Coupon>>> {
    ensure_role(user, UserRole::User)?;
    let now = Utc::now();
    let candidates = Coupons::find()
        .filter(CouponCol::IsActive.eq(true))
        .filter(CouponCol::StartDate.lte(now.fixed_offset()))
        .filter(CouponCol::EndDate.gte(now.fixed_offset()))
        .order_by_asc(CouponCol::EndDate)
        .all(&state.orm)
        .await?;

    let ids: Vec<Uuid> = candidates.iter().map(|c| c.id).collect();
    let mut uses: HashMap<Uuid, i64> = HashMap::new();
    if !ids.is_empty() {
        for usage in CouponUsages::find()
            .filter(UsageCol::UserId.eq(user.user_id))
            .filter(UsageCol::CouponId.is_in(ids))
            .all(&state.orm)
            .await?
        {
            *uses.entry(usage.coupon_id).or_default() += 1;
        }
    }

    let items = candidates
        .into_iter()
        .filter(|c| {
            c.terms()
                .check_available(now, uses.get(&c.id).copied().unwrap_or(0))
                .is_ok()
        })
        .map(Coupon::from)
        .collect();
    Ok(ApiResponse::ok("Available coupons", items))
}

async fn find_coupon(state: &AppState, id: Uuid) -> AppResult<coupons::Model> {
    Coupons::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Coupon"))
}

#[cfg(test)]
mod tests {
    use super::normalize_code;

    #[test]
    fn codes_are_case_insensitive() {
        assert_eq!(normalize_code("  welcome10 "), "WELCOME10");
    }
}
