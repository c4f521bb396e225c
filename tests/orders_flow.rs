mod common;

use chrono::{Duration, Utc};
use common::{create_user, database_state};
use food_delivery_api::{
    domain::{DiscountType, OrderStatus, PaymentMethod, UserRole, geo::GeoPoint},
    dto::{
        addresses::CreateAddressRequest,
        orders::{CancelOrderRequest, CreateOrderRequest, OrderLineRequest, UpdateOrderStatusRequest},
        users::AvailabilityRequest,
    },
    entity::{
        coupons::{ActiveModel as CouponActive, Entity as Coupons},
        delivery_areas::ActiveModel as AreaActive,
        items::ActiveModel as ItemActive,
        vendors::ActiveModel as VendorActive,
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::Address,
    realtime::{ORDER_ACCEPTED, ORDER_ASSIGNED, ORDER_PREPARING, ORDER_STATUS_UPDATED},
    services::{address_service, admin_service, delivery_service, order_service},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

struct Fixture {
    vendor_id: Uuid,
    area_id: Uuid,
    item_id: Uuid,
    coupon_id: Uuid,
    coupon_code: String,
}

// Customer orders with a coupon, cancels, reorders; admin and driver walk the order to delivered.
#[tokio::test]
async fn order_lifecycle_with_coupon_and_driver() -> anyhow::Result<()> {
    let Some(state) = database_state("flow-secret").await? else {
        return Ok(());
    };

    let customer = create_user(&state, UserRole::User).await?;
    let admin = create_user(&state, UserRole::Admin).await?;
    let driver = create_user(&state, UserRole::Delivery).await?;
    let fixture = seed_catalog(&state).await?;

    let address = add_address(&state, &customer, "Home", true).await?;

    let request = |coupon: Option<&str>| order_request(&fixture, address.id, coupon);

    // Preview quotes without consuming the coupon; the code is matched case-insensitively.
    let lower_code = fixture.coupon_code.to_lowercase();
    let quote = order_service::preview_order(&state, &customer, request(Some(&lower_code)).preview())
        .await?
        .data
        .expect("quote");
    assert_eq!(quote.subtotal, 9_000);
    assert_eq!(quote.discount, 900);
    assert_eq!(quote.delivery_fee, 1_000);
    assert_eq!(quote.total, 9_100);
    assert_eq!(used_count(&state, fixture.coupon_id).await?, 0);

    // First order consumes the coupon, cancelling gives it back.
    let first = order_service::create_order(&state, &customer, request(Some(&fixture.coupon_code)))
        .await?
        .data
        .expect("order");
    assert_eq!(first.status, OrderStatus::Pending);
    assert_eq!(first.total, 9_100);
    assert!(first.order_number.starts_with("ORD-"));
    assert_eq!(used_count(&state, fixture.coupon_id).await?, 1);

    let cancelled = order_service::cancel_order(
        &state,
        &customer,
        first.id,
        CancelOrderRequest {
            reason: Some("Changed my mind".into()),
        },
    )
    .await?
    .data
    .expect("cancelled");
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(used_count(&state, fixture.coupon_id).await?, 0);

    let again = order_service::cancel_order(&state, &customer, first.id, CancelOrderRequest::default()).await;
    assert!(matches!(again, Err(AppError::BadRequest(_))));

    // Second order reuses the released coupon.
    let order = order_service::create_order(&state, &customer, request(Some(&fixture.coupon_code)))
        .await?
        .data
        .expect("order");
    assert_eq!(used_count(&state, fixture.coupon_id).await?, 1);

    // Per-user limit is one use.
    let over_limit =
        order_service::create_order(&state, &customer, request(Some(&fixture.coupon_code))).await;
    assert!(matches!(over_limit, Err(AppError::BadRequest(_))));

    let unknown = order_service::preview_order(&state, &customer, request(Some("NOPE-NOPE")).preview()).await;
    assert!(matches!(unknown, Err(AppError::BadRequest(_))));

    let mut rx = state.events.subscribe();

    // Pending cannot jump straight to delivered.
    let skipped = admin_service::update_order_status(
        &state,
        &admin,
        order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Delivered,
        },
    )
    .await;
    assert!(matches!(skipped, Err(AppError::BadRequest(_))));

    let preparing = admin_service::update_order_status(
        &state,
        &admin,
        order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Preparing,
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(preparing.status, OrderStatus::Preparing);
    assert_eq!(rx.recv().await?.event.event, ORDER_PREPARING);
    assert_eq!(rx.recv().await?.event.event, ORDER_STATUS_UPDATED);

    // Unavailable drivers cannot take orders.
    delivery_service::set_availability(&state, &driver, AvailabilityRequest { is_available: false })
        .await?;
    let refused = delivery_service::assign_order(&state, &driver, order.id).await;
    assert!(matches!(refused, Err(AppError::BadRequest(_))));
    delivery_service::set_availability(&state, &driver, AvailabilityRequest { is_available: true })
        .await?;

    let available = delivery_service::list_available_orders(&state, &driver, Default::default())
        .await?
        .data
        .unwrap_or_default();
    assert!(available.iter().any(|o| o.id == order.id));

    let assigned = delivery_service::assign_order(&state, &driver, order.id)
        .await?
        .data
        .expect("order");
    assert_eq!(assigned.driver_id, Some(driver.user_id));
    assert_eq!(assigned.status, OrderStatus::Preparing);

    let accepted = rx.recv().await?;
    assert_eq!(accepted.event.event, ORDER_ACCEPTED);
    let private = rx.recv().await?;
    assert_eq!(private.event.event, ORDER_ASSIGNED);
    assert!(private.reaches(driver.user_id));
    assert!(!private.reaches(Uuid::new_v4()));

    let taken = delivery_service::assign_order(&state, &driver, order.id).await;
    assert!(matches!(taken, Err(AppError::Conflict(_))));

    // Drivers only set delivery statuses, in order.
    let not_theirs = delivery_service::update_delivery_status(
        &state,
        &driver,
        order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Completed,
        },
    )
    .await;
    assert!(matches!(not_theirs, Err(AppError::BadRequest(_))));

    for status in [OrderStatus::OutForDelivery, OrderStatus::Delivered] {
        let updated = delivery_service::update_delivery_status(
            &state,
            &driver,
            order.id,
            UpdateOrderStatusRequest { status },
        )
        .await?
        .data
        .expect("order");
        assert_eq!(updated.status, status);
    }

    // The customer sees the delivered order with its items.
    let seen = order_service::get_order(&state, &customer, order.id)
        .await?
        .data
        .expect("order");
    assert_eq!(seen.status, OrderStatus::Delivered);
    assert_eq!(seen.items.len(), 1);
    assert_eq!(seen.items[0].quantity, 2);

    // Another customer cannot read it.
    let stranger = create_user(&state, UserRole::User).await?;
    let hidden = order_service::get_order(&state, &stranger, order.id).await;
    assert!(matches!(hidden, Err(AppError::NotFound(_))));

    Ok(())
}

// First address becomes default; deleting the default promotes the newest remaining one.
#[tokio::test]
async fn address_default_rules() -> anyhow::Result<()> {
    let Some(state) = database_state("flow-secret").await? else {
        return Ok(());
    };
    let customer = create_user(&state, UserRole::User).await?;

    let first = add_address(&state, &customer, "Home", false).await?;
    assert!(first.is_default);

    let second = add_address(&state, &customer, "Work", false).await?;
    assert!(!second.is_default);
    let third = add_address(&state, &customer, "Gym", false).await?;

    let moved = address_service::set_default_address(&state, &customer, second.id)
        .await?
        .data
        .expect("address");
    assert!(moved.is_default);
    let current = address_service::get_default_address(&state, &customer)
        .await?
        .data
        .expect("address");
    assert_eq!(current.id, second.id);

    address_service::delete_address(&state, &customer, second.id).await?;
    let promoted = address_service::get_default_address(&state, &customer)
        .await?
        .data
        .expect("address");
    assert_eq!(promoted.id, third.id);

    let listed = address_service::list_addresses(&state, &customer)
        .await?
        .data
        .unwrap_or_default();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed.iter().filter(|a| a.is_default).count(), 1);

    let stranger = create_user(&state, UserRole::User).await?;
    let hidden = address_service::get_address(&state, &stranger, first.id).await;
    assert!(matches!(hidden, Err(AppError::NotFound(_))));

    Ok(())
}

// Addresses used by orders stay put; cancels after preparing are refused; hard delete frees the coupon.
#[tokio::test]
async fn order_references_and_admin_delete() -> anyhow::Result<()> {
    let Some(state) = database_state("flow-secret").await? else {
        return Ok(());
    };
    let customer = create_user(&state, UserRole::User).await?;
    let admin = create_user(&state, UserRole::Admin).await?;
    let fixture = seed_catalog(&state).await?;
    let address = add_address(&state, &customer, "Home", true).await?;

    let order = order_service::create_order(
        &state,
        &customer,
        order_request(&fixture, address.id, Some(&fixture.coupon_code)),
    )
    .await?
    .data
    .expect("order");
    assert_eq!(used_count(&state, fixture.coupon_id).await?, 1);

    let in_use = address_service::delete_address(&state, &customer, address.id).await;
    assert!(matches!(in_use, Err(AppError::Conflict(_))));

    admin_service::update_order_status(
        &state,
        &admin,
        order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Preparing,
        },
    )
    .await?;
    let too_late =
        order_service::cancel_order(&state, &customer, order.id, CancelOrderRequest::default()).await;
    assert!(matches!(too_late, Err(AppError::BadRequest(_))));
    assert_eq!(used_count(&state, fixture.coupon_id).await?, 1);

    admin_service::delete_order(&state, &admin, order.id).await?;
    assert_eq!(used_count(&state, fixture.coupon_id).await?, 0);
    let gone = admin_service::get_order_admin(&state, &admin, order.id).await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));
    let twice = admin_service::delete_order(&state, &admin, order.id).await;
    assert!(matches!(twice, Err(AppError::NotFound(_))));

    // With no orders left the address can go.
    address_service::delete_address(&state, &customer, address.id).await?;

    // A cancelled order's usage is already released, so deleting it keeps the count.
    let other = add_address(&state, &customer, "Work", true).await?;
    let reorder = order_service::create_order(
        &state,
        &customer,
        order_request(&fixture, other.id, Some(&fixture.coupon_code)),
    )
    .await?
    .data
    .expect("order");
    order_service::cancel_order(&state, &customer, reorder.id, CancelOrderRequest::default())
        .await?;
    assert_eq!(used_count(&state, fixture.coupon_id).await?, 0);
    admin_service::delete_order(&state, &admin, reorder.id).await?;
    assert_eq!(used_count(&state, fixture.coupon_id).await?, 0);

    Ok(())
}

async fn add_address(
    state: &AppState,
    customer: &AuthUser,
    label: &str,
    is_default: bool,
) -> anyhow::Result<Address> {
    let address = address_service::create_address(
        state,
        customer,
        CreateAddressRequest {
            label: label.into(),
            street: "1 Test Street".into(),
            city: "Metropolis".into(),
            details: None,
            location: GeoPoint::new(31.2357, 30.0444),
            is_default,
        },
    )
    .await?
    .data
    .ok_or_else(|| anyhow::anyhow!("address missing"))?;
    Ok(address)
}

fn order_request(fixture: &Fixture, address_id: Uuid, coupon: Option<&str>) -> CreateOrderRequest {
    CreateOrderRequest {
        vendor_id: fixture.vendor_id,
        delivery_area_id: fixture.area_id,
        address_id,
        items: vec![OrderLineRequest {
            item_id: fixture.item_id,
            quantity: 2,
        }],
        coupon_code: coupon.map(str::to_string),
        payment_method: PaymentMethod::Cash,
        notes: None,
    }
}

async fn seed_catalog(state: &AppState) -> anyhow::Result<Fixture> {
    let suffix = Uuid::new_v4().simple().to_string();

    let vendor = VendorActive {
        id: Set(Uuid::new_v4()),
        owner_id: Set(None),
        name: Set(format!("Flow Kitchen {suffix}")),
        description: Set(None),
        phone: Set(None),
        address: Set(None),
        cuisine: Set(Some("test".into())),
        logo_path: Set(None),
        rating: Set(4.0),
        is_open: Set(true),
        is_active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let item = ItemActive {
        id: Set(Uuid::new_v4()),
        vendor_id: Set(vendor.id),
        category_id: Set(None),
        name: Set("Flow Burger".into()),
        description: Set(None),
        price: Set(4_500),
        image_url: Set(None),
        is_available: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let area = AreaActive {
        id: Set(Uuid::new_v4()),
        name: Set(format!("Flow Area {suffix}")),
        city: Set("Metropolis".into()),
        delivery_fee: Set(1_000),
        estimated_time_minutes: Set(30),
        is_active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let now = Utc::now();
    let coupon_code = format!("FLOW{}", &suffix[..8]).to_uppercase();
    let coupon = CouponActive {
        id: Set(Uuid::new_v4()),
        code: Set(coupon_code.clone()),
        description: Set(None),
        discount_type: Set(DiscountType::Percentage),
        discount_value: Set(10),
        max_discount: Set(Some(2_000)),
        min_order_amount: Set(3_000),
        max_uses: Set(Some(10)),
        max_uses_per_user: Set(Some(1)),
        used_count: NotSet,
        start_date: Set((now - Duration::days(1)).into()),
        end_date: Set((now + Duration::days(1)).into()),
        is_active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(Fixture {
        vendor_id: vendor.id,
        area_id: area.id,
        item_id: item.id,
        coupon_id: coupon.id,
        coupon_code,
    })
}

async fn used_count(state: &AppState, coupon_id: Uuid) -> anyhow::Result<i32> {
    let coupon = Coupons::find_by_id(coupon_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("coupon missing"))?;
    Ok(coupon.used_count)
}
