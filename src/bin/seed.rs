use chrono::{Duration, Utc};
use food_delivery_api::{
    config::AppConfig,
    db::{OrmConn, create_pool, orm_from_pool, run_migrations},
    domain::{AppType, DiscountType, Platform, UserRole},
    entity::{
        ads, app_versions, coupons, delivery_areas, items, menu_categories, users, vendors,
    },
    security::hash_password,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;
    let orm = orm_from_pool(pool);

    let admin_id = ensure_user(&orm, "Admin", "admin@example.com", "admin123", UserRole::Admin).await?;
    let driver_id =
        ensure_user(&orm, "Driver", "driver@example.com", "driver123", UserRole::Delivery).await?;
    let user_id = ensure_user(&orm, "Customer", "user@example.com", "user123", UserRole::User).await?;

    let pizza = ensure_vendor(&orm, "Napoli Pizza", "italian", 4.6).await?;
    let sushi = ensure_vendor(&orm, "Sakura Sushi", "japanese", 4.8).await?;
    seed_menu(
        &orm,
        pizza,
        &[
            ("Pizzas", &[("Margherita", 4500), ("Pepperoni", 5200)][..]),
            ("Drinks", &[("Lemonade", 1200)][..]),
        ],
    )
    .await?;
    seed_menu(
        &orm,
        sushi,
        &[
            ("Rolls", &[("Salmon roll", 6000), ("Tuna roll", 6400)][..]),
            ("Sides", &[("Miso soup", 1500)][..]),
        ],
    )
    .await?;

    ensure_area(&orm, "Downtown", "Metropolis", 1000, 30).await?;
    ensure_area(&orm, "Harbor", "Metropolis", 1500, 45).await?;
    ensure_ad(&orm, "Two pizzas, one price", Some(pizza), 10).await?;
    ensure_coupon(&orm, "WELCOME10").await?;
    for app_type in [AppType::User, AppType::Vendor, AppType::Delivery] {
        for platform in [Platform::Android, Platform::Ios] {
            ensure_version(&orm, app_type, platform).await?;
        }
    }

    println!(
        "Seed completed. Admin ID: {admin_id}, Driver ID: {driver_id}, User ID: {user_id}"
    );
    Ok(())
}

async fn ensure_user(
    orm: &OrmConn,
    name: &str,
    email: &str,
    password: &str,
    role: UserRole,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(orm)
        .await?
    {
        let mut active: users::ActiveModel = existing.into();
        active.role = Set(role);
        let updated = active.update(orm).await?;
        return Ok(updated.id);
    }

    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let created = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        phone: Set(None),
        password_hash: Set(password_hash),
        role: Set(role),
        email_verified: Set(true),
        phone_verified: Set(false),
        is_available: Set(role == UserRole::Delivery),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(orm)
    .await?;
    Ok(created.id)
}

async fn ensure_vendor(orm: &OrmConn, name: &str, cuisine: &str, rating: f64) -> anyhow::Result<Uuid> {
    if let Some(existing) = vendors::Entity::find()
        .filter(vendors::Column::Name.eq(name))
        .one(orm)
        .await?
    {
        return Ok(existing.id);
    }

    let created = vendors::ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(None),
        name: Set(name.to_string()),
        description: Set(Some(format!("{name} serves {cuisine} food"))),
        phone: Set(None),
        address: Set(Some("1 Main Street".into())),
        cuisine: Set(Some(cuisine.to_string())),
        logo_path: Set(None),
        rating: Set(rating),
        is_open: Set(true),
        is_active: Set(true),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;
    Ok(created.id)
}

async fn seed_menu(
    orm: &OrmConn,
    vendor_id: Uuid,
    sections: &[(&str, &[(&str, i64)])],
) -> anyhow::Result<()> {
    for (position, (category_name, dishes)) in sections.iter().enumerate() {
        let category_id = match menu_categories::Entity::find()
            .filter(menu_categories::Column::VendorId.eq(vendor_id))
            .filter(menu_categories::Column::Name.eq(*category_name))
            .one(orm)
            .await?
        {
            Some(existing) => existing.id,
            None => {
                menu_categories::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    vendor_id: Set(vendor_id),
                    name: Set(category_name.to_string()),
                    description: Set(None),
                    sort_order: Set(position as i32),
                    is_active: Set(true),
                }
                .insert(orm)
                .await?
                .id
            }
        };

        for (dish, price) in dishes.iter() {
            let exists = items::Entity::find()
                .filter(items::Column::VendorId.eq(vendor_id))
                .filter(items::Column::Name.eq(*dish))
                .one(orm)
                .await?
                .is_some();
            if exists {
                continue;
            }
            items::ActiveModel {
                id: Set(Uuid::new_v4()),
                vendor_id: Set(vendor_id),
                category_id: Set(Some(category_id)),
                name: Set(dish.to_string()),
                description: Set(None),
                price: Set(*price),
                image_url: Set(None),
                is_available: Set(true),
                created_at: NotSet,
            }
            .insert(orm)
            .await?;
        }
    }
    Ok(())
}

async fn ensure_area(
    orm: &OrmConn,
    name: &str,
    city: &str,
    delivery_fee: i64,
    estimated_time_minutes: i32,
) -> anyhow::Result<()> {
    let exists = delivery_areas::Entity::find()
        .filter(delivery_areas::Column::Name.eq(name))
        .one(orm)
        .await?
        .is_some();
    if !exists {
        delivery_areas::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            city: Set(city.to_string()),
            delivery_fee: Set(delivery_fee),
            estimated_time_minutes: Set(estimated_time_minutes),
            is_active: Set(true),
            created_at: NotSet,
        }
        .insert(orm)
        .await?;
    }
    Ok(())
}

async fn ensure_ad(
    orm: &OrmConn,
    title: &str,
    vendor_id: Option<Uuid>,
    priority: i32,
) -> anyhow::Result<()> {
    let exists = ads::Entity::find()
        .filter(ads::Column::Title.eq(title))
        .one(orm)
        .await?
        .is_some();
    if !exists {
        ads::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title.to_string()),
            description: Set(None),
            image_url: Set("https://cdn.example.com/ads/banner.png".into()),
            link_url: Set(None),
            vendor_id: Set(vendor_id),
            is_active: Set(true),
            priority: Set(priority),
            created_at: NotSet,
        }
        .insert(orm)
        .await?;
    }
    Ok(())
}

async fn ensure_coupon(orm: &OrmConn, code: &str) -> anyhow::Result<()> {
    let exists = coupons::Entity::find()
        .filter(coupons::Column::Code.eq(code))
        .one(orm)
        .await?
        .is_some();
    if !exists {
        let now = Utc::now();
        coupons::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code.to_string()),
            description: Set(Some("10% off your first orders".into())),
            discount_type: Set(DiscountType::Percentage),
            discount_value: Set(10),
            max_discount: Set(Some(2000)),
            min_order_amount: Set(3000),
            max_uses: Set(Some(1000)),
            max_uses_per_user: Set(Some(1)),
            used_count: NotSet,
            start_date: Set(now.into()),
            end_date: Set((now + Duration::days(90)).into()),
            is_active: Set(true),
            created_at: NotSet,
        }
        .insert(orm)
        .await?;
    }
    Ok(())
}

async fn ensure_version(orm: &OrmConn, app_type: AppType, platform: Platform) -> anyhow::Result<()> {
    let exists = app_versions::Entity::find()
        .filter(app_versions::Column::AppType.eq(app_type))
        .filter(app_versions::Column::Platform.eq(platform))
        .one(orm)
        .await?
        .is_some();
    if !exists {
        app_versions::ActiveModel {
            id: Set(Uuid::new_v4()),
            app_type: Set(app_type),
            platform: Set(platform),
            latest_version: Set("1.0.0".into()),
            min_supported_version: Set("1.0.0".into()),
            is_mandatory: Set(false),
            release_notes: Set(Some("Initial release".into())),
            updated_at: NotSet,
        }
        .insert(orm)
        .await?;
    }
    Ok(())
}
