#![allow(dead_code)]

use food_delivery_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    domain::UserRole,
    entity::users::ActiveModel as UserActive,
    middleware::auth::AuthUser,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

/// Connects and migrates, or returns `None` when no database is configured.
pub async fn database_state(secret: &str) -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;
    Ok(Some(AppState::new(pool, AppConfig::with_secret(database_url, secret))))
}

pub async fn create_user(state: &AppState, role: UserRole) -> anyhow::Result<AuthUser> {
    let id = Uuid::new_v4();
    UserActive {
        id: Set(id),
        name: Set(format!("{} {}", role.as_str(), &id.simple().to_string()[..6])),
        email: Set(format!("{}-{}@example.com", role.as_str(), id.simple())),
        phone: Set(None),
        password_hash: Set("dummy".into()),
        role: Set(role),
        email_verified: Set(true),
        phone_verified: Set(false),
        is_available: Set(role == UserRole::Delivery),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(AuthUser { user_id: id, role })
}
