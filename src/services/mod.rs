use sea_orm::{EntityTrait, PaginatorTrait, QuerySelect, Select};

use crate::{db::OrmConn, error::AppResult, response::Meta, routes::params::Pagination};

pub mod address_service;
pub mod ad_service;
pub mod admin_service;
pub mod auth_service;
pub mod catalog_service;
pub mod coupon_service;
pub mod delivery_area_service;
pub mod delivery_service;
pub mod fcm_service;
pub mod notification_service;
pub mod order_service;
pub mod version_service;

/// Runs a filtered query for one page and counts the full result set.
pub(crate) async fn fetch_page<E>(
    finder: Select<E>,
    db: &OrmConn,
    pagination: &Pagination,
) -> AppResult<(Vec<E::Model>, Meta)>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    let (page, limit, offset) = pagination.normalize();
    let total = finder.clone().count(db).await? as i64;
    let rows = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(db)
        .await?;
    Ok((rows, Meta::new(page, limit, total)))
}
