use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    entity::ads::{Column as AdCol, Entity as Ads},
    error::{AppError, AppResult},
    models::Ad,
    response::ApiResponse,
    routes::params::{AdQuery, AdSortBy, SortOrder},
    services::fetch_page,
    state::AppState,
};

pub async fn list_ads(state: &AppState, query: AdQuery) -> AppResult<ApiResponse<Vec<Ad>>> {
    let sort_col = match query.sort_by.unwrap_or(AdSortBy::Priority) {
        AdSortBy::CreatedAt => AdCol::CreatedAt,
        AdSortBy::Priority => AdCol::Priority,
        AdSortBy::Title => AdCol::Title,
    };

    let mut finder = Ads::find().filter(AdCol::IsActive.eq(true));
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };
    // Stable tiebreak so pages do not overlap.
    finder = finder.order_by_asc(AdCol::Id);

    let (rows, meta) = fetch_page(finder, &state.orm, &query.pagination()).await?;
    let items = rows.into_iter().map(Ad::from).collect();
    Ok(ApiResponse::success("Ads", items, Some(meta)))
}

pub async fn get_ad(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Ad>> {
    let ad = Ads::find_by_id(id)
        .filter(AdCol::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Ad"))?;
    Ok(ApiResponse::ok("Ad", Ad::from(ad)))
}
