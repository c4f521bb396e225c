use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    middleware::extract::{AppPath, AppQuery},
    error::AppResult,
    models::{Item, MenuCategory, Vendor},
    response::ApiResponse,
    routes::params::{ItemQuery, VendorQuery},
    services::catalog_service,
    state::AppState,
};

/// Vendors, their menu categories and items. Mounted at the API root.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vendors", get(list_vendors))
        .route("/vendors/{id}", get(get_vendor))
        .route("/vendors/{id}/logo", get(get_vendor_logo))
        .route("/vendors/{id}/categories", get(list_categories))
        .route("/vendors/{id}/items", get(list_vendor_items))
        .route("/vendors/{id}/items/{item_id}", get(get_vendor_item))
        .route("/categories/{id}", get(get_category))
        .route("/items", get(list_items))
        .route("/items/{id}", get(get_item))
}

#[utoipa::path(
    get,
    path = "/api/vendors",
    params(VendorQuery),
    responses((status = 200, description = "Active vendors, best rated first", body = ApiResponse<Vec<Vendor>>)),
    tag = "Vendors"
)]
pub async fn list_vendors(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<VendorQuery>,
) -> AppResult<Json<ApiResponse<Vec<Vendor>>>> {
    let resp = catalog_service::list_vendors(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vendors/{id}",
    params(("id" = Uuid, Path, description = "Vendor id")),
    responses(
        (status = 200, description = "Vendor", body = ApiResponse<Vendor>),
        (status = 404, description = "Not found")
    ),
    tag = "Vendors"
)]
pub async fn get_vendor(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<Vendor>>> {
    let resp = catalog_service::get_vendor(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vendors/{id}/logo",
    params(("id" = Uuid, Path, description = "Vendor id")),
    responses(
        (status = 200, description = "Logo image bytes", content_type = "image/*"),
        (status = 404, description = "Vendor or logo not found")
    ),
    tag = "Vendors"
)]
pub async fn get_vendor_logo(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let logo = catalog_service::get_vendor_logo(&state, id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, logo.content_type),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        logo.bytes,
    ))
}

#[utoipa::path(
    get,
    path = "/api/vendors/{id}/categories",
    params(("id" = Uuid, Path, description = "Vendor id")),
    responses(
        (status = 200, description = "Menu categories in display order", body = ApiResponse<Vec<MenuCategory>>),
        (status = 404, description = "Vendor not found")
    ),
    tag = "Menu"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    AppPath(vendor_id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<MenuCategory>>>> {
    let resp = catalog_service::list_categories(&state, vendor_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Menu category", body = ApiResponse<MenuCategory>),
        (status = 404, description = "Not found")
    ),
    tag = "Menu"
)]
pub async fn get_category(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<MenuCategory>>> {
    let resp = catalog_service::get_category(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/items",
    params(ItemQuery),
    responses((status = 200, description = "Items", body = ApiResponse<Vec<Item>>)),
    tag = "Menu"
)]
pub async fn list_items(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ItemQuery>,
) -> AppResult<Json<ApiResponse<Vec<Item>>>> {
    let resp = catalog_service::list_items(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/items/{id}",
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item", body = ApiResponse<Item>),
        (status = 404, description = "Not found")
    ),
    tag = "Menu"
)]
pub async fn get_item(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<Item>>> {
    let resp = catalog_service::get_item(&state, None, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vendors/{id}/items",
    params(("id" = Uuid, Path, description = "Vendor id"), ItemQuery),
    responses(
        (status = 200, description = "Items of one vendor", body = ApiResponse<Vec<Item>>),
        (status = 404, description = "Vendor not found")
    ),
    tag = "Menu"
)]
pub async fn list_vendor_items(
    State(state): State<AppState>,
    AppPath(vendor_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<ItemQuery>,
) -> AppResult<Json<ApiResponse<Vec<Item>>>> {
    let resp = catalog_service::list_vendor_items(&state, vendor_id, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vendors/{id}/items/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Vendor id"),
        ("item_id" = Uuid, Path, description = "Item id")
    ),
    responses(
        (status = 200, description = "Item", body = ApiResponse<Item>),
        (status = 404, description = "Not found for this vendor")
    ),
    tag = "Menu"
)]
pub async fn get_vendor_item(
    State(state): State<AppState>,
    AppPath((vendor_id, item_id)): AppPath<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<Item>>> {
    let resp = catalog_service::get_item(&state, Some(vendor_id), item_id).await?;
    Ok(Json(resp))
}
