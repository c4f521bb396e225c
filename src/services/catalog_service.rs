use std::path::{Component, Path, PathBuf};

use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use uuid::Uuid;

use crate::{
    entity::{
        items::{Column as ItemCol, Entity as Items},
        menu_categories::{Column as CategoryCol, Entity as MenuCategories},
        vendors::{self, Column as VendorCol, Entity as Vendors},
    },
    error::{AppError, AppResult},
    models::{Item, MenuCategory, Vendor},
    response::ApiResponse,
    routes::params::{ItemQuery, Pagination, VendorQuery},
    services::fetch_page,
    state::AppState,
};

pub async fn list_vendors(
    state: &AppState,
    query: VendorQuery,
) -> AppResult<ApiResponse<Vec<Vendor>>> {
    let mut condition = Condition::all().add(VendorCol::IsActive.eq(true));

    if let Some(search) = query.search.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(VendorCol::Name).ilike(pattern.clone()))
                .add(Expr::col(VendorCol::Description).ilike(pattern)),
        );
    }
    if let Some(cuisine) = query.cuisine.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(VendorCol::Cuisine).ilike(cuisine.clone()));
    }
    if let Some(is_open) = query.is_open {
        condition = condition.add(VendorCol::IsOpen.eq(is_open));
    }

    let finder = Vendors::find()
        .filter(condition)
        .order_by_desc(VendorCol::Rating)
        .order_by_asc(VendorCol::Name);

    let (rows, meta) = fetch_page(finder, &state.orm, &query.pagination()).await?;
    let items = rows.into_iter().map(Vendor::from).collect();
    Ok(ApiResponse::success("Vendors", items, Some(meta)))
}

pub async fn get_vendor(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Vendor>> {
    let vendor = find_active_vendor(state, id).await?;
    Ok(ApiResponse::ok("Vendor", Vendor::from(vendor)))
}

pub struct LogoFile {
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub async fn get_vendor_logo(state: &AppState, id: Uuid) -> AppResult<LogoFile> {
    let vendor = find_active_vendor(state, id).await?;
    let relative = vendor
        .logo_path
        .ok_or_else(|| AppError::not_found("Logo"))?;
    let path = resolve_upload_path(Path::new(&state.config.upload_dir), &relative)
        .ok_or_else(|| AppError::not_found("Logo"))?;

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(vendor_id = %id, path = %path.display(), "logo file missing");
            return Err(AppError::not_found("Logo"));
        }
        Err(err) => return Err(AppError::Internal(err.into())),
    };

    Ok(LogoFile {
        content_type: content_type_for(&path),
        bytes,
    })
}

pub async fn list_categories(
    state: &AppState,
    vendor_id: Uuid,
) -> AppResult<ApiResponse<Vec<MenuCategory>>> {
    find_active_vendor(state, vendor_id).await?;
    let items = MenuCategories::find()
        .filter(CategoryCol::VendorId.eq(vendor_id))
        .filter(CategoryCol::IsActive.eq(true))
        .order_by_asc(CategoryCol::SortOrder)
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(MenuCategory::from)
        .collect();
    Ok(ApiResponse::ok("Menu categories", items))
}

pub async fn get_category(state: &AppState, id: Uuid) -> AppResult<ApiResponse<MenuCategory>> {
    let category = MenuCategories::find_by_id(id)
        .filter(CategoryCol::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Menu category"))?;
    Ok(ApiResponse::ok("Menu category", MenuCategory::from(category)))
}

pub async fn list_items(state: &AppState, query: ItemQuery) -> AppResult<ApiResponse<Vec<Item>>> {
    let mut condition = Condition::all();
    if let Some(vendor_id) = query.vendor_id {
        condition = condition.add(ItemCol::VendorId.eq(vendor_id));
    }
    if let Some(category_id) = query.category_id {
        condition = condition.add(ItemCol::CategoryId.eq(category_id));
    }
    items_page(state, condition, &query.pagination()).await
}

pub async fn list_vendor_items(
    state: &AppState,
    vendor_id: Uuid,
    query: ItemQuery,
) -> AppResult<ApiResponse<Vec<Item>>> {
    find_active_vendor(state, vendor_id).await?;
    let mut condition = Condition::all().add(ItemCol::VendorId.eq(vendor_id));
    if let Some(category_id) = query.category_id {
        condition = condition.add(ItemCol::CategoryId.eq(category_id));
    }
    items_page(state, condition, &query.pagination()).await
}

/// Looks up an item, optionally requiring it to belong to `vendor_id`.
pub async fn get_item(
    state: &AppState,
    vendor_id: Option<Uuid>,
    id: Uuid,
) -> AppResult<ApiResponse<Item>> {
    let mut finder = Items::find_by_id(id);
    if let Some(vendor_id) = vendor_id {
        finder = finder.filter(ItemCol::VendorId.eq(vendor_id));
    }
    let item = finder
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Item"))?;
    Ok(ApiResponse::ok("Item", Item::from(item)))
}

async fn items_page(
    state: &AppState,
    condition: Condition,
    pagination: &Pagination,
) -> AppResult<ApiResponse<Vec<Item>>> {
    let finder = Items::find()
        .filter(condition)
        .order_by_asc(ItemCol::Name)
        .order_by_asc(ItemCol::Id);
    let (rows, meta) = fetch_page(finder, &state.orm, pagination).await?;
    let items = rows.into_iter().map(Item::from).collect();
    Ok(ApiResponse::success("Items", items, Some(meta)))
}

async fn find_active_vendor(state: &AppState, id: Uuid) -> AppResult<vendors::Model> {
    Vendors::find_by_id(id)
        .filter(VendorCol::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Vendor"))
}

/// Joins a stored relative path onto the upload dir, refusing anything that could escape it.
pub fn resolve_upload_path(root: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative);
    let safe = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !safe || relative.as_os_str().is_empty() {
        return None;
    }
    Some(root.join(relative))
}

pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_paths_cannot_escape_root() {
        let root = Path::new("/srv/uploads");
        assert_eq!(
            resolve_upload_path(root, "logos/a.png"),
            Some(PathBuf::from("/srv/uploads/logos/a.png"))
        );
        assert!(resolve_upload_path(root, "../etc/passwd").is_none());
        assert!(resolve_upload_path(root, "/etc/passwd").is_none());
        assert!(resolve_upload_path(root, "logos/../../x").is_none());
        assert!(resolve_upload_path(root, "").is_none());
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(content_type_for(Path::new("a/B.PNG")), "image/png");
        assert_eq!(content_type_for(Path::new("logo.jpeg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("logo")), "application/octet-stream");
    }
}
