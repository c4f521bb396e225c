use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;
pub const MAX_PAGE: i64 = 1_000_000;

#[derive(Debug, Default, Clone, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// Page number, default 1
    pub page: Option<i64>,
    /// Items per page, default 10, at most 100
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    /// Returns `(page, limit, offset)` with defaults applied and bounds enforced.
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).clamp(1, MAX_PAGE);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = (page - 1).saturating_mul(limit);
        (page, limit, offset)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum AdSortBy {
    CreatedAt,
    Priority,
    Title,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AdQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// createdAt, priority or title
    #[param(value_type = Option<String>)]
    pub sort_by: Option<AdSortBy>,
    /// asc or desc
    #[param(value_type = Option<String>)]
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VendorQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Matches name or description, case insensitive
    pub search: Option<String>,
    pub cuisine: Option<String>,
    pub is_open: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ItemQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub vendor_id: Option<uuid::Uuid>,
    pub category_id: Option<uuid::Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Filter by order status
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CouponListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub is_active: Option<bool>,
}

macro_rules! impl_pagination {
    ($($ty:ty),*) => {
        $(impl $ty {
            pub fn pagination(&self) -> Pagination {
                Pagination { page: self.page, limit: self.limit }
            }
        })*
    };
}

impl_pagination!(AdQuery, VendorQuery, ItemQuery, OrderListQuery, CouponListQuery);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_applies_defaults() {
        assert_eq!(Pagination::default().normalize(), (1, DEFAULT_LIMIT, 0));
    }

    #[test]
    fn normalize_clamps_bounds() {
        assert_eq!(Pagination::new(0, 0).normalize(), (1, 1, 0));
        assert_eq!(Pagination::new(3, 1000).normalize(), (3, MAX_LIMIT, 200));
        assert_eq!(Pagination::new(-4, 25).normalize(), (1, 25, 0));
    }

    #[test]
    fn huge_pages_do_not_overflow() {
        let (page, limit, offset) = Pagination::new(i64::MAX, 10).normalize();
        assert_eq!(page, MAX_PAGE);
        assert_eq!(limit, 10);
        assert_eq!(offset, (MAX_PAGE - 1) * 10);
        assert!(offset >= 0);
    }

    #[test]
    fn query_structs_expose_pagination() {
        let q = OrderListQuery {
            page: Some(2),
            limit: Some(5),
            status: None,
        };
        assert_eq!(q.pagination().normalize(), (2, 5, 5));
    }
}
