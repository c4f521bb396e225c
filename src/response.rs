use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Meta {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        Self {
            page,
            limit,
            total,
            total_pages: total_pages(total, limit),
        }
    }
}

pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    #[schema(example = "success")]
    pub status: String,
    pub message: String,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data: Some(data),
            meta,
        }
    }

    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::success(message, data, None)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "fail")]
    pub status: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: "fail".to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(Meta::new(2, 5, 23).total_pages, 5);
    }

    #[test]
    fn success_envelope_omits_missing_meta() {
        let body = serde_json::to_value(ApiResponse::ok("Ok", 1)).unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"], 1);
        assert!(body.get("meta").is_none());
    }

    #[test]
    fn meta_uses_camel_case() {
        let body = serde_json::to_value(Meta::new(1, 10, 25)).unwrap();
        assert_eq!(body["totalPages"], 3);
    }

    #[test]
    fn fail_envelope_has_status_and_message() {
        let body = serde_json::to_value(ErrorResponse::fail("Order not found")).unwrap();
        assert_eq!(body, serde_json::json!({"status": "fail", "message": "Order not found"}));
    }
}
