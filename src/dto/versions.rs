use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    domain::{AppType, Platform},
    models::AppVersion,
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VersionQuery {
    #[param(value_type = String, example = "android")]
    pub platform: Platform,
    /// Version installed on the device, e.g. `1.4.2`
    pub current_version: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VersionCheck {
    #[serde(flatten)]
    pub version: AppVersion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_update: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertVersionRequest {
    pub app_type: AppType,
    pub platform: Platform,
    #[validate(length(min = 1, max = 32, message = "must be 1 to 32 characters"))]
    pub latest_version: String,
    #[validate(length(min = 1, max = 32, message = "must be 1 to 32 characters"))]
    pub min_supported_version: String,
    #[serde(default)]
    pub is_mandatory: bool,
    pub release_notes: Option<String>,
}
