use sea_orm::entity::prelude::*;

use crate::domain::{AppType, Platform};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "app_versions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub app_type: AppType,
    pub platform: Platform,
    pub latest_version: String,
    pub min_supported_version: String,
    pub is_mandatory: bool,
    pub release_notes: Option<String>,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
