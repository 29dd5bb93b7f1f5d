use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Publishing cadence and WordPress connection for one (project, hypothesis) pair.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "seo_sprint_settings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub hypothesis_id: i32,
    pub weekly_cadence: i32,
    #[sea_orm(column_type = "Text")]
    pub publish_days: String, // JSON array of weekday indices, 0 = Sunday
    pub wordpress_base_url: Option<String>,
    pub wordpress_username: Option<String>,
    pub wordpress_app_password: Option<String>,
    pub wordpress_default_category_id: Option<i64>,
    #[sea_orm(column_type = "Text")]
    pub wordpress_default_tag_ids: String, // JSON array
    pub wordpress_post_type: Option<String>,
    pub created_by: i32,
    pub updated_by: i32,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn publish_day_list(&self) -> Vec<u8> {
        serde_json::from_str(&self.publish_days).unwrap_or_default()
    }

    pub fn default_tag_list(&self) -> Vec<i64> {
        serde_json::from_str(&self.wordpress_default_tag_ids).unwrap_or_default()
    }

    pub fn post_type(&self) -> &str {
        self.wordpress_post_type
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or("post")
    }
}
