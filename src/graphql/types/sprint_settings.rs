use async_graphql::*;
use chrono::{DateTime, Utc};

use super::patch;
use crate::database::entities::seo_sprint_settings;
use crate::services::SprintSettingsInput;

/// The application password is write-only; clients only learn whether one is stored.
#[derive(SimpleObject)]
pub struct SeoSprintSettings {
    pub id: i32,
    #[graphql(name = "projectId")]
    pub project_id: i32,
    #[graphql(name = "hypothesisId")]
    pub hypothesis_id: i32,
    #[graphql(name = "weeklyCadence")]
    pub weekly_cadence: i32,
    #[graphql(name = "publishDays")]
    pub publish_days: Vec<i32>,
    #[graphql(name = "wordpressBaseUrl")]
    pub wordpress_base_url: Option<String>,
    #[graphql(name = "wordpressUsername")]
    pub wordpress_username: Option<String>,
    #[graphql(name = "hasWordpressAppPassword")]
    pub has_wordpress_app_password: bool,
    #[graphql(name = "wordpressDefaultCategoryId")]
    pub wordpress_default_category_id: Option<i64>,
    #[graphql(name = "wordpressDefaultTagIds")]
    pub wordpress_default_tag_ids: Vec<i64>,
    #[graphql(name = "wordpressPostType")]
    pub wordpress_post_type: String,
    #[graphql(name = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<seo_sprint_settings::Model> for SeoSprintSettings {
    fn from(model: seo_sprint_settings::Model) -> Self {
        Self {
            publish_days: model.publish_day_list().into_iter().map(i32::from).collect(),
            wordpress_default_tag_ids: model.default_tag_list(),
            wordpress_post_type: model.post_type().to_string(),
            has_wordpress_app_password: model
                .wordpress_app_password
                .as_deref()
                .is_some_and(|p| !p.is_empty()),
            id: model.id,
            project_id: model.project_id,
            hypothesis_id: model.hypothesis_id,
            weekly_cadence: model.weekly_cadence,
            wordpress_base_url: model.wordpress_base_url,
            wordpress_username: model.wordpress_username,
            wordpress_default_category_id: model.wordpress_default_category_id,
            updated_at: model.updated_at,
        }
    }
}

#[derive(InputObject)]
pub struct SeoSprintSettingsInput {
    #[graphql(name = "projectId")]
    pub project_id: i32,
    #[graphql(name = "hypothesisId")]
    pub hypothesis_id: i32,
    #[graphql(name = "weeklyCadence")]
    pub weekly_cadence: i32,
    #[graphql(name = "publishDays", default)]
    pub publish_days: Vec<i32>,
    #[graphql(name = "wordpressBaseUrl")]
    pub wordpress_base_url: Option<String>,
    #[graphql(name = "wordpressUsername")]
    pub wordpress_username: Option<String>,
    #[graphql(name = "wordpressAppPassword")]
    pub wordpress_app_password: Option<String>,
    #[graphql(name = "wordpressDefaultCategoryId")]
    pub wordpress_default_category_id: MaybeUndefined<i64>,
    #[graphql(name = "wordpressDefaultTagIds")]
    pub wordpress_default_tag_ids: Option<Vec<i64>>,
    #[graphql(name = "wordpressPostType")]
    pub wordpress_post_type: Option<String>,
}

impl From<SeoSprintSettingsInput> for SprintSettingsInput {
    fn from(input: SeoSprintSettingsInput) -> Self {
        Self {
            project_id: input.project_id,
            hypothesis_id: input.hypothesis_id,
            weekly_cadence: input.weekly_cadence,
            publish_days: input.publish_days,
            wordpress_base_url: input.wordpress_base_url,
            wordpress_username: input.wordpress_username,
            wordpress_app_password: input.wordpress_app_password,
            wordpress_default_category_id: patch(input.wordpress_default_category_id),
            wordpress_default_tag_ids: input.wordpress_default_tag_ids,
            wordpress_post_type: input.wordpress_post_type,
        }
    }
}
