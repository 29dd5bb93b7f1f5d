use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::common_types::{ContentFormat, ContentStatus, ImageStatus};
use crate::errors::CoreResult;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "seo_content_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub hypothesis_id: i32,
    #[sea_orm(unique)]
    pub backlog_idea_id: Option<i32>,
    pub title: String,
    pub category: String,
    pub format: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub outline: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub image_url: Option<String>,
    pub image_status: String,
    pub image_error: Option<String>,
    pub status: String,
    pub owner_id: Option<i32>,
    pub reviewer_id: Option<i32>,
    pub wordpress_post_id: Option<i64>,
    pub wordpress_post_url: Option<String>,
    pub created_by: i32,
    pub updated_by: i32,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::seo_backlog_ideas::Entity",
        from = "Column::BacklogIdeaId",
        to = "super::seo_backlog_ideas::Column::Id"
    )]
    BacklogIdea,
}

impl Related<super::seo_backlog_ideas::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BacklogIdea.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> CoreResult<ContentStatus> {
        self.status.parse()
    }

    pub fn format(&self) -> CoreResult<ContentFormat> {
        self.format.parse()
    }

    pub fn image_status(&self) -> CoreResult<ImageStatus> {
        self.image_status.parse()
    }
}
