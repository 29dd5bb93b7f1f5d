use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::common_types::{BacklogCategory, BacklogStatus};
use crate::errors::CoreResult;

/// A candidate piece of content.
///
/// `scheduled_date` is set exactly when `status` is scheduled, in progress
/// or completed. `BacklogService` is the only writer of both columns.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "seo_backlog_ideas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub hypothesis_id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub category: String,
    pub status: String,
    pub cluster_id: Option<i32>,
    pub scheduled_date: Option<ChronoDateTimeUtc>,
    pub created_by: i32,
    pub updated_by: i32,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Projects,
    #[sea_orm(has_one = "super::seo_content_items::Entity")]
    ContentItem,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::seo_content_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContentItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> CoreResult<BacklogStatus> {
        self.status.parse()
    }

    pub fn category(&self) -> CoreResult<BacklogCategory> {
        self.category.parse()
    }
}
