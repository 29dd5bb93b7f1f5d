use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::common_types::ClusterIntent;
use crate::errors::CoreResult;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "seo_clusters")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub hypothesis_id: i32,
    pub title: String,
    pub intent: String,
    #[sea_orm(column_type = "Text")]
    pub keywords: String, // JSON array, order preserved, duplicates allowed
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
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn intent(&self) -> CoreResult<ClusterIntent> {
        self.intent.parse()
    }

    pub fn keyword_list(&self) -> Vec<String> {
        serde_json::from_str(&self.keywords).unwrap_or_default()
    }
}
