use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A product hypothesis with its Lean Canvas and ICP, both stored as JSON text.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hypotheses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub title: String,
    pub description: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub lean_canvas: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub icp: Option<String>,
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

/// Business-model summary used as generation context.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeanCanvas {
    pub problems: Vec<String>,
    pub solutions: Vec<String>,
    pub unique_value_proposition: Option<String>,
    pub customer_segments: Vec<String>,
    pub channels: Vec<String>,
}

/// Ideal customer profile. `language` is kept for completeness but never
/// participates in language resolution.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IcpProfile {
    pub persona: Option<String>,
    pub pains: Vec<String>,
    pub goals: Vec<String>,
    pub triggers: Vec<String>,
    pub language: Option<String>,
}
