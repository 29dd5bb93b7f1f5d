use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub owner_id: i32,
    pub title: String,
    /// Project-level language (second in resolution order).
    pub language: Option<String>,
    /// Language captured in the onboarding info block (last resort).
    pub info_language: Option<String>,
    /// Language from project settings (wins over everything else).
    pub settings_language: Option<String>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::hypotheses::Entity")]
    Hypotheses,
}

impl Related<super::hypotheses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hypotheses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
