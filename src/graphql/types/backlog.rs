use async_graphql::*;
use chrono::{DateTime, Utc};

use super::patch;
use crate::database::entities::{seo_backlog_ideas, BacklogCategory, BacklogStatus};
use crate::errors::CoreError;
use crate::services::{BacklogIdeaUpdate, NewBacklogIdea};

#[derive(SimpleObject)]
pub struct SeoBacklogIdea {
    pub id: i32,
    #[graphql(name = "projectId")]
    pub project_id: i32,
    #[graphql(name = "hypothesisId")]
    pub hypothesis_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub category: BacklogCategory,
    pub status: BacklogStatus,
    #[graphql(name = "clusterId")]
    pub cluster_id: Option<i32>,
    #[graphql(name = "scheduledDate")]
    pub scheduled_date: Option<DateTime<Utc>>,
    #[graphql(name = "createdBy")]
    pub created_by: i32,
    #[graphql(name = "updatedBy")]
    pub updated_by: i32,
    #[graphql(name = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[graphql(name = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<seo_backlog_ideas::Model> for SeoBacklogIdea {
    type Error = CoreError;

    fn try_from(model: seo_backlog_ideas::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            category: model.category()?,
            status: model.status()?,
            id: model.id,
            project_id: model.project_id,
            hypothesis_id: model.hypothesis_id,
            title: model.title,
            description: model.description,
            cluster_id: model.cluster_id,
            scheduled_date: model.scheduled_date,
            created_by: model.created_by,
            updated_by: model.updated_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[derive(InputObject)]
pub struct CreateSeoBacklogIdeaInput {
    #[graphql(name = "projectId")]
    pub project_id: i32,
    #[graphql(name = "hypothesisId")]
    pub hypothesis_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub category: BacklogCategory,
    #[graphql(name = "clusterId")]
    pub cluster_id: Option<i32>,
    #[graphql(name = "scheduledDate")]
    pub scheduled_date: Option<DateTime<Utc>>,
}

impl From<CreateSeoBacklogIdeaInput> for NewBacklogIdea {
    fn from(input: CreateSeoBacklogIdeaInput) -> Self {
        Self {
            project_id: input.project_id,
            hypothesis_id: input.hypothesis_id,
            title: input.title,
            description: input.description,
            category: input.category,
            cluster_id: input.cluster_id,
            scheduled_date: input.scheduled_date,
        }
    }
}

/// Omitted fields are kept; explicit nulls clear `description`, `clusterId`
/// and `scheduledDate`.
#[derive(InputObject)]
pub struct UpdateSeoBacklogIdeaInput {
    pub title: Option<String>,
    pub description: MaybeUndefined<String>,
    pub category: Option<BacklogCategory>,
    #[graphql(name = "clusterId")]
    pub cluster_id: MaybeUndefined<i32>,
    #[graphql(name = "scheduledDate")]
    pub scheduled_date: MaybeUndefined<DateTime<Utc>>,
    pub status: Option<BacklogStatus>,
}

impl From<UpdateSeoBacklogIdeaInput> for BacklogIdeaUpdate {
    fn from(input: UpdateSeoBacklogIdeaInput) -> Self {
        Self {
            title: input.title,
            description: patch(input.description),
            category: input.category,
            cluster_id: patch(input.cluster_id),
            scheduled_date: patch(input.scheduled_date),
            status: input.status,
        }
    }
}
