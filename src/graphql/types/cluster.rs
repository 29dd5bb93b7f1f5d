use async_graphql::*;
use chrono::{DateTime, Utc};

use crate::database::entities::{seo_clusters, ClusterIntent};
use crate::errors::CoreError;
use crate::services::{ClusterUpdate, NewCluster};

#[derive(SimpleObject)]
pub struct SeoCluster {
    pub id: i32,
    #[graphql(name = "projectId")]
    pub project_id: i32,
    #[graphql(name = "hypothesisId")]
    pub hypothesis_id: i32,
    pub title: String,
    pub intent: ClusterIntent,
    pub keywords: Vec<String>,
    #[graphql(name = "createdBy")]
    pub created_by: i32,
    #[graphql(name = "updatedBy")]
    pub updated_by: i32,
    #[graphql(name = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[graphql(name = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<seo_clusters::Model> for SeoCluster {
    type Error = CoreError;

    fn try_from(model: seo_clusters::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            intent: model.intent()?,
            keywords: model.keyword_list(),
            id: model.id,
            project_id: model.project_id,
            hypothesis_id: model.hypothesis_id,
            title: model.title,
            created_by: model.created_by,
            updated_by: model.updated_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[derive(InputObject)]
pub struct CreateSeoClusterInput {
    #[graphql(name = "projectId")]
    pub project_id: i32,
    #[graphql(name = "hypothesisId")]
    pub hypothesis_id: i32,
    pub title: String,
    pub intent: ClusterIntent,
    #[graphql(default)]
    pub keywords: Vec<String>,
}

impl From<CreateSeoClusterInput> for NewCluster {
    fn from(input: CreateSeoClusterInput) -> Self {
        Self {
            project_id: input.project_id,
            hypothesis_id: input.hypothesis_id,
            title: input.title,
            intent: input.intent,
            keywords: input.keywords,
        }
    }
}

#[derive(InputObject)]
pub struct UpdateSeoClusterInput {
    pub title: Option<String>,
    pub intent: Option<ClusterIntent>,
    pub keywords: Option<Vec<String>>,
}

impl From<UpdateSeoClusterInput> for ClusterUpdate {
    fn from(input: UpdateSeoClusterInput) -> Self {
        Self {
            title: input.title,
            intent: input.intent,
            keywords: input.keywords,
        }
    }
}
