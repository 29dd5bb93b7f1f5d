use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::info;

use crate::auth::Actor;
use crate::database::entities::{seo_backlog_ideas, seo_clusters, ClusterIntent};
use crate::errors::CoreResult;
use crate::services::{AuthorizationService, ValidationService};

#[derive(Clone, Debug)]
pub struct NewCluster {
    pub project_id: i32,
    pub hypothesis_id: i32,
    pub title: String,
    pub intent: ClusterIntent,
    pub keywords: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ClusterUpdate {
    pub title: Option<String>,
    pub intent: Option<ClusterIntent>,
    pub keywords: Option<Vec<String>>,
}

#[derive(Clone)]
pub struct ClusterService {
    db: DatabaseConnection,
    auth_service: AuthorizationService,
}

impl ClusterService {
    pub fn new(db: DatabaseConnection) -> Self {
        let auth_service = AuthorizationService::new(db.clone());
        Self { db, auth_service }
    }

    pub async fn list(&self, actor: &Actor, project_id: i32, hypothesis_id: i32) -> CoreResult<Vec<seo_clusters::Model>> {
        self.auth_service
            .ensure_scope(actor, project_id, hypothesis_id)
            .await?;
        Ok(seo_clusters::Entity::find()
            .filter(seo_clusters::Column::ProjectId.eq(project_id))
            .filter(seo_clusters::Column::HypothesisId.eq(hypothesis_id))
            .order_by_asc(seo_clusters::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn create(&self, actor: &Actor, input: NewCluster) -> CoreResult<seo_clusters::Model> {
        self.auth_service
            .ensure_scope(actor, input.project_id, input.hypothesis_id)
            .await?;
        let title = ValidationService::validate_title(&input.title)?;
        let keywords = ValidationService::normalize_keywords(&input.keywords);
        let now = Utc::now();

        let cluster = seo_clusters::ActiveModel {
            project_id: Set(input.project_id),
            hypothesis_id: Set(input.hypothesis_id),
            title: Set(title),
            intent: Set(input.intent.as_str().to_string()),
            keywords: Set(serde_json::to_string(&keywords)?),
            created_by: Set(actor.user_id),
            updated_by: Set(actor.user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("Created cluster {} with {} keywords", cluster.id, keywords.len());
        Ok(cluster)
    }

    pub async fn update(&self, actor: &Actor, cluster_id: i32, update: ClusterUpdate) -> CoreResult<seo_clusters::Model> {
        let cluster = self.auth_service.owned_cluster(actor, cluster_id).await?;
        let mut active: seo_clusters::ActiveModel = cluster.into();

        if let Some(title) = update.title {
            active.title = Set(ValidationService::validate_title(&title)?);
        }
        if let Some(intent) = update.intent {
            active.intent = Set(intent.as_str().to_string());
        }
        if let Some(keywords) = update.keywords {
            let keywords = ValidationService::normalize_keywords(&keywords);
            active.keywords = Set(serde_json::to_string(&keywords)?);
        }
        active.updated_by = Set(actor.user_id);
        active.updated_at = Set(Utc::now());

        Ok(active.update(&self.db).await?)
    }

    /// Ideas that referenced the cluster keep existing without it.
    pub async fn delete(&self, actor: &Actor, cluster_id: i32) -> CoreResult<()> {
        let cluster = self.auth_service.owned_cluster(actor, cluster_id).await?;

        seo_backlog_ideas::Entity::update_many()
            .col_expr(
                seo_backlog_ideas::Column::ClusterId,
                sea_orm::sea_query::Expr::value(Option::<i32>::None),
            )
            .filter(seo_backlog_ideas::Column::ClusterId.eq(cluster.id))
            .exec(&self.db)
            .await?;
        seo_clusters::Entity::delete_by_id(cluster.id)
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
