use sea_orm::{DatabaseConnection, EntityTrait};
use tracing::warn;

use crate::auth::Actor;
use crate::database::entities::{
    hypotheses, projects, seo_backlog_ideas, seo_clusters, seo_content_items,
};
use crate::errors::{CoreError, CoreResult};

/// Ownership checks applied at every entry point before child entities are touched.
#[derive(Clone, Debug)]
pub struct AuthorizationService {
    db: DatabaseConnection,
}

impl AuthorizationService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn ensure_project_owner(
        &self,
        actor: &Actor,
        project_id: i32,
    ) -> CoreResult<projects::Model> {
        let project = projects::Entity::find_by_id(project_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", project_id))?;

        if project.owner_id != actor.user_id {
            warn!(
                "User {} denied access to project {}",
                actor.user_id, project_id
            );
            return Err(CoreError::forbidden(format!(
                "You do not have access to project {}",
                project_id
            )));
        }

        Ok(project)
    }

    /// Look up a hypothesis and confirm it belongs to `project_id`.
    pub async fn ensure_hypothesis_in_project(
        &self,
        project_id: i32,
        hypothesis_id: i32,
    ) -> CoreResult<hypotheses::Model> {
        hypotheses::Entity::find_by_id(hypothesis_id)
            .one(&self.db)
            .await?
            .filter(|hypothesis| hypothesis.project_id == project_id)
            .ok_or_else(|| CoreError::not_found("Hypothesis", hypothesis_id))
    }

    pub async fn ensure_scope(
        &self,
        actor: &Actor,
        project_id: i32,
        hypothesis_id: i32,
    ) -> CoreResult<(projects::Model, hypotheses::Model)> {
        let project = self.ensure_project_owner(actor, project_id).await?;
        let hypothesis = self
            .ensure_hypothesis_in_project(project_id, hypothesis_id)
            .await?;
        Ok((project, hypothesis))
    }

    pub async fn owned_backlog_idea(
        &self,
        actor: &Actor,
        idea_id: i32,
    ) -> CoreResult<seo_backlog_ideas::Model> {
        let idea = seo_backlog_ideas::Entity::find_by_id(idea_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("Backlog idea", idea_id))?;
        self.ensure_project_owner(actor, idea.project_id).await?;
        Ok(idea)
    }

    pub async fn owned_content_item(
        &self,
        actor: &Actor,
        content_item_id: i32,
    ) -> CoreResult<seo_content_items::Model> {
        let item = seo_content_items::Entity::find_by_id(content_item_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("Content item", content_item_id))?;
        self.ensure_project_owner(actor, item.project_id).await?;
        Ok(item)
    }

    pub async fn owned_cluster(
        &self,
        actor: &Actor,
        cluster_id: i32,
    ) -> CoreResult<seo_clusters::Model> {
        let cluster = seo_clusters::Entity::find_by_id(cluster_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("Cluster", cluster_id))?;
        self.ensure_project_owner(actor, cluster.project_id).await?;
        Ok(cluster)
    }
}
