use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::info;

use crate::auth::Actor;
use crate::database::entities::hypotheses::{IcpProfile, LeanCanvas};
use crate::database::entities::{hypotheses, projects};
use crate::errors::CoreResult;
use crate::services::{AuthorizationService, ValidationService};

#[derive(Clone, Debug, Default)]
pub struct NewProject {
    pub title: String,
    pub language: Option<String>,
    pub info_language: Option<String>,
    pub settings_language: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct NewHypothesis {
    pub title: String,
    pub description: Option<String>,
    pub lean_canvas: Option<LeanCanvas>,
    pub icp: Option<IcpProfile>,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Local store of projects and hypotheses owned by users.
#[derive(Clone)]
pub struct ProjectService {
    db: DatabaseConnection,
    auth_service: AuthorizationService,
}

impl ProjectService {
    pub fn new(db: DatabaseConnection) -> Self {
        let auth_service = AuthorizationService::new(db.clone());
        Self { db, auth_service }
    }

    pub async fn create_project(&self, actor: &Actor, input: NewProject) -> CoreResult<projects::Model> {
        let title = ValidationService::validate_title(&input.title)?;
        let now = Utc::now();

        let project = projects::ActiveModel {
            owner_id: Set(actor.user_id),
            title: Set(title),
            language: Set(clean(input.language)),
            info_language: Set(clean(input.info_language)),
            settings_language: Set(clean(input.settings_language)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("Created project {} for user {}", project.id, actor.user_id);
        Ok(project)
    }

    pub async fn create_hypothesis(
        &self,
        actor: &Actor,
        project_id: i32,
        input: NewHypothesis,
    ) -> CoreResult<hypotheses::Model> {
        self.auth_service.ensure_project_owner(actor, project_id).await?;
        let title = ValidationService::validate_title(&input.title)?;
        let description = ValidationService::validate_description(input.description.as_deref())?;
        let now = Utc::now();

        let lean_canvas = input
            .lean_canvas
            .map(|canvas| serde_json::to_string(&canvas))
            .transpose()?;
        let icp = input.icp.map(|icp| serde_json::to_string(&icp)).transpose()?;

        let hypothesis = hypotheses::ActiveModel {
            project_id: Set(project_id),
            title: Set(title),
            description: Set(description),
            lean_canvas: Set(lean_canvas),
            icp: Set(icp),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(hypothesis)
    }

    /// Fails with NotFound or Forbidden.
    pub async fn get_project_by_id(&self, actor: &Actor, project_id: i32) -> CoreResult<projects::Model> {
        self.auth_service.ensure_project_owner(actor, project_id).await
    }

    pub async fn list_projects(&self, actor: &Actor) -> CoreResult<Vec<projects::Model>> {
        Ok(projects::Entity::find()
            .filter(projects::Column::OwnerId.eq(actor.user_id))
            .order_by_asc(projects::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn list_hypotheses(&self, actor: &Actor, project_id: i32) -> CoreResult<Vec<hypotheses::Model>> {
        self.auth_service.ensure_project_owner(actor, project_id).await?;
        Ok(hypotheses::Entity::find()
            .filter(hypotheses::Column::ProjectId.eq(project_id))
            .order_by_asc(hypotheses::Column::Id)
            .all(&self.db)
            .await?)
    }
}
