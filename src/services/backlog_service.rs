//! Backlog idea lifecycle.
//!
//! Every write goes through [`resolve_schedule`], which keeps `scheduled_date`
//! present exactly for scheduled, in-progress and completed ideas.

use chrono::{DateTime, Datelike, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{info, warn};

use crate::auth::Actor;
use crate::database::entities::{
    seo_backlog_ideas, seo_clusters, seo_content_items, seo_sprint_settings, BacklogCategory,
    BacklogStatus,
};
use crate::errors::{CoreError, CoreResult};
use crate::services::{AuthorizationService, ValidationService};

#[derive(Clone, Debug)]
pub struct NewBacklogIdea {
    pub project_id: i32,
    pub hypothesis_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub category: BacklogCategory,
    pub cluster_id: Option<i32>,
    pub scheduled_date: Option<DateTime<Utc>>,
}

/// Partial update. Outer `None` leaves a field untouched; `Some(None)` clears it.
#[derive(Clone, Debug, Default)]
pub struct BacklogIdeaUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<BacklogCategory>,
    pub cluster_id: Option<Option<i32>>,
    pub scheduled_date: Option<Option<DateTime<Utc>>>,
    pub status: Option<BacklogStatus>,
}

/// Apply a requested status and/or date to the current pair and return the
/// resulting consistent pair.
pub fn resolve_schedule(
    current_status: BacklogStatus,
    current_date: Option<DateTime<Utc>>,
    requested_status: Option<BacklogStatus>,
    requested_date: Option<Option<DateTime<Utc>>>,
) -> CoreResult<(BacklogStatus, Option<DateTime<Utc>>)> {
    let mut status = current_status;
    if let Some(next) = requested_status {
        if !current_status.can_transition_to(next) {
            return Err(CoreError::validation(format!(
                "Cannot move backlog idea from {} to {}",
                current_status, next
            )));
        }
        status = next;
    }
    let date = match requested_date {
        Some(date) => date,
        None => current_date,
    };
    let dated_request = matches!(requested_date, Some(Some(_)));

    match (status, date) {
        (BacklogStatus::Pending | BacklogStatus::Archived, Some(_))
            if dated_request && requested_status.is_some() =>
        {
            Err(CoreError::validation(format!(
                "A {} idea cannot carry a scheduled date",
                status
            )))
        }
        (BacklogStatus::Archived, Some(_)) if dated_request => {
            Err(CoreError::validation("Archived ideas cannot be scheduled"))
        }
        (BacklogStatus::Pending, Some(date)) if requested_status.is_none() => {
            Ok((BacklogStatus::Scheduled, Some(date)))
        }
        (BacklogStatus::Pending | BacklogStatus::Archived, _) => Ok((status, None)),
        (_, Some(date)) => Ok((status, Some(date))),
        (_, None) if requested_status.is_some() && requested_status != Some(current_status) => {
            Err(CoreError::validation(format!(
                "Status {} requires a scheduled date",
                status
            )))
        }
        (_, None) => Ok((BacklogStatus::Pending, None)),
    }
}

fn day_bounds(date: DateTime<Utc>) -> CoreResult<(DateTime<Utc>, DateTime<Utc>)> {
    let start = date
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| CoreError::internal("Invalid calendar day"))?
        .and_utc();
    Ok((start, start + Duration::days(1)))
}

#[derive(Clone)]
pub struct BacklogService {
    db: DatabaseConnection,
    auth_service: AuthorizationService,
}

impl BacklogService {
    pub fn new(db: DatabaseConnection) -> Self {
        let auth_service = AuthorizationService::new(db.clone());
        Self { db, auth_service }
    }

    pub async fn list(
        &self,
        actor: &Actor,
        project_id: i32,
        hypothesis_id: i32,
        status: Option<BacklogStatus>,
    ) -> CoreResult<Vec<seo_backlog_ideas::Model>> {
        self.auth_service
            .ensure_scope(actor, project_id, hypothesis_id)
            .await?;

        let mut query = seo_backlog_ideas::Entity::find()
            .filter(seo_backlog_ideas::Column::ProjectId.eq(project_id))
            .filter(seo_backlog_ideas::Column::HypothesisId.eq(hypothesis_id));
        if let Some(status) = status {
            query = query.filter(seo_backlog_ideas::Column::Status.eq(status.as_str()));
        }
        Ok(query
            .order_by_asc(seo_backlog_ideas::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Scheduled, in-progress and completed ideas ordered by date.
    pub async fn sprint(
        &self,
        actor: &Actor,
        project_id: i32,
        hypothesis_id: i32,
    ) -> CoreResult<Vec<seo_backlog_ideas::Model>> {
        self.auth_service
            .ensure_scope(actor, project_id, hypothesis_id)
            .await?;

        let sprint_statuses: Vec<&str> = BacklogStatus::ALL
            .iter()
            .filter(|s| s.is_in_sprint())
            .map(|s| s.as_str())
            .collect();
        Ok(seo_backlog_ideas::Entity::find()
            .filter(seo_backlog_ideas::Column::ProjectId.eq(project_id))
            .filter(seo_backlog_ideas::Column::HypothesisId.eq(hypothesis_id))
            .filter(seo_backlog_ideas::Column::Status.is_in(sprint_statuses))
            .order_by_asc(seo_backlog_ideas::Column::ScheduledDate)
            .order_by_asc(seo_backlog_ideas::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn get(&self, actor: &Actor, idea_id: i32) -> CoreResult<seo_backlog_ideas::Model> {
        self.auth_service.owned_backlog_idea(actor, idea_id).await
    }

    pub async fn create(
        &self,
        actor: &Actor,
        input: NewBacklogIdea,
    ) -> CoreResult<seo_backlog_ideas::Model> {
        self.auth_service
            .ensure_scope(actor, input.project_id, input.hypothesis_id)
            .await?;
        let title = ValidationService::validate_title(&input.title)?;
        let description = ValidationService::validate_description(input.description.as_deref())?;
        if let Some(cluster_id) = input.cluster_id {
            self.ensure_cluster_in_scope(cluster_id, input.project_id, input.hypothesis_id)
                .await?;
        }

        let (status, scheduled_date) =
            resolve_schedule(BacklogStatus::Pending, None, None, Some(input.scheduled_date))?;
        if let Some(date) = scheduled_date {
            self.ensure_slot_available(input.project_id, input.hypothesis_id, date, None)
                .await?;
        }

        let now = Utc::now();
        let idea = seo_backlog_ideas::ActiveModel {
            project_id: Set(input.project_id),
            hypothesis_id: Set(input.hypothesis_id),
            title: Set(title),
            description: Set(description),
            category: Set(input.category.as_str().to_string()),
            status: Set(status.as_str().to_string()),
            cluster_id: Set(input.cluster_id),
            scheduled_date: Set(scheduled_date),
            created_by: Set(actor.user_id),
            updated_by: Set(actor.user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("Created backlog idea {} ({})", idea.id, idea.status);
        Ok(idea)
    }

    /// Field edits plus the manual status moves: back to pending or archived.
    /// Scheduling, publishing and completion have their own operations.
    pub async fn update(
        &self,
        actor: &Actor,
        idea_id: i32,
        update: BacklogIdeaUpdate,
    ) -> CoreResult<seo_backlog_ideas::Model> {
        if let Some(status) = update.status {
            if !matches!(status, BacklogStatus::Pending | BacklogStatus::Archived) {
                return Err(CoreError::validation(format!(
                    "Status {} cannot be set directly",
                    status
                ))
                .with_field("field", "status"));
            }
        }
        self.apply_update(actor, idea_id, update).await
    }

    async fn apply_update(
        &self,
        actor: &Actor,
        idea_id: i32,
        update: BacklogIdeaUpdate,
    ) -> CoreResult<seo_backlog_ideas::Model> {
        let idea = self.auth_service.owned_backlog_idea(actor, idea_id).await?;
        let current_status = idea.status()?;
        let (status, scheduled_date) = resolve_schedule(
            current_status,
            idea.scheduled_date,
            update.status,
            update.scheduled_date,
        )?;

        if let Some(date) = scheduled_date {
            if Some(date) != idea.scheduled_date {
                self.ensure_slot_available(idea.project_id, idea.hypothesis_id, date, Some(idea.id))
                    .await?;
            }
        }
        if let Some(Some(cluster_id)) = update.cluster_id {
            self.ensure_cluster_in_scope(cluster_id, idea.project_id, idea.hypothesis_id)
                .await?;
        }

        let mut active: seo_backlog_ideas::ActiveModel = idea.into();
        if let Some(title) = update.title {
            active.title = Set(ValidationService::validate_title(&title)?);
        }
        if let Some(description) = update.description {
            active.description =
                Set(ValidationService::validate_description(description.as_deref())?);
        }
        if let Some(category) = update.category {
            active.category = Set(category.as_str().to_string());
        }
        if let Some(cluster_id) = update.cluster_id {
            active.cluster_id = Set(cluster_id);
        }
        active.status = Set(status.as_str().to_string());
        active.scheduled_date = Set(scheduled_date);
        active.updated_by = Set(actor.user_id);
        active.updated_at = Set(Utc::now());

        Ok(active.update(&self.db).await?)
    }

    /// Pending or already scheduled ideas only.
    pub async fn schedule(
        &self,
        actor: &Actor,
        idea_id: i32,
        date: DateTime<Utc>,
    ) -> CoreResult<seo_backlog_ideas::Model> {
        let idea = self.auth_service.owned_backlog_idea(actor, idea_id).await?;
        let status = idea.status()?;
        if !matches!(status, BacklogStatus::Pending | BacklogStatus::Scheduled) {
            return Err(CoreError::validation(format!(
                "Only pending or scheduled ideas can be scheduled, idea {} is {}",
                idea_id, status
            )));
        }
        self.apply_update(
            actor,
            idea_id,
            BacklogIdeaUpdate {
                status: Some(BacklogStatus::Scheduled),
                scheduled_date: Some(Some(date)),
                ..Default::default()
            },
        )
        .await
    }

    /// Back to the backlog: status pending, date cleared.
    pub async fn remove_from_plan(
        &self,
        actor: &Actor,
        idea_id: i32,
    ) -> CoreResult<seo_backlog_ideas::Model> {
        self.update(
            actor,
            idea_id,
            BacklogIdeaUpdate {
                status: Some(BacklogStatus::Pending),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn complete(
        &self,
        actor: &Actor,
        idea_id: i32,
    ) -> CoreResult<seo_backlog_ideas::Model> {
        self.apply_update(
            actor,
            idea_id,
            BacklogIdeaUpdate {
                status: Some(BacklogStatus::Completed),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn archive(
        &self,
        actor: &Actor,
        idea_id: i32,
    ) -> CoreResult<seo_backlog_ideas::Model> {
        self.update(
            actor,
            idea_id,
            BacklogIdeaUpdate {
                status: Some(BacklogStatus::Archived),
                ..Default::default()
            },
        )
        .await
    }

    /// Hard delete. A linked content item survives, detached from the idea.
    pub async fn delete(&self, actor: &Actor, idea_id: i32) -> CoreResult<()> {
        let idea = self.auth_service.owned_backlog_idea(actor, idea_id).await?;

        if let Some(item) = seo_content_items::Entity::find()
            .filter(seo_content_items::Column::BacklogIdeaId.eq(idea.id))
            .one(&self.db)
            .await?
        {
            let mut active: seo_content_items::ActiveModel = item.into();
            active.backlog_idea_id = Set(None);
            active.updated_by = Set(actor.user_id);
            active.updated_at = Set(Utc::now());
            active.update(&self.db).await?;
        }

        seo_backlog_ideas::Entity::delete_by_id(idea.id)
            .exec(&self.db)
            .await?;
        info!("Deleted backlog idea {}", idea_id);
        Ok(())
    }

    /// Called after a confirmed publish. Scheduled ideas keep their date;
    /// undated ideas are stamped with `published_at`. The post is already
    /// live, so a slot collision on that stamp is logged but not refused.
    pub async fn mark_published(
        &self,
        actor: &Actor,
        idea: seo_backlog_ideas::Model,
        published_at: DateTime<Utc>,
    ) -> CoreResult<seo_backlog_ideas::Model> {
        let status = idea.status()?;
        let scheduled_date = match status {
            BacklogStatus::Scheduled => idea.scheduled_date.or(Some(published_at)),
            BacklogStatus::Pending => {
                if let Err(err) = self
                    .ensure_slot_available(
                        idea.project_id,
                        idea.hypothesis_id,
                        published_at,
                        Some(idea.id),
                    )
                    .await
                {
                    warn!(
                        "Backlog idea {} published outside the plan: {}",
                        idea.id,
                        err.message()
                    );
                }
                Some(published_at)
            }
            other => {
                warn!(
                    "Backlog idea {} published while {}, status left unchanged",
                    idea.id, other
                );
                return Ok(idea);
            }
        };

        let mut active: seo_backlog_ideas::ActiveModel = idea.into();
        active.status = Set(BacklogStatus::InProgress.as_str().to_string());
        active.scheduled_date = Set(scheduled_date);
        active.updated_by = Set(actor.user_id);
        active.updated_at = Set(Utc::now());
        Ok(active.update(&self.db).await?)
    }

    async fn ensure_cluster_in_scope(
        &self,
        cluster_id: i32,
        project_id: i32,
        hypothesis_id: i32,
    ) -> CoreResult<()> {
        seo_clusters::Entity::find_by_id(cluster_id)
            .one(&self.db)
            .await?
            .filter(|c| c.project_id == project_id && c.hypothesis_id == hypothesis_id)
            .map(|_| ())
            .ok_or_else(|| CoreError::not_found("Cluster", cluster_id))
    }

    /// One idea per UTC day per hypothesis, on a configured publish day.
    async fn ensure_slot_available(
        &self,
        project_id: i32,
        hypothesis_id: i32,
        date: DateTime<Utc>,
        exclude_id: Option<i32>,
    ) -> CoreResult<()> {
        let settings = seo_sprint_settings::Entity::find()
            .filter(seo_sprint_settings::Column::ProjectId.eq(project_id))
            .filter(seo_sprint_settings::Column::HypothesisId.eq(hypothesis_id))
            .one(&self.db)
            .await?;
        if let Some(settings) = settings {
            let days = settings.publish_day_list();
            let weekday = date.weekday().num_days_from_sunday() as u8;
            if !days.is_empty() && !days.contains(&weekday) {
                return Err(CoreError::validation(format!(
                    "{} is not a configured publish day",
                    date.format("%Y-%m-%d (%A)")
                ))
                .with_field("field", "scheduledDate"));
            }
        }

        let (start, end) = day_bounds(date)?;
        let occupied: Vec<&str> = BacklogStatus::ALL
            .iter()
            .filter(|s| s.requires_scheduled_date())
            .map(|s| s.as_str())
            .collect();
        let mut query = seo_backlog_ideas::Entity::find()
            .filter(seo_backlog_ideas::Column::ProjectId.eq(project_id))
            .filter(seo_backlog_ideas::Column::HypothesisId.eq(hypothesis_id))
            .filter(seo_backlog_ideas::Column::Status.is_in(occupied))
            .filter(seo_backlog_ideas::Column::ScheduledDate.gte(start))
            .filter(seo_backlog_ideas::Column::ScheduledDate.lt(end));
        if let Some(id) = exclude_id {
            query = query.filter(seo_backlog_ideas::Column::Id.ne(id));
        }

        if let Some(other) = query.one(&self.db).await? {
            return Err(CoreError::conflict(format!(
                "The slot on {} is already taken by backlog idea {}",
                date.format("%Y-%m-%d"),
                other.id
            ))
            .with_field("conflictingIdeaId", other.id.to_string()));
        }
        Ok(())
    }
}
