use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;

use crate::auth::Actor;
use crate::database::entities::seo_sprint_settings;
use crate::errors::{CoreError, CoreResult};
use crate::integrations::WordPressCredentials;
use crate::services::{AuthorizationService, ValidationService};

/// Upsert payload. For the WordPress fields `None` keeps the stored value and
/// an empty string clears it, so the password need not be resent.
#[derive(Clone, Debug, Default)]
pub struct SprintSettingsInput {
    pub project_id: i32,
    pub hypothesis_id: i32,
    pub weekly_cadence: i32,
    pub publish_days: Vec<i32>,
    pub wordpress_base_url: Option<String>,
    pub wordpress_username: Option<String>,
    pub wordpress_app_password: Option<String>,
    pub wordpress_default_category_id: Option<Option<i64>>,
    pub wordpress_default_tag_ids: Option<Vec<i64>>,
    pub wordpress_post_type: Option<String>,
}

fn merge_text(requested: Option<String>, stored: Option<String>) -> Option<String> {
    match requested {
        Some(value) => Some(value.trim().to_string()).filter(|v| !v.is_empty()),
        None => stored,
    }
}

/// Credentials when base URL, username and application password are all present.
pub fn wordpress_credentials(settings: &seo_sprint_settings::Model) -> Option<WordPressCredentials> {
    Some(WordPressCredentials {
        base_url: settings.wordpress_base_url.clone()?,
        username: settings.wordpress_username.clone()?,
        app_password: settings.wordpress_app_password.clone()?,
    })
}

#[derive(Clone)]
pub struct SprintSettingsService {
    db: DatabaseConnection,
    auth_service: AuthorizationService,
}

impl SprintSettingsService {
    pub fn new(db: DatabaseConnection) -> Self {
        let auth_service = AuthorizationService::new(db.clone());
        Self { db, auth_service }
    }

    pub(crate) async fn find(&self, project_id: i32, hypothesis_id: i32) -> CoreResult<Option<seo_sprint_settings::Model>> {
        Ok(seo_sprint_settings::Entity::find()
            .filter(seo_sprint_settings::Column::ProjectId.eq(project_id))
            .filter(seo_sprint_settings::Column::HypothesisId.eq(hypothesis_id))
            .one(&self.db)
            .await?)
    }

    pub async fn get(
        &self,
        actor: &Actor,
        project_id: i32,
        hypothesis_id: i32,
    ) -> CoreResult<Option<seo_sprint_settings::Model>> {
        self.auth_service
            .ensure_scope(actor, project_id, hypothesis_id)
            .await?;
        self.find(project_id, hypothesis_id).await
    }

    /// Stored WordPress credentials for the pair, or a validation error.
    pub async fn require_credentials(
        &self,
        actor: &Actor,
        project_id: i32,
        hypothesis_id: i32,
    ) -> CoreResult<(seo_sprint_settings::Model, WordPressCredentials)> {
        let settings = self
            .get(actor, project_id, hypothesis_id)
            .await?
            .ok_or_else(|| CoreError::validation("Sprint settings are not configured"))?;
        let credentials = wordpress_credentials(&settings)
            .ok_or_else(|| CoreError::validation("WordPress credentials are not configured"))?;
        Ok((settings, credentials))
    }

    pub async fn upsert(&self, actor: &Actor, input: SprintSettingsInput) -> CoreResult<seo_sprint_settings::Model> {
        self.auth_service
            .ensure_scope(actor, input.project_id, input.hypothesis_id)
            .await?;
        let cadence = ValidationService::validate_weekly_cadence(input.weekly_cadence)?;
        let days = ValidationService::validate_publish_days(&input.publish_days)?;
        let base_url = match input.wordpress_base_url {
            Some(url) if !url.trim().is_empty() => Some(ValidationService::validate_base_url(&url)?),
            other => other,
        };

        let existing = self.find(input.project_id, input.hypothesis_id).await?;
        let now = Utc::now();
        let (stored_url, stored_user, stored_password, stored_category, stored_tags, stored_type) =
            match &existing {
                Some(s) => (
                    s.wordpress_base_url.clone(),
                    s.wordpress_username.clone(),
                    s.wordpress_app_password.clone(),
                    s.wordpress_default_category_id,
                    s.default_tag_list(),
                    s.wordpress_post_type.clone(),
                ),
                None => (None, None, None, None, Vec::new(), None),
            };

        let tags = input.wordpress_default_tag_ids.unwrap_or(stored_tags);
        let is_update = existing.is_some();
        let mut active = match existing {
            Some(model) => {
                let mut active: seo_sprint_settings::ActiveModel = model.into();
                active.updated_by = Set(actor.user_id);
                active
            }
            None => seo_sprint_settings::ActiveModel {
                project_id: Set(input.project_id),
                hypothesis_id: Set(input.hypothesis_id),
                created_by: Set(actor.user_id),
                updated_by: Set(actor.user_id),
                created_at: Set(now),
                ..Default::default()
            },
        };

        active.weekly_cadence = Set(cadence);
        active.publish_days = Set(serde_json::to_string(&days)?);
        active.wordpress_base_url = Set(merge_text(base_url, stored_url));
        active.wordpress_username = Set(merge_text(input.wordpress_username, stored_user));
        active.wordpress_app_password = Set(merge_text(input.wordpress_app_password, stored_password));
        active.wordpress_default_category_id =
            Set(input.wordpress_default_category_id.unwrap_or(stored_category));
        active.wordpress_default_tag_ids = Set(serde_json::to_string(&tags)?);
        active.wordpress_post_type = Set(merge_text(input.wordpress_post_type, stored_type));
        active.updated_at = Set(now);

        let saved = if is_update {
            active.update(&self.db).await?
        } else {
            active.insert(&self.db).await?
        };
        info!(
            "Saved sprint settings {} for project {} / hypothesis {}",
            saved.id, input.project_id, input.hypothesis_id
        );
        Ok(saved)
    }

    pub async fn delete(&self, actor: &Actor, project_id: i32, hypothesis_id: i32) -> CoreResult<bool> {
        self.auth_service
            .ensure_scope(actor, project_id, hypothesis_id)
            .await?;
        let result = seo_sprint_settings::Entity::delete_many()
            .filter(seo_sprint_settings::Column::ProjectId.eq(project_id))
            .filter(seo_sprint_settings::Column::HypothesisId.eq(hypothesis_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_text() {
        assert_eq!(merge_text(None, Some("kept".into())).as_deref(), Some("kept"));
        assert_eq!(merge_text(Some("  ".into()), Some("kept".into())), None);
        assert_eq!(merge_text(Some(" new ".into()), None).as_deref(), Some("new"));
    }
}
