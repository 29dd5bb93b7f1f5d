//! WordPress publishing and discovery.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::{error, info, warn};

use crate::auth::Actor;
use crate::database::entities::{
    seo_backlog_ideas, seo_content_items, seo_sprint_settings, ContentStatus,
};
use crate::errors::{CoreError, CoreResult};
use crate::integrations::{
    PublishConfirmation, WordPressClient, WordPressCredentials, WordPressPost, WordPressPostType,
    WordPressTerm,
};
use crate::services::{AuthorizationService, BacklogService, SprintSettingsService, ValidationService};

const WORDPRESS_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct PublishRequest {
    pub content_item_id: i32,
    pub project_id: i32,
    pub hypothesis_id: Option<i32>,
    /// WordPress post status; defaults to `publish`.
    pub status: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PublishOutcome {
    pub success: bool,
    pub wordpress_post_id: Option<i64>,
    pub wordpress_post_url: Option<String>,
    pub error: Option<String>,
}

impl PublishOutcome {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            wordpress_post_id: None,
            wordpress_post_url: None,
            error: Some(message.into()),
        }
    }

    fn confirmed(confirmation: &PublishConfirmation) -> Self {
        Self {
            success: true,
            wordpress_post_id: Some(confirmation.post_id),
            wordpress_post_url: Some(confirmation.url.clone()),
            error: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionOutcome {
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

fn normalize_post_status(requested: Option<&str>) -> CoreResult<String> {
    let status = requested
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "publish".to_string());
    match status.as_str() {
        "publish" | "draft" | "pending" | "private" | "future" => Ok(status),
        other => Err(CoreError::validation(format!(
            "Unsupported WordPress post status '{}'",
            other
        ))),
    }
}

/// Map a content item onto the WordPress post payload. A future scheduled
/// date turns `publish` into `future`.
pub fn build_post(
    item: &seo_content_items::Model,
    settings: &seo_sprint_settings::Model,
    status: &str,
    scheduled_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> WordPressPost {
    let future_date = scheduled_date.filter(|date| *date > now);
    let (status, date_gmt) = match (status, future_date) {
        ("publish" | "future", Some(date)) => (
            "future".to_string(),
            Some(date.format("%Y-%m-%dT%H:%M:%S").to_string()),
        ),
        ("future", None) => ("publish".to_string(), None),
        (other, _) => (other.to_string(), None),
    };

    let mut content = item.content.clone();
    if let Some(url) = item.image_url.as_deref() {
        if !content.contains(url) {
            content = format!(
                "<figure class=\"hero\"><img src=\"{}\" alt=\"{}\" /></figure>\n{}",
                url,
                crate::services::content_generator::escape_html(&item.title),
                content
            );
        }
    }

    WordPressPost {
        title: item.title.clone(),
        content,
        status,
        categories: settings.wordpress_default_category_id.into_iter().collect(),
        tags: settings.default_tag_list(),
        date_gmt,
    }
}

#[derive(Clone)]
pub struct PublishService {
    db: DatabaseConnection,
    auth_service: AuthorizationService,
    settings: SprintSettingsService,
    backlog: BacklogService,
}

impl PublishService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            auth_service: AuthorizationService::new(db.clone()),
            settings: SprintSettingsService::new(db.clone()),
            backlog: BacklogService::new(db.clone()),
            db,
        }
    }

    /// Ownership and lookup errors are returned as errors; everything that
    /// goes wrong talking to WordPress is a failed outcome with no state change.
    pub async fn publish(&self, actor: &Actor, request: PublishRequest) -> CoreResult<PublishOutcome> {
        self.auth_service
            .ensure_project_owner(actor, request.project_id)
            .await?;
        let item = self
            .auth_service
            .owned_content_item(actor, request.content_item_id)
            .await?;
        let hypothesis_id = request.hypothesis_id.unwrap_or(item.hypothesis_id);
        if item.project_id != request.project_id || item.hypothesis_id != hypothesis_id {
            return Err(CoreError::not_found("Content item", request.content_item_id));
        }
        let status = normalize_post_status(request.status.as_deref())?;

        if item.status()? == ContentStatus::Draft {
            return Ok(PublishOutcome::failure(
                "Content item must be approved before publishing",
            ));
        }
        let Some(settings) = self.settings.find(item.project_id, hypothesis_id).await? else {
            return Ok(PublishOutcome::failure(
                "Sprint settings with WordPress credentials are not configured",
            ));
        };
        let Some(credentials) = crate::services::sprint_settings_service::wordpress_credentials(&settings) else {
            return Ok(PublishOutcome::failure("WordPress credentials are not configured"));
        };

        let idea = match item.backlog_idea_id {
            Some(idea_id) => seo_backlog_ideas::Entity::find_by_id(idea_id)
                .one(&self.db)
                .await?,
            None => None,
        };
        let now = Utc::now();
        let post = build_post(
            &item,
            &settings,
            &status,
            idea.as_ref().and_then(|i| i.scheduled_date),
            now,
        );

        let client = match WordPressClient::new(&credentials, WORDPRESS_TIMEOUT) {
            Ok(client) => client,
            Err(e) => return Ok(PublishOutcome::failure(e.to_string())),
        };
        let confirmation = match client
            .publish(settings.post_type(), item.wordpress_post_id, &post)
            .await
        {
            Ok(confirmation) => confirmation,
            Err(e) => {
                warn!("Publishing content item {} failed: {}", item.id, e);
                return Ok(PublishOutcome::failure(e.to_string()));
            }
        };
        info!(
            "Content item {} published as WordPress post {} ({})",
            item.id, confirmation.post_id, confirmation.url
        );

        let item_id = item.id;
        let mut active: seo_content_items::ActiveModel = item.into();
        active.status = Set(ContentStatus::Published.as_str().to_string());
        active.wordpress_post_id = Set(Some(confirmation.post_id));
        active.wordpress_post_url = Set(Some(confirmation.url.clone()));
        active.updated_by = Set(actor.user_id);
        active.updated_at = Set(now);
        if let Err(e) = active.update(&self.db).await {
            error!(
                "WordPress post {} created but content item {} was not updated: {}",
                confirmation.post_id, item_id, e
            );
            return Err(CoreError::internal(format!(
                "Post {} was published but the content item could not be updated",
                confirmation.post_id
            ))
            .with_source(e));
        }

        if let Some(idea) = idea {
            let idea_id = idea.id;
            if let Err(e) = self.backlog.mark_published(actor, idea, now).await {
                error!(
                    "Backlog idea {} needs reconciliation after publishing post {}: {}",
                    idea_id, confirmation.post_id, e
                );
            }
        }

        Ok(PublishOutcome::confirmed(&confirmation))
    }

    pub async fn test_connection(&self, credentials: WordPressCredentials) -> ConnectionOutcome {
        let credentials = match ValidationService::validate_base_url(&credentials.base_url) {
            Ok(base_url) => WordPressCredentials {
                base_url,
                ..credentials
            },
            Err(e) => {
                return ConnectionOutcome {
                    success: false,
                    message: None,
                    error: Some(e.message().to_string()),
                }
            }
        };
        let result = match WordPressClient::new(&credentials, WORDPRESS_TIMEOUT) {
            Ok(client) => client.test_connection().await,
            Err(e) => Err(e),
        };
        match result {
            Ok(name) => ConnectionOutcome {
                success: true,
                message: Some(format!("Connected to WordPress as {}", name)),
                error: None,
            },
            Err(e) => ConnectionOutcome {
                success: false,
                message: None,
                error: Some(e.to_string()),
            },
        }
    }

    async fn client_for(
        &self,
        actor: &Actor,
        project_id: i32,
        hypothesis_id: i32,
    ) -> CoreResult<(WordPressClient, seo_sprint_settings::Model)> {
        let (settings, credentials) = self
            .settings
            .require_credentials(actor, project_id, hypothesis_id)
            .await?;
        Ok((WordPressClient::new(&credentials, WORDPRESS_TIMEOUT)?, settings))
    }

    pub async fn categories(
        &self,
        actor: &Actor,
        project_id: i32,
        hypothesis_id: i32,
        post_type: Option<&str>,
    ) -> CoreResult<Vec<WordPressTerm>> {
        let (client, settings) = self.client_for(actor, project_id, hypothesis_id).await?;
        Ok(client
            .get_categories(post_type.unwrap_or(settings.post_type()))
            .await?)
    }

    pub async fn tags(
        &self,
        actor: &Actor,
        project_id: i32,
        hypothesis_id: i32,
        post_type: Option<&str>,
    ) -> CoreResult<Vec<WordPressTerm>> {
        let (client, settings) = self.client_for(actor, project_id, hypothesis_id).await?;
        Ok(client.get_tags(post_type.unwrap_or(settings.post_type())).await?)
    }

    pub async fn post_types(
        &self,
        actor: &Actor,
        project_id: i32,
        hypothesis_id: i32,
    ) -> CoreResult<Vec<WordPressPostType>> {
        let (client, _) = self.client_for(actor, project_id, hypothesis_id).await?;
        Ok(client.get_post_types().await?)
    }
}
