//! Content items: generation for backlog ideas, edits, approval and images.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{error, info, warn};

use crate::auth::Actor;
use crate::database::entities::{
    seo_backlog_ideas, seo_content_items, ContentFormat, ContentStatus, ImageStatus,
};
use crate::errors::{CoreError, CoreResult};
use crate::services::content_generator::{
    ContentGenerator, FreeformDraftRequest, GeneratedContent, RewriteRequest,
};
use crate::services::context_loader::ContextLoader;
use crate::services::image_generator::{ImageGenerator, ImageVariant};
use crate::services::image_jobs::{mark_image_pending, record_image_outcome, ImageJobQueue};
use crate::services::prompt_builder::{PromptBuilder, PromptTopic};
use crate::services::{AuthorizationService, ValidationService};

/// Create when `id` is absent, update otherwise.
#[derive(Clone, Debug)]
pub struct ContentItemInput {
    pub id: Option<i32>,
    pub project_id: i32,
    pub hypothesis_id: i32,
    pub backlog_idea_id: Option<i32>,
    pub title: String,
    pub category: String,
    pub format: ContentFormat,
    pub outline: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub status: Option<ContentStatus>,
    pub owner_id: Option<i32>,
    pub reviewer_id: Option<i32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RewriteOutcome {
    pub success: bool,
    pub rewritten_text: Option<String>,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct ContentService {
    db: DatabaseConnection,
    auth_service: AuthorizationService,
    context_loader: ContextLoader,
    prompt_builder: Arc<PromptBuilder>,
    generator: ContentGenerator,
    images: ImageGenerator,
    image_jobs: ImageJobQueue,
}

impl ContentService {
    pub fn new(
        db: DatabaseConnection,
        prompt_builder: Arc<PromptBuilder>,
        generator: ContentGenerator,
        images: ImageGenerator,
        image_jobs: ImageJobQueue,
    ) -> Self {
        Self {
            auth_service: AuthorizationService::new(db.clone()),
            context_loader: ContextLoader::new(db.clone()),
            db,
            prompt_builder,
            generator,
            images,
            image_jobs,
        }
    }

    pub async fn list(&self, actor: &Actor, project_id: i32, hypothesis_id: i32) -> CoreResult<Vec<seo_content_items::Model>> {
        self.auth_service
            .ensure_scope(actor, project_id, hypothesis_id)
            .await?;
        Ok(seo_content_items::Entity::find()
            .filter(seo_content_items::Column::ProjectId.eq(project_id))
            .filter(seo_content_items::Column::HypothesisId.eq(hypothesis_id))
            .order_by_desc(seo_content_items::Column::UpdatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn get(&self, actor: &Actor, content_item_id: i32) -> CoreResult<seo_content_items::Model> {
        self.auth_service
            .owned_content_item(actor, content_item_id)
            .await
    }

    pub async fn get_for_idea(&self, actor: &Actor, backlog_idea_id: i32) -> CoreResult<Option<seo_content_items::Model>> {
        self.auth_service
            .owned_backlog_idea(actor, backlog_idea_id)
            .await?;
        self.find_for_idea(backlog_idea_id).await
    }

    async fn find_for_idea(&self, backlog_idea_id: i32) -> CoreResult<Option<seo_content_items::Model>> {
        Ok(seo_content_items::Entity::find()
            .filter(seo_content_items::Column::BacklogIdeaId.eq(backlog_idea_id))
            .one(&self.db)
            .await?)
    }

    async fn idea_in_scope(
        &self,
        actor: &Actor,
        backlog_idea_id: i32,
        project_id: i32,
        hypothesis_id: i32,
    ) -> CoreResult<seo_backlog_ideas::Model> {
        self.auth_service
            .ensure_scope(actor, project_id, hypothesis_id)
            .await?;
        let idea = self
            .auth_service
            .owned_backlog_idea(actor, backlog_idea_id)
            .await?;
        if idea.project_id != project_id || idea.hypothesis_id != hypothesis_id {
            return Err(CoreError::not_found("Backlog idea", backlog_idea_id));
        }
        Ok(idea)
    }

    async fn generate_for(
        &self,
        actor: &Actor,
        idea: &seo_backlog_ideas::Model,
        format: ContentFormat,
        extra_instructions: Option<&str>,
    ) -> CoreResult<GeneratedContent> {
        let snapshot = self
            .context_loader
            .load(actor, idea.project_id, idea.hypothesis_id)
            .await?;
        let topic = PromptTopic {
            title: idea.title.clone(),
            description: idea.description.clone(),
            category: idea.category().ok(),
        };
        let plan = self.prompt_builder.build(
            &snapshot,
            &topic,
            format,
            &snapshot.language,
            extra_instructions,
        )?;
        info!(
            "Generating {} for backlog idea {} as {}",
            format,
            idea.id,
            plan.archetype.as_str()
        );
        self.generator.generate(&plan.prompt, format).await
    }

    /// Generates content for an idea, overwriting the idea's existing item in place.
    /// A generation failure leaves the stored item and idea untouched.
    pub async fn generate_for_backlog_idea(
        &self,
        actor: &Actor,
        backlog_idea_id: i32,
        project_id: i32,
        hypothesis_id: i32,
        format: Option<ContentFormat>,
    ) -> CoreResult<seo_content_items::Model> {
        let idea = self
            .idea_in_scope(actor, backlog_idea_id, project_id, hypothesis_id)
            .await?;
        let existing = self.find_for_idea(idea.id).await?;
        let format = match (format, &existing) {
            (Some(format), _) => format,
            (None, Some(item)) => item.format()?,
            (None, None) => ContentFormat::Article,
        };

        let generated = self.generate_for(actor, &idea, format, None).await.map_err(|e| {
            error!("Content generation failed for backlog idea {}: {}", idea.id, e);
            e
        })?;

        let item = match existing {
            Some(item) => self.overwrite(actor, item, &idea, format, generated).await?,
            None => match self.insert_for_idea(actor, &idea, format, &generated).await {
                Ok(item) => item,
                Err(e) => {
                    // A concurrent request may have created the item first.
                    let Some(item) = self.find_for_idea(idea.id).await? else {
                        return Err(e);
                    };
                    warn!("Content item for idea {} appeared concurrently, overwriting", idea.id);
                    self.overwrite(actor, item, &idea, format, generated).await?
                }
            },
        };

        self.queue_hero_image(&item, idea.description.as_deref()).await;
        self.get(actor, item.id).await
    }

    async fn insert_for_idea(
        &self,
        actor: &Actor,
        idea: &seo_backlog_ideas::Model,
        format: ContentFormat,
        generated: &GeneratedContent,
    ) -> CoreResult<seo_content_items::Model> {
        let now = Utc::now();
        let item = seo_content_items::ActiveModel {
            project_id: Set(idea.project_id),
            hypothesis_id: Set(idea.hypothesis_id),
            backlog_idea_id: Set(Some(idea.id)),
            title: Set(idea.title.clone()),
            category: Set(idea.category.clone()),
            format: Set(format.as_str().to_string()),
            outline: Set(generated.outline.clone()),
            content: Set(generated.content.clone()),
            image_url: Set(None),
            image_status: Set(ImageStatus::NoImage.as_str().to_string()),
            image_error: Set(None),
            status: Set(ContentStatus::Draft.as_str().to_string()),
            owner_id: Set(Some(actor.user_id)),
            reviewer_id: Set(None),
            wordpress_post_id: Set(None),
            wordpress_post_url: Set(None),
            created_by: Set(actor.user_id),
            updated_by: Set(actor.user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        info!("Created content item {} for backlog idea {}", item.id, idea.id);
        Ok(item)
    }

    /// Keeps id, image and WordPress linkage; status returns to draft.
    async fn overwrite(
        &self,
        actor: &Actor,
        item: seo_content_items::Model,
        idea: &seo_backlog_ideas::Model,
        format: ContentFormat,
        generated: GeneratedContent,
    ) -> CoreResult<seo_content_items::Model> {
        let mut active: seo_content_items::ActiveModel = item.into();
        active.title = Set(idea.title.clone());
        active.category = Set(idea.category.clone());
        active.format = Set(format.as_str().to_string());
        active.outline = Set(generated.outline);
        active.content = Set(generated.content);
        active.status = Set(ContentStatus::Draft.as_str().to_string());
        active.updated_by = Set(actor.user_id);
        active.updated_at = Set(Utc::now());
        let item = active.update(&self.db).await?;
        info!("Overwrote content item {} for backlog idea {}", item.id, idea.id);
        Ok(item)
    }

    async fn queue_hero_image(&self, item: &seo_content_items::Model, description: Option<&str>) {
        let status = item.image_status().unwrap_or(ImageStatus::NoImage);
        if item.image_url.is_some() || status == ImageStatus::Pending {
            return;
        }
        if let Err(e) = self
            .image_jobs
            .enqueue(item.id, &item.title, description, ImageVariant::Hero)
            .await
        {
            warn!("Could not queue hero image for content item {}: {}", item.id, e);
        }
    }

    pub async fn regenerate(
        &self,
        actor: &Actor,
        content_item_id: i32,
        prompt_part: Option<String>,
    ) -> CoreResult<seo_content_items::Model> {
        let item = self
            .auth_service
            .owned_content_item(actor, content_item_id)
            .await?;
        let format = item.format()?;
        let idea = match item.backlog_idea_id {
            Some(idea_id) => seo_backlog_ideas::Entity::find_by_id(idea_id)
                .one(&self.db)
                .await?,
            None => None,
        };

        let generated = match &idea {
            Some(idea) => {
                self.generate_for(actor, idea, format, prompt_part.as_deref())
                    .await?
            }
            None => {
                let mut description = item.outline.clone();
                if let Some(extra) = prompt_part.as_deref().filter(|p| !p.trim().is_empty()) {
                    description = Some(format!(
                        "{}\nAdditional instructions: {}",
                        description.unwrap_or_default(),
                        extra.trim()
                    ));
                }
                let generated = self
                    .generator
                    .generate_freeform(&FreeformDraftRequest {
                        title: item.title.clone(),
                        description,
                        keywords: Vec::new(),
                        language: None,
                        format: Some(format),
                    })
                    .await;
                if generated.degraded {
                    return Err(CoreError::generation(
                        "Content provider is unavailable, the existing draft was kept",
                    ));
                }
                generated
            }
        };

        let mut active: seo_content_items::ActiveModel = item.into();
        active.outline = Set(generated.outline);
        active.content = Set(generated.content);
        active.status = Set(ContentStatus::Draft.as_str().to_string());
        active.updated_by = Set(actor.user_id);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&self.db).await?;
        info!("Regenerated content item {}", updated.id);
        Ok(updated)
    }

    pub async fn upsert(&self, actor: &Actor, input: ContentItemInput) -> CoreResult<seo_content_items::Model> {
        self.auth_service
            .ensure_scope(actor, input.project_id, input.hypothesis_id)
            .await?;
        let title = ValidationService::validate_title(&input.title)?;
        if let Some(idea_id) = input.backlog_idea_id {
            self.idea_in_scope(actor, idea_id, input.project_id, input.hypothesis_id)
                .await?;
            if let Some(linked) = self.find_for_idea(idea_id).await? {
                if Some(linked.id) != input.id {
                    return Err(CoreError::conflict(format!(
                        "Backlog idea {} already has content item {}",
                        idea_id, linked.id
                    )));
                }
            }
        }

        let now = Utc::now();
        match input.id {
            Some(id) => {
                let item = self.auth_service.owned_content_item(actor, id).await?;
                if item.project_id != input.project_id || item.hypothesis_id != input.hypothesis_id {
                    return Err(CoreError::not_found("Content item", id));
                }
                if let Some(status) = input.status {
                    ensure_manual_status(item.status()?, status)?;
                }
                let mut active: seo_content_items::ActiveModel = item.into();
                active.backlog_idea_id = Set(input.backlog_idea_id);
                active.title = Set(title);
                active.category = Set(input.category);
                active.format = Set(input.format.as_str().to_string());
                active.outline = Set(input.outline);
                active.content = Set(input.content);
                if let Some(url) = input.image_url {
                    let url = Some(url.trim().to_string()).filter(|u| !u.is_empty());
                    let status = if url.is_some() { ImageStatus::Ready } else { ImageStatus::NoImage };
                    active.image_url = Set(url);
                    active.image_status = Set(status.as_str().to_string());
                    active.image_error = Set(None);
                }
                if let Some(status) = input.status {
                    active.status = Set(status.as_str().to_string());
                }
                active.owner_id = Set(input.owner_id);
                active.reviewer_id = Set(input.reviewer_id);
                active.updated_by = Set(actor.user_id);
                active.updated_at = Set(now);
                Ok(active.update(&self.db).await?)
            }
            None => {
                let status = input.status.unwrap_or(ContentStatus::Draft);
                ensure_manual_status(ContentStatus::Draft, status)?;
                let image_url = input
                    .image_url
                    .map(|u| u.trim().to_string())
                    .filter(|u| !u.is_empty());
                let image_status = if image_url.is_some() { ImageStatus::Ready } else { ImageStatus::NoImage };
                Ok(seo_content_items::ActiveModel {
                    project_id: Set(input.project_id),
                    hypothesis_id: Set(input.hypothesis_id),
                    backlog_idea_id: Set(input.backlog_idea_id),
                    title: Set(title),
                    category: Set(input.category),
                    format: Set(input.format.as_str().to_string()),
                    outline: Set(input.outline),
                    content: Set(input.content),
                    image_url: Set(image_url),
                    image_status: Set(image_status.as_str().to_string()),
                    image_error: Set(None),
                    status: Set(status.as_str().to_string()),
                    owner_id: Set(input.owner_id.or(Some(actor.user_id))),
                    reviewer_id: Set(input.reviewer_id),
                    wordpress_post_id: Set(None),
                    wordpress_post_url: Set(None),
                    created_by: Set(actor.user_id),
                    updated_by: Set(actor.user_id),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?)
            }
        }
    }

    /// Draft to ready. The approver is recorded as reviewer unless one is given.
    pub async fn approve(
        &self,
        actor: &Actor,
        content_item_id: i32,
        reviewer_id: Option<i32>,
    ) -> CoreResult<seo_content_items::Model> {
        let item = self
            .auth_service
            .owned_content_item(actor, content_item_id)
            .await?;
        match item.status()? {
            ContentStatus::Published => {
                return Err(CoreError::validation(format!(
                    "Content item {} is already published",
                    content_item_id
                )))
            }
            ContentStatus::Draft | ContentStatus::Ready => {}
        }
        if item.content.trim().is_empty() {
            return Err(CoreError::validation("Cannot approve an empty content item"));
        }

        let mut active: seo_content_items::ActiveModel = item.into();
        active.status = Set(ContentStatus::Ready.as_str().to_string());
        active.reviewer_id = Set(Some(reviewer_id.unwrap_or(actor.user_id)));
        active.updated_by = Set(actor.user_id);
        active.updated_at = Set(Utc::now());
        Ok(active.update(&self.db).await?)
    }

    /// Synchronous image generation. The failure is recorded on the item and returned.
    pub async fn generate_image(
        &self,
        actor: &Actor,
        content_item_id: i32,
        title: &str,
        description: Option<&str>,
        variant: ImageVariant,
    ) -> CoreResult<seo_content_items::Model> {
        let item = self
            .auth_service
            .owned_content_item(actor, content_item_id)
            .await?;
        let title = Some(title.trim())
            .filter(|t| !t.is_empty())
            .unwrap_or(item.title.as_str())
            .to_string();

        mark_image_pending(&self.db, item.id).await?;
        let outcome = self
            .images
            .generate(item.id, &title, description, variant)
            .await;
        let updated = record_image_outcome(&self.db, item.id, &outcome).await?;
        outcome.map(|_| updated)
    }

    pub async fn delete_image(&self, actor: &Actor, content_item_id: i32) -> CoreResult<seo_content_items::Model> {
        let item = self
            .auth_service
            .owned_content_item(actor, content_item_id)
            .await?;
        let removed = self.images.delete_images(item.id).await?;
        info!("Removed {} image files for content item {}", removed, item.id);

        let mut active: seo_content_items::ActiveModel = item.into();
        active.image_url = Set(None);
        active.image_status = Set(ImageStatus::NoImage.as_str().to_string());
        active.image_error = Set(None);
        active.updated_by = Set(actor.user_id);
        active.updated_at = Set(Utc::now());
        Ok(active.update(&self.db).await?)
    }

    /// Ownership errors propagate; provider failures are reported in the outcome.
    pub async fn rewrite_selection(
        &self,
        actor: &Actor,
        content_item_id: i32,
        request: RewriteRequest,
    ) -> CoreResult<RewriteOutcome> {
        self.auth_service
            .owned_content_item(actor, content_item_id)
            .await?;
        Ok(match self.generator.rewrite_selection(&request).await {
            Ok(text) => RewriteOutcome {
                success: true,
                rewritten_text: Some(text),
                error: None,
            },
            Err(e) => {
                warn!("Rewrite failed for content item {}: {}", content_item_id, e);
                RewriteOutcome {
                    success: false,
                    rewritten_text: None,
                    error: Some(e.message().to_string()),
                }
            }
        })
    }

    /// Unstructured draft, not persisted.
    pub async fn generate_draft(&self, request: FreeformDraftRequest) -> CoreResult<GeneratedContent> {
        ValidationService::validate_title(&request.title)?;
        Ok(self.generator.generate_freeform(&request).await)
    }
}

/// Manual edits may move between draft and ready; only publishing sets published.
fn ensure_manual_status(current: ContentStatus, requested: ContentStatus) -> CoreResult<()> {
    if requested == ContentStatus::Published && current != ContentStatus::Published {
        return Err(CoreError::validation(
            "Content items become published only through publishing",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_status() {
        assert!(ensure_manual_status(ContentStatus::Draft, ContentStatus::Ready).is_ok());
        assert!(ensure_manual_status(ContentStatus::Ready, ContentStatus::Published).is_err());
        assert!(ensure_manual_status(ContentStatus::Published, ContentStatus::Published).is_ok());
    }
}
