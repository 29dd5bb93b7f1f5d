use async_graphql::*;
use chrono::{DateTime, Utc};

use crate::database::entities::{seo_content_items, ContentFormat, ContentStatus, ImageStatus};
use crate::errors::CoreError;
use crate::services::content_generator::{FreeformDraftRequest, GeneratedContent};
use crate::services::{ContentItemInput, RewriteOutcome};

#[derive(SimpleObject)]
pub struct SeoContentItem {
    pub id: i32,
    #[graphql(name = "projectId")]
    pub project_id: i32,
    #[graphql(name = "hypothesisId")]
    pub hypothesis_id: i32,
    #[graphql(name = "backlogIdeaId")]
    pub backlog_idea_id: Option<i32>,
    pub title: String,
    pub category: String,
    pub format: ContentFormat,
    pub outline: Option<String>,
    pub content: String,
    #[graphql(name = "imageUrl")]
    pub image_url: Option<String>,
    #[graphql(name = "imageStatus")]
    pub image_status: ImageStatus,
    #[graphql(name = "imageError")]
    pub image_error: Option<String>,
    pub status: ContentStatus,
    #[graphql(name = "ownerId")]
    pub owner_id: Option<i32>,
    #[graphql(name = "reviewerId")]
    pub reviewer_id: Option<i32>,
    #[graphql(name = "wordPressPostId")]
    pub wordpress_post_id: Option<i64>,
    #[graphql(name = "wordPressPostUrl")]
    pub wordpress_post_url: Option<String>,
    #[graphql(name = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[graphql(name = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<seo_content_items::Model> for SeoContentItem {
    type Error = CoreError;

    fn try_from(model: seo_content_items::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            format: model.format()?,
            image_status: model.image_status()?,
            status: model.status()?,
            id: model.id,
            project_id: model.project_id,
            hypothesis_id: model.hypothesis_id,
            backlog_idea_id: model.backlog_idea_id,
            title: model.title,
            category: model.category,
            outline: model.outline,
            content: model.content,
            image_url: model.image_url,
            image_error: model.image_error,
            owner_id: model.owner_id,
            reviewer_id: model.reviewer_id,
            wordpress_post_id: model.wordpress_post_id,
            wordpress_post_url: model.wordpress_post_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[derive(InputObject)]
pub struct UpsertSeoContentItemInput {
    /// Present to update an existing item.
    pub id: Option<i32>,
    #[graphql(name = "projectId")]
    pub project_id: i32,
    #[graphql(name = "hypothesisId")]
    pub hypothesis_id: i32,
    #[graphql(name = "backlogIdeaId")]
    pub backlog_idea_id: Option<i32>,
    pub title: String,
    pub category: String,
    pub format: ContentFormat,
    pub outline: Option<String>,
    pub content: String,
    #[graphql(name = "imageUrl")]
    pub image_url: Option<String>,
    pub status: Option<ContentStatus>,
    #[graphql(name = "ownerId")]
    pub owner_id: Option<i32>,
    #[graphql(name = "reviewerId")]
    pub reviewer_id: Option<i32>,
}

impl From<UpsertSeoContentItemInput> for ContentItemInput {
    fn from(input: UpsertSeoContentItemInput) -> Self {
        Self {
            id: input.id,
            project_id: input.project_id,
            hypothesis_id: input.hypothesis_id,
            backlog_idea_id: input.backlog_idea_id,
            title: input.title,
            category: input.category,
            format: input.format,
            outline: input.outline,
            content: input.content,
            image_url: input.image_url,
            status: input.status,
            owner_id: input.owner_id,
            reviewer_id: input.reviewer_id,
        }
    }
}

#[derive(InputObject)]
pub struct ApproveContentItemInput {
    pub id: i32,
    #[graphql(name = "reviewerId")]
    pub reviewer_id: Option<i32>,
}

#[derive(SimpleObject)]
pub struct RewriteResult {
    pub success: bool,
    #[graphql(name = "rewrittenText")]
    pub rewritten_text: Option<String>,
    pub error: Option<String>,
}

impl From<RewriteOutcome> for RewriteResult {
    fn from(outcome: RewriteOutcome) -> Self {
        Self {
            success: outcome.success,
            rewritten_text: outcome.rewritten_text,
            error: outcome.error,
        }
    }
}

#[derive(InputObject)]
pub struct GenerateContentDraftInput {
    pub title: String,
    pub description: Option<String>,
    #[graphql(default)]
    pub keywords: Vec<String>,
    pub language: Option<String>,
    pub format: Option<ContentFormat>,
}

impl From<GenerateContentDraftInput> for FreeformDraftRequest {
    fn from(input: GenerateContentDraftInput) -> Self {
        Self {
            title: input.title,
            description: input.description,
            keywords: input.keywords,
            language: input.language,
            format: input.format,
        }
    }
}

#[derive(SimpleObject)]
pub struct ContentDraft {
    pub content: String,
    pub outline: Option<String>,
    /// True when the provider failed and placeholder content was returned.
    pub degraded: bool,
}

impl From<GeneratedContent> for ContentDraft {
    fn from(generated: GeneratedContent) -> Self {
        Self {
            content: generated.content,
            outline: generated.outline,
            degraded: generated.degraded,
        }
    }
}
