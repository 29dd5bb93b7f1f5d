use async_graphql::*;

use crate::integrations::{WordPressCredentials, WordPressPostType as PostTypeInfo, WordPressTerm as TermInfo};
use crate::services::{ConnectionOutcome, PublishOutcome, PublishRequest};

#[derive(InputObject)]
pub struct PublishToWordPressInput {
    #[graphql(name = "contentItemId")]
    pub content_item_id: i32,
    #[graphql(name = "projectId")]
    pub project_id: i32,
    #[graphql(name = "hypothesisId")]
    pub hypothesis_id: Option<i32>,
    /// WordPress post status, `publish` when omitted.
    pub status: Option<String>,
}

impl From<PublishToWordPressInput> for PublishRequest {
    fn from(input: PublishToWordPressInput) -> Self {
        Self {
            content_item_id: input.content_item_id,
            project_id: input.project_id,
            hypothesis_id: input.hypothesis_id,
            status: input.status,
        }
    }
}

#[derive(SimpleObject)]
pub struct PublishResult {
    pub success: bool,
    #[graphql(name = "wordPressPostId")]
    pub wordpress_post_id: Option<i64>,
    #[graphql(name = "wordPressPostUrl")]
    pub wordpress_post_url: Option<String>,
    pub error: Option<String>,
}

impl From<PublishOutcome> for PublishResult {
    fn from(outcome: PublishOutcome) -> Self {
        Self {
            success: outcome.success,
            wordpress_post_id: outcome.wordpress_post_id,
            wordpress_post_url: outcome.wordpress_post_url,
            error: outcome.error,
        }
    }
}

#[derive(InputObject)]
pub struct WordPressCredentialsInput {
    #[graphql(name = "baseUrl")]
    pub base_url: String,
    pub username: String,
    #[graphql(name = "appPassword")]
    pub app_password: String,
}

impl From<WordPressCredentialsInput> for WordPressCredentials {
    fn from(input: WordPressCredentialsInput) -> Self {
        Self {
            base_url: input.base_url,
            username: input.username,
            app_password: input.app_password,
        }
    }
}

#[derive(SimpleObject)]
pub struct ConnectionResult {
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl From<ConnectionOutcome> for ConnectionResult {
    fn from(outcome: ConnectionOutcome) -> Self {
        Self {
            success: outcome.success,
            message: outcome.message,
            error: outcome.error,
        }
    }
}

#[derive(SimpleObject)]
pub struct WordPressTerm {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl From<TermInfo> for WordPressTerm {
    fn from(term: TermInfo) -> Self {
        Self {
            id: term.id,
            name: term.name,
            slug: term.slug,
        }
    }
}

#[derive(SimpleObject)]
pub struct WordPressPostType {
    pub slug: String,
    pub name: String,
    #[graphql(name = "restBase")]
    pub rest_base: String,
    pub taxonomies: Vec<String>,
}

impl From<PostTypeInfo> for WordPressPostType {
    fn from(post_type: PostTypeInfo) -> Self {
        Self {
            slug: post_type.slug,
            name: post_type.name,
            rest_base: post_type.rest_base,
            taxonomies: post_type.taxonomies,
        }
    }
}
