use async_graphql::*;

use crate::database::entities::ContentFormat;
use crate::graphql::context::GraphQLContext;
use crate::graphql::errors::core_error_to_graphql_error;
use crate::graphql::types::{
    ApproveContentItemInput, ContentDraft, GenerateContentDraftInput, RewriteResult,
    SeoContentItem, UpsertSeoContentItemInput,
};
use crate::services::content_generator::RewriteRequest;
use crate::services::image_generator::ImageVariant;

#[derive(Default)]
pub struct ContentMutation;

#[Object]
impl ContentMutation {
    /// Generate (or regenerate in place) the content item for a backlog idea.
    /// A hero image is produced in the background.
    async fn generate_content_for_backlog_idea(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "backlogIdeaId")] backlog_idea_id: i32,
        #[graphql(name = "projectId")] project_id: i32,
        #[graphql(name = "hypothesisId")] hypothesis_id: i32,
        format: Option<ContentFormat>,
    ) -> Result<SeoContentItem> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let item = context
            .app
            .content_service()
            .generate_for_backlog_idea(&actor, backlog_idea_id, project_id, hypothesis_id, format)
            .await
            .map_err(core_error_to_graphql_error)?;

        SeoContentItem::try_from(item).map_err(core_error_to_graphql_error)
    }

    async fn generate_image_for_content(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "contentItemId")] content_item_id: i32,
        title: String,
        description: Option<String>,
        #[graphql(default_with = "ImageVariant::Hero")] variant: ImageVariant,
    ) -> Result<SeoContentItem> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let item = context
            .app
            .content_service()
            .generate_image(&actor, content_item_id, &title, description.as_deref(), variant)
            .await
            .map_err(core_error_to_graphql_error)?;

        SeoContentItem::try_from(item).map_err(core_error_to_graphql_error)
    }

    async fn regenerate_content(
        &self,
        ctx: &Context<'_>,
        id: i32,
        #[graphql(name = "promptPart")] prompt_part: Option<String>,
    ) -> Result<SeoContentItem> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let item = context
            .app
            .content_service()
            .regenerate(&actor, id, prompt_part)
            .await
            .map_err(core_error_to_graphql_error)?;

        SeoContentItem::try_from(item).map_err(core_error_to_graphql_error)
    }

    async fn rewrite_text_selection(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "contentItemId")] content_item_id: i32,
        #[graphql(name = "selectedText")] selected_text: String,
        #[graphql(name = "contextBefore")] context_before: Option<String>,
        #[graphql(name = "contextAfter")] context_after: Option<String>,
        instruction: String,
    ) -> Result<RewriteResult> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let request = RewriteRequest {
            selected_text,
            context_before,
            context_after,
            instruction,
        };
        let outcome = context
            .app
            .content_service()
            .rewrite_selection(&actor, content_item_id, request)
            .await
            .map_err(core_error_to_graphql_error)?;

        Ok(RewriteResult::from(outcome))
    }

    async fn upsert_content_item(
        &self,
        ctx: &Context<'_>,
        input: UpsertSeoContentItemInput,
    ) -> Result<SeoContentItem> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let item = context
            .app
            .content_service()
            .upsert(&actor, input.into())
            .await
            .map_err(core_error_to_graphql_error)?;

        SeoContentItem::try_from(item).map_err(core_error_to_graphql_error)
    }

    async fn approve_content_item(
        &self,
        ctx: &Context<'_>,
        input: ApproveContentItemInput,
    ) -> Result<SeoContentItem> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let item = context
            .app
            .content_service()
            .approve(&actor, input.id, input.reviewer_id)
            .await
            .map_err(core_error_to_graphql_error)?;

        SeoContentItem::try_from(item).map_err(core_error_to_graphql_error)
    }

    /// Unstructured draft that is returned but not stored
    async fn generate_content_draft(
        &self,
        ctx: &Context<'_>,
        input: GenerateContentDraftInput,
    ) -> Result<ContentDraft> {
        let context = ctx.data::<GraphQLContext>()?;
        context.actor_for_request(ctx)?;
        let draft = context
            .app
            .content_service()
            .generate_draft(input.into())
            .await
            .map_err(core_error_to_graphql_error)?;

        Ok(ContentDraft::from(draft))
    }
}
