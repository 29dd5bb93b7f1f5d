use async_graphql::*;
use chrono::{DateTime, Utc};

use crate::graphql::context::GraphQLContext;
use crate::graphql::errors::core_error_to_graphql_error;
use crate::graphql::types::{
    convert_all, CreateSeoBacklogIdeaInput, SeoBacklogIdea, UpdateSeoBacklogIdeaInput,
};

#[derive(Default)]
pub struct BacklogMutation;

#[Object]
impl BacklogMutation {
    #[graphql(name = "createSeoBacklogIdea")]
    async fn create_seo_backlog_idea(
        &self,
        ctx: &Context<'_>,
        input: CreateSeoBacklogIdeaInput,
    ) -> Result<SeoBacklogIdea> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let idea = context
            .app
            .backlog_service()
            .create(&actor, input.into())
            .await
            .map_err(core_error_to_graphql_error)?;

        SeoBacklogIdea::try_from(idea).map_err(core_error_to_graphql_error)
    }

    /// Clearing `scheduledDate` reverts the idea to pending; setting it on a
    /// pending idea schedules it.
    #[graphql(name = "updateSeoBacklogIdea")]
    async fn update_seo_backlog_idea(
        &self,
        ctx: &Context<'_>,
        id: i32,
        input: UpdateSeoBacklogIdeaInput,
    ) -> Result<SeoBacklogIdea> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let idea = context
            .app
            .backlog_service()
            .update(&actor, id, input.into())
            .await
            .map_err(core_error_to_graphql_error)?;

        SeoBacklogIdea::try_from(idea).map_err(core_error_to_graphql_error)
    }

    #[graphql(name = "scheduleSeoBacklogIdea")]
    async fn schedule_seo_backlog_idea(
        &self,
        ctx: &Context<'_>,
        id: i32,
        #[graphql(name = "scheduledDate")] scheduled_date: DateTime<Utc>,
    ) -> Result<SeoBacklogIdea> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let idea = context
            .app
            .backlog_service()
            .schedule(&actor, id, scheduled_date)
            .await
            .map_err(core_error_to_graphql_error)?;

        SeoBacklogIdea::try_from(idea).map_err(core_error_to_graphql_error)
    }

    #[graphql(name = "removeSeoBacklogIdeaFromPlan")]
    async fn remove_seo_backlog_idea_from_plan(
        &self,
        ctx: &Context<'_>,
        id: i32,
    ) -> Result<SeoBacklogIdea> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let idea = context
            .app
            .backlog_service()
            .remove_from_plan(&actor, id)
            .await
            .map_err(core_error_to_graphql_error)?;

        SeoBacklogIdea::try_from(idea).map_err(core_error_to_graphql_error)
    }

    #[graphql(name = "completeSeoBacklogIdea")]
    async fn complete_seo_backlog_idea(&self, ctx: &Context<'_>, id: i32) -> Result<SeoBacklogIdea> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let idea = context
            .app
            .backlog_service()
            .complete(&actor, id)
            .await
            .map_err(core_error_to_graphql_error)?;

        SeoBacklogIdea::try_from(idea).map_err(core_error_to_graphql_error)
    }

    #[graphql(name = "archiveSeoBacklogIdea")]
    async fn archive_seo_backlog_idea(&self, ctx: &Context<'_>, id: i32) -> Result<SeoBacklogIdea> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let idea = context
            .app
            .backlog_service()
            .archive(&actor, id)
            .await
            .map_err(core_error_to_graphql_error)?;

        SeoBacklogIdea::try_from(idea).map_err(core_error_to_graphql_error)
    }

    /// Hard delete; a linked content item is kept and detached
    #[graphql(name = "deleteSeoBacklogIdea")]
    async fn delete_seo_backlog_idea(&self, ctx: &Context<'_>, id: i32) -> Result<bool> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        context
            .app
            .backlog_service()
            .delete(&actor, id)
            .await
            .map_err(core_error_to_graphql_error)?;

        Ok(true)
    }

    /// Ask the chat model for new pending ideas grounded in the hypothesis
    #[graphql(name = "generateBacklogIdeas")]
    async fn generate_backlog_ideas(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "projectId")] project_id: i32,
        #[graphql(name = "hypothesisId")] hypothesis_id: i32,
        #[graphql(default = 5)] count: i32,
    ) -> Result<Vec<SeoBacklogIdea>> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let ideas = context
            .app
            .idea_generator()
            .generate(&actor, project_id, hypothesis_id, count)
            .await
            .map_err(core_error_to_graphql_error)?;

        convert_all(ideas)
    }
}
