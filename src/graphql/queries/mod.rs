use async_graphql::*;

use crate::database::entities::BacklogStatus;
use crate::graphql::context::GraphQLContext;
use crate::graphql::errors::core_error_to_graphql_error;
use crate::graphql::types::{
    convert_all, Hypothesis, Project, SeoBacklogIdea, SeoCluster, SeoContentItem,
    SeoSprintSettings, WordPressPostType, WordPressTerm,
};

pub struct Query;

#[Object]
impl Query {
    /// Projects owned by the caller
    async fn projects(&self, ctx: &Context<'_>) -> Result<Vec<Project>> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let projects = context
            .app
            .project_service()
            .list_projects(&actor)
            .await
            .map_err(core_error_to_graphql_error)?;

        Ok(projects.into_iter().map(Project::from).collect())
    }

    async fn project(&self, ctx: &Context<'_>, id: i32) -> Result<Project> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let project = context
            .app
            .project_service()
            .get_project_by_id(&actor, id)
            .await
            .map_err(core_error_to_graphql_error)?;

        Ok(Project::from(project))
    }

    async fn hypotheses(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "projectId")] project_id: i32,
    ) -> Result<Vec<Hypothesis>> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let hypotheses = context
            .app
            .project_service()
            .list_hypotheses(&actor, project_id)
            .await
            .map_err(core_error_to_graphql_error)?;

        Ok(hypotheses.into_iter().map(Hypothesis::from).collect())
    }

    #[graphql(name = "seoClusters")]
    async fn seo_clusters(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "projectId")] project_id: i32,
        #[graphql(name = "hypothesisId")] hypothesis_id: i32,
    ) -> Result<Vec<SeoCluster>> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let clusters = context
            .app
            .cluster_service()
            .list(&actor, project_id, hypothesis_id)
            .await
            .map_err(core_error_to_graphql_error)?;

        convert_all(clusters)
    }

    /// Backlog ideas, optionally filtered by status
    #[graphql(name = "seoBacklogIdeas")]
    async fn seo_backlog_ideas(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "projectId")] project_id: i32,
        #[graphql(name = "hypothesisId")] hypothesis_id: i32,
        status: Option<BacklogStatus>,
    ) -> Result<Vec<SeoBacklogIdea>> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let ideas = context
            .app
            .backlog_service()
            .list(&actor, project_id, hypothesis_id, status)
            .await
            .map_err(core_error_to_graphql_error)?;

        convert_all(ideas)
    }

    /// Scheduled, in-progress and completed ideas ordered by date
    #[graphql(name = "seoSprint")]
    async fn seo_sprint(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "projectId")] project_id: i32,
        #[graphql(name = "hypothesisId")] hypothesis_id: i32,
    ) -> Result<Vec<SeoBacklogIdea>> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let ideas = context
            .app
            .backlog_service()
            .sprint(&actor, project_id, hypothesis_id)
            .await
            .map_err(core_error_to_graphql_error)?;

        convert_all(ideas)
    }

    #[graphql(name = "seoContentItems")]
    async fn seo_content_items(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "projectId")] project_id: i32,
        #[graphql(name = "hypothesisId")] hypothesis_id: i32,
    ) -> Result<Vec<SeoContentItem>> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let items = context
            .app
            .content_service()
            .list(&actor, project_id, hypothesis_id)
            .await
            .map_err(core_error_to_graphql_error)?;

        convert_all(items)
    }

    #[graphql(name = "seoContentItem")]
    async fn seo_content_item(&self, ctx: &Context<'_>, id: i32) -> Result<SeoContentItem> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let item = context
            .app
            .content_service()
            .get(&actor, id)
            .await
            .map_err(core_error_to_graphql_error)?;

        SeoContentItem::try_from(item).map_err(core_error_to_graphql_error)
    }

    #[graphql(name = "seoContentItemForIdea")]
    async fn seo_content_item_for_idea(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "backlogIdeaId")] backlog_idea_id: i32,
    ) -> Result<Option<SeoContentItem>> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let item = context
            .app
            .content_service()
            .get_for_idea(&actor, backlog_idea_id)
            .await
            .map_err(core_error_to_graphql_error)?;

        item.map(SeoContentItem::try_from)
            .transpose()
            .map_err(core_error_to_graphql_error)
    }

    #[graphql(name = "seoSprintSettings")]
    async fn seo_sprint_settings(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "projectId")] project_id: i32,
        #[graphql(name = "hypothesisId")] hypothesis_id: i32,
    ) -> Result<Option<SeoSprintSettings>> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let settings = context
            .app
            .sprint_settings_service()
            .get(&actor, project_id, hypothesis_id)
            .await
            .map_err(core_error_to_graphql_error)?;

        Ok(settings.map(SeoSprintSettings::from))
    }

    #[graphql(name = "wordPressCategories")]
    async fn wordpress_categories(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "projectId")] project_id: i32,
        #[graphql(name = "hypothesisId")] hypothesis_id: i32,
        #[graphql(name = "postType")] post_type: Option<String>,
    ) -> Result<Vec<WordPressTerm>> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let terms = context
            .app
            .publish_service()
            .categories(&actor, project_id, hypothesis_id, post_type.as_deref())
            .await
            .map_err(core_error_to_graphql_error)?;

        Ok(terms.into_iter().map(WordPressTerm::from).collect())
    }

    #[graphql(name = "wordPressTags")]
    async fn wordpress_tags(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "projectId")] project_id: i32,
        #[graphql(name = "hypothesisId")] hypothesis_id: i32,
        #[graphql(name = "postType")] post_type: Option<String>,
    ) -> Result<Vec<WordPressTerm>> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let terms = context
            .app
            .publish_service()
            .tags(&actor, project_id, hypothesis_id, post_type.as_deref())
            .await
            .map_err(core_error_to_graphql_error)?;

        Ok(terms.into_iter().map(WordPressTerm::from).collect())
    }

    #[graphql(name = "wordPressPostTypes")]
    async fn wordpress_post_types(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "projectId")] project_id: i32,
        #[graphql(name = "hypothesisId")] hypothesis_id: i32,
    ) -> Result<Vec<WordPressPostType>> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let post_types = context
            .app
            .publish_service()
            .post_types(&actor, project_id, hypothesis_id)
            .await
            .map_err(core_error_to_graphql_error)?;

        Ok(post_types.into_iter().map(WordPressPostType::from).collect())
    }
}
